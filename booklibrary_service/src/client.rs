use anyhow::{anyhow, Context};
use reqwest::StatusCode;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;

use crate::api::{Book, ErrorResponse, SaveBookRequest};

pub struct BookLibraryClient {
    url: String,
    client: ClientWithMiddleware,
}

async fn failure(context: &str, response: reqwest::Response) -> anyhow::Error {
    let status = response.status();
    match response.json::<ErrorResponse>().await {
        Ok(error) => anyhow!("{} ({}): {:?} {}", context, status, error.code, error.message),
        Err(_) => anyhow!("{} ({})", context, status),
    }
}

impl BookLibraryClient {
    pub fn new(url: &str) -> anyhow::Result<Self> {
        let reqwest_client = reqwest::Client::builder()
            .build()
            .context("Failed to build reqwest client")?;
        let client = ClientBuilder::new(reqwest_client)
            // Insert the tracing middleware
            .with(TracingMiddleware::default())
            .build();

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Calls GET /isbn/{isbn} endpoint
    /// Returns book details if the catalog knows the isbn
    /// None if it does not
    /// and error in case of any other failure (including invalid isbn)
    pub async fn book_details(&self, isbn: &str) -> anyhow::Result<Option<Book>> {
        let response = self
            .client
            .get(format!("{}/isbn/{}", self.url, isbn))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            Ok(None)
        } else if response.status().is_success() {
            Ok(Some(response.json().await?))
        } else {
            Err(failure("Failed to get book details", response).await)
        }
    }

    /// Calls POST /books endpoint
    /// Returns saved book, None if the book was already in the library
    pub async fn save_book(&self, isbn: &str) -> anyhow::Result<Option<Book>> {
        let response = self
            .client
            .post(format!("{}/books", self.url))
            .json(&SaveBookRequest {
                isbn: isbn.to_string(),
            })
            .send()
            .await?;

        if response.status() == StatusCode::CONFLICT {
            Ok(None)
        } else if response.status().is_success() {
            Ok(Some(response.json().await?))
        } else {
            Err(failure("Failed to save book", response).await)
        }
    }

    /// Calls GET /books endpoint
    pub async fn list_books(&self) -> anyhow::Result<Vec<Book>> {
        let response = self
            .client
            .get(format!("{}/books", self.url))
            .send()
            .await?;
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(failure("Failed to list books", response).await)
        }
    }
}
