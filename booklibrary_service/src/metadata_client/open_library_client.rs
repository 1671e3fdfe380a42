use std::time::Duration;

use anyhow::Context;
use reqwest::StatusCode;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;
use serde::Deserialize;

use crate::isbn::Isbn;
use crate::metadata_client::{BookMetadata, BookMetadataClient, LookupError};

pub struct OpenLibraryClientConfig {
    /// Full url of the search endpoint, e.g. https://openlibrary.org/search.json
    pub search_url: String,
    /// Base url of the covers service, e.g. https://covers.openlibrary.org
    pub covers_url: String,
    pub timeout: Duration,
}

pub struct OpenLibraryClient {
    search_url: String,
    covers_url: String,
    client: ClientWithMiddleware,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    // only the first hit is decoded as a SearchDoc
    docs: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct SearchDoc {
    title: Option<String>,
    author_name: Option<Vec<String>>,
    first_sentence: Option<Vec<String>>,
    publisher: Option<Vec<String>>,
    language: Option<Vec<String>>,
}

impl OpenLibraryClient {
    pub fn new(config: OpenLibraryClientConfig) -> anyhow::Result<Self> {
        let reqwest_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build reqwest client")?;
        let client = ClientBuilder::new(reqwest_client)
            // Insert the tracing middleware
            .with(TracingMiddleware::default())
            .build();

        Ok(Self {
            search_url: config.search_url,
            covers_url: config.covers_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait::async_trait]
impl BookMetadataClient for OpenLibraryClient {
    #[tracing::instrument(skip_all, fields(isbn = %isbn))]
    async fn lookup(&self, isbn: &Isbn) -> Result<Option<BookMetadata>, LookupError> {
        let response = self
            .client
            .get(&self.search_url)
            .query(&[("isbn", isbn.as_str())])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(LookupError::UnexpectedStatus(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(reqwest_middleware::Error::from)?;
        let search: SearchResponse = serde_json::from_slice(&body)
            .map_err(|err| LookupError::MalformedResponse(err.to_string()))?;

        match search.docs.into_iter().next() {
            Some(doc) => {
                let doc: SearchDoc = serde_json::from_value(doc)
                    .map_err(|err| LookupError::MalformedResponse(err.to_string()))?;
                map_search_doc(doc, isbn, &self.covers_url).map(Some)
            }
            None => {
                tracing::debug!("Catalog has no documents for isbn");
                Ok(None)
            }
        }
    }
}

fn map_search_doc(
    doc: SearchDoc,
    isbn: &Isbn,
    covers_url: &str,
) -> Result<BookMetadata, LookupError> {
    let title = doc
        .title
        .map(|title| title.trim().to_string())
        .filter(|title| !title.is_empty())
        .ok_or_else(|| LookupError::MalformedResponse("Document has no title".to_string()))?;

    let author = doc
        .author_name
        .unwrap_or_default()
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

    Ok(BookMetadata {
        title,
        author,
        summary: first_non_empty(doc.first_sentence),
        cover_url: Some(cover_image_url(covers_url, isbn)),
        publisher: first_non_empty(doc.publisher),
        language: first_non_empty(doc.language),
    })
}

fn first_non_empty(values: Option<Vec<String>>) -> Option<String> {
    values?
        .into_iter()
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

/// Large cover image as served by the Open Library covers API
fn cover_image_url(covers_url: &str, isbn: &Isbn) -> String {
    format!("{}/b/isbn/{}-L.jpg", covers_url, isbn)
}

#[cfg(test)]
mod open_library_client_tests {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const COVERS_URL: &str = "https://covers.openlibrary.org";

    fn client_for(server: &MockServer, timeout: Duration) -> OpenLibraryClient {
        OpenLibraryClient::new(OpenLibraryClientConfig {
            search_url: format!("{}/search.json", server.uri()),
            covers_url: COVERS_URL.to_string(),
            timeout,
        })
        .expect("Failed to create client")
    }

    async fn mount_search_response(server: &MockServer, isbn: &str, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path("/search.json"))
            .and(query_param("isbn", isbn))
            .respond_with(response)
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_lookup_maps_first_document() {
        let server = MockServer::start().await;
        mount_search_response(
            &server,
            "9780306406157",
            ResponseTemplate::new(200).set_body_json(json!({
                "numFound": 1,
                "docs": [{
                    "title": "Data Structures",
                    "author_name": ["Jane Doe", "John Smith"],
                    "first_sentence": ["It begins."],
                    "publisher": ["Plenum", "Other"],
                    "language": ["eng"]
                }]
            })),
        )
        .await;

        let client = client_for(&server, Duration::from_secs(5));
        let isbn = Isbn::parse("978-0-306-40615-7").unwrap();
        let metadata = client
            .lookup(&isbn)
            .await
            .expect("Lookup failed")
            .expect("Book not found");

        assert_eq!(
            metadata,
            BookMetadata {
                title: "Data Structures".to_string(),
                author: "Jane Doe, John Smith".to_string(),
                summary: Some("It begins.".to_string()),
                cover_url: Some(
                    "https://covers.openlibrary.org/b/isbn/9780306406157-L.jpg".to_string()
                ),
                publisher: Some("Plenum".to_string()),
                language: Some("eng".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_lookup_defaults_optional_fields() {
        let server = MockServer::start().await;
        mount_search_response(
            &server,
            "0306406152",
            ResponseTemplate::new(200).set_body_json(json!({
                "docs": [{ "title": "T" }]
            })),
        )
        .await;

        let client = client_for(&server, Duration::from_secs(5));
        let metadata = client
            .lookup(&Isbn::parse("0306406152").unwrap())
            .await
            .expect("Lookup failed")
            .expect("Book not found");

        assert_eq!(metadata.title, "T");
        assert_eq!(metadata.author, "");
        assert_eq!(metadata.summary, None);
        assert_eq!(metadata.publisher, None);
        assert_eq!(metadata.language, None);
        assert_eq!(
            metadata.cover_url.as_deref(),
            Some("https://covers.openlibrary.org/b/isbn/0306406152-L.jpg")
        );
    }

    #[tokio::test]
    async fn test_lookup_ignores_documents_after_first() {
        let server = MockServer::start().await;
        mount_search_response(
            &server,
            "9780306406157",
            ResponseTemplate::new(200).set_body_json(json!({
                "docs": [
                    { "title": "First", "author_name": ["A"] },
                    { "title": 7, "author_name": "not a list" },
                    "garbage"
                ]
            })),
        )
        .await;

        let client = client_for(&server, Duration::from_secs(5));
        let metadata = client
            .lookup(&Isbn::parse("9780306406157").unwrap())
            .await
            .expect("Lookup failed")
            .expect("Book not found");

        assert_eq!(metadata.title, "First");
        assert_eq!(metadata.author, "A");
    }

    #[tokio::test]
    /// A valid ISBN unknown to the catalog is NotFound, not a lookup error
    async fn test_lookup_empty_docs_is_not_found() {
        let server = MockServer::start().await;
        mount_search_response(
            &server,
            "9780000000002",
            ResponseTemplate::new(200).set_body_json(json!({ "numFound": 0, "docs": [] })),
        )
        .await;

        let client = client_for(&server, Duration::from_secs(5));
        let result = client.lookup(&Isbn::parse("9780000000002").unwrap()).await;
        assert!(matches!(result, Ok(None)));
    }

    #[tokio::test]
    async fn test_lookup_404_is_not_found() {
        let server = MockServer::start().await;
        mount_search_response(&server, "9780000000002", ResponseTemplate::new(404)).await;

        let client = client_for(&server, Duration::from_secs(5));
        let result = client.lookup(&Isbn::parse("9780000000002").unwrap()).await;
        assert!(matches!(result, Ok(None)));
    }

    #[tokio::test]
    async fn test_lookup_server_error_is_lookup_error() {
        let server = MockServer::start().await;
        mount_search_response(&server, "9780306406157", ResponseTemplate::new(503)).await;

        let client = client_for(&server, Duration::from_secs(5));
        let result = client.lookup(&Isbn::parse("9780306406157").unwrap()).await;
        assert!(matches!(result, Err(LookupError::UnexpectedStatus(503))));
    }

    #[tokio::test]
    async fn test_lookup_malformed_payloads_are_lookup_errors() {
        let payloads = [
            json!({ "numFound": 1 }),
            json!({ "docs": "not a list" }),
            json!({ "docs": [{ "author_name": ["No Title"] }] }),
            json!({ "docs": [{ "title": "   " }] }),
            json!({ "docs": [{ "title": 42 }] }),
        ];

        for payload in payloads {
            let server = MockServer::start().await;
            mount_search_response(
                &server,
                "9780306406157",
                ResponseTemplate::new(200).set_body_json(payload.clone()),
            )
            .await;

            let client = client_for(&server, Duration::from_secs(5));
            let result = client.lookup(&Isbn::parse("9780306406157").unwrap()).await;
            assert!(
                matches!(result, Err(LookupError::MalformedResponse(_))),
                "payload {payload} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_lookup_timeout_is_lookup_error() {
        let server = MockServer::start().await;
        mount_search_response(
            &server,
            "9780306406157",
            ResponseTemplate::new(200)
                .set_body_json(json!({ "docs": [{ "title": "Slow" }] }))
                .set_delay(Duration::from_millis(500)),
        )
        .await;

        let client = client_for(&server, Duration::from_millis(50));
        let result = client.lookup(&Isbn::parse("9780306406157").unwrap()).await;
        assert!(matches!(result, Err(LookupError::Transport(_))));
    }
}
