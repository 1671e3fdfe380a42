pub use open_library_client::{OpenLibraryClient, OpenLibraryClientConfig};

use crate::api::Book;
use crate::isbn::Isbn;

mod open_library_client;

/// Bibliographic data returned by the catalog for a single ISBN
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BookMetadata {
    pub title: String,
    pub author: String,
    pub summary: Option<String>,
    pub cover_url: Option<String>,
    pub publisher: Option<String>,
    pub language: Option<String>,
}

impl BookMetadata {
    pub fn into_book(self, isbn: Isbn) -> Book {
        Book {
            isbn: isbn.into_inner(),
            title: self.title,
            author: self.author,
            summary: self.summary,
            cover_url: self.cover_url,
            publisher: self.publisher,
            language: self.language,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum LookupError {
    #[error("Catalog request failed: {0}")]
    Transport(#[from] reqwest_middleware::Error),

    #[error("Catalog responded with status {0}")]
    UnexpectedStatus(u16),

    #[error("Malformed catalog response: {0}")]
    MalformedResponse(String),
}

#[async_trait::async_trait]
pub trait BookMetadataClient: Send + Sync {
    /// Looks the ISBN up in the external catalog with a single request.
    /// Returns None if the catalog does not know the ISBN
    async fn lookup(&self, isbn: &Isbn) -> Result<Option<BookMetadata>, LookupError>;
}
