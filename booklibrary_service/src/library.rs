use std::sync::Arc;

use crate::api::Book;
use crate::books_repository::{BookRepository, BookRepositoryError};
use crate::isbn::{InvalidIsbn, Isbn};
use crate::metadata_client::{BookMetadataClient, LookupError};

#[derive(thiserror::Error, Debug)]
pub enum LibraryError {
    #[error("Invalid ISBN: {0}")]
    InvalidIsbn(#[from] InvalidIsbn),

    #[error("Book {0} is already in the library")]
    AlreadyInLibrary(Isbn),

    #[error("Book {0} not found in the catalog")]
    BookNotFound(Isbn),

    #[error("Catalog lookup failed: {0}")]
    UpstreamFailure(#[from] LookupError),

    #[error("Storage failure: {0}")]
    StorageFailure(#[from] BookRepositoryError),
}

/// Entry point for all book operations, owns the storage and catalog handles
pub struct Library {
    books_repository: Arc<dyn BookRepository>,
    metadata_client: Arc<dyn BookMetadataClient>,
}

impl Library {
    pub fn new(
        books_repository: Arc<dyn BookRepository>,
        metadata_client: Arc<dyn BookMetadataClient>,
    ) -> Self {
        Self {
            books_repository,
            metadata_client,
        }
    }

    /// Validates the isbn and fetches book details from the catalog, nothing is stored
    #[tracing::instrument(skip(self))]
    pub async fn book_details(&self, raw_isbn: &str) -> Result<Book, LibraryError> {
        let isbn = Isbn::parse(raw_isbn)?;
        self.fetch_from_catalog(isbn).await
    }

    /// Saves book with given isbn using details fetched from the catalog.
    /// Books already in the library are rejected without asking the catalog
    #[tracing::instrument(skip(self))]
    pub async fn save_book(&self, raw_isbn: &str) -> Result<Book, LibraryError> {
        let isbn = Isbn::parse(raw_isbn)?;

        if self.books_repository.find_by_isbn(&isbn).await?.is_some() {
            return Err(LibraryError::AlreadyInLibrary(isbn));
        }

        let book = self.fetch_from_catalog(isbn.clone()).await?;

        match self.books_repository.insert(book.clone()).await {
            Ok(()) => {
                tracing::info!("Book {} saved", isbn);
                Ok(book)
            }
            // concurrent save of the same isbn won the race
            Err(BookRepositoryError::AlreadyExists(_)) => {
                Err(LibraryError::AlreadyInLibrary(isbn))
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn list_books(&self) -> Result<Vec<Book>, LibraryError> {
        Ok(self.books_repository.list_books().await?)
    }

    async fn fetch_from_catalog(&self, isbn: Isbn) -> Result<Book, LibraryError> {
        match self.metadata_client.lookup(&isbn).await? {
            Some(metadata) => Ok(metadata.into_book(isbn)),
            None => Err(LibraryError::BookNotFound(isbn)),
        }
    }
}
