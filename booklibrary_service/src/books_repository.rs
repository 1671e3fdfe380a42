pub use in_memory_books_repository::InMemoryBookRepository;
pub use postgres_books_repository::{PostgresBooksRepository, PostgresBooksRepositoryConfig};

use crate::api::Book;
use crate::isbn::Isbn;

mod in_memory_books_repository;
mod postgres_books_repository;

#[derive(thiserror::Error, Debug)]
pub enum BookRepositoryError {
    #[error("Book {0} already exists")]
    AlreadyExists(String),

    #[error("Database failure: {0}")]
    DatabaseFailure(#[from] tokio_postgres::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

#[async_trait::async_trait]
pub trait BookRepository: Send + Sync {
    /// Retrieves the book with given isbn, None if it was never saved
    async fn find_by_isbn(&self, isbn: &Isbn) -> Result<Option<Book>, BookRepositoryError>;
    /// Adds book to repository, fails with AlreadyExists if a book with the same isbn is there
    async fn insert(&self, book: Book) -> Result<(), BookRepositoryError>;
    /// Lists all books in the repository in insertion order
    async fn list_books(&self) -> Result<Vec<Book>, BookRepositoryError>;
}

#[cfg(test)]
pub(crate) fn test_book(isbn: &str, title: &str) -> Book {
    Book {
        isbn: isbn.to_string(),
        title: title.to_string(),
        author: "www".to_string(),
        summary: None,
        cover_url: Some(format!(
            "https://covers.openlibrary.org/b/isbn/{}-L.jpg",
            isbn
        )),
        publisher: Some("aaad".to_string()),
        language: None,
    }
}
