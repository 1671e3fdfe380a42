use crate::api::Book;
use crate::books_repository::{BookRepository, BookRepositoryError};
use crate::isbn::Isbn;

#[derive(Default)]
pub struct InMemoryBookRepository {
    books: parking_lot::RwLock<Vec<Book>>,
}

#[async_trait::async_trait]
impl BookRepository for InMemoryBookRepository {
    async fn find_by_isbn(&self, isbn: &Isbn) -> Result<Option<Book>, BookRepositoryError> {
        Ok(self
            .books
            .read()
            .iter()
            .find(|book| book.isbn == isbn.as_str())
            .cloned())
    }

    async fn insert(&self, book: Book) -> Result<(), BookRepositoryError> {
        let mut locked_books = self.books.write();
        if locked_books.iter().any(|stored| stored.isbn == book.isbn) {
            return Err(BookRepositoryError::AlreadyExists(book.isbn));
        }
        locked_books.push(book);
        Ok(())
    }

    async fn list_books(&self) -> Result<Vec<Book>, BookRepositoryError> {
        Ok(self.books.read().clone())
    }
}

#[cfg(test)]
mod in_memory_book_repository_tests {
    use crate::books_repository::{
        test_book, BookRepository, BookRepositoryError, InMemoryBookRepository,
    };
    use crate::isbn::Isbn;

    #[tokio::test]
    /// Tests if insert and find_by_isbn work correctly
    async fn test_insert_book_and_find_it() {
        let repo = InMemoryBookRepository::default();
        let isbn = Isbn::parse("9780306406157").unwrap();

        let not_found = repo.find_by_isbn(&isbn).await.expect("Failed to find");
        assert_eq!(not_found, None);

        let book = test_book("9780306406157", "xx");
        repo.insert(book.clone()).await.expect("Failed to insert book");

        let found = repo.find_by_isbn(&isbn).await.expect("Failed to find");
        assert_eq!(found, Some(book));
    }

    #[tokio::test]
    /// Second insert for the same isbn is rejected and leaves a single row
    async fn test_insert_same_isbn_twice() {
        let repo = InMemoryBookRepository::default();

        repo.insert(test_book("0306406152", "first"))
            .await
            .expect("Failed to insert book");
        let second = repo.insert(test_book("0306406152", "second")).await;
        assert!(matches!(second, Err(BookRepositoryError::AlreadyExists(..))));

        let list = repo.list_books().await.expect("Failed to list books");
        assert_eq!(list, vec![test_book("0306406152", "first")]);
    }

    #[tokio::test]
    /// Tests if list_books returns books in insertion order
    async fn test_insert_books_and_list_them() {
        let repo = InMemoryBookRepository::default();

        let list = repo.list_books().await.expect("Failed to list books");
        assert!(list.is_empty());

        let book1 = test_book("9780306406157", "title1");
        let book2 = test_book("0306406152", "title2");

        repo.insert(book1.clone()).await.expect("Failed to insert book");
        let list = repo.list_books().await.expect("Failed to list books");
        assert_eq!(list, vec![book1.clone()]);

        repo.insert(book2.clone()).await.expect("Failed to insert book");
        let list = repo.list_books().await.expect("Failed to list books");
        assert_eq!(list, vec![book1, book2]);
    }
}
