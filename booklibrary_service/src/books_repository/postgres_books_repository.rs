use anyhow::Context;
use tokio_postgres::error::SqlState;
use tokio_postgres::{Client, NoTls, Row, Statement};

use crate::api::Book;
use crate::books_repository::{BookRepository, BookRepositoryError};
use crate::isbn::Isbn;

pub struct PostgresBooksRepository {
    client: Client,
}

pub struct PostgresBooksRepositoryConfig {
    pub hostname: String,
    pub username: String,
    pub password: String,
}

impl PostgresBooksRepository {
    pub async fn init(config: PostgresBooksRepositoryConfig) -> anyhow::Result<Self> {
        let connection_str = format!(
            "postgresql://{}:{}@{}",
            config.username, config.password, config.hostname
        );
        tracing::info!(
            "Connecting to postgres at {} as {}",
            config.hostname,
            config.username
        );
        let (client, connection) = tokio_postgres::connect(&connection_str, NoTls)
            .await
            .context("Failed to start postgres")?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("Postgres connection error: {}", e);
            }
        });

        // id keeps the insertion order, isbn is the unique key
        client
            .batch_execute(
                "
        CREATE TABLE IF NOT EXISTS books (
            id              BIGSERIAL PRIMARY KEY,
            isbn            VARCHAR(13) NOT NULL UNIQUE,
            title           TEXT NOT NULL,
            author          TEXT NOT NULL,
            summary         TEXT,
            cover_url       TEXT,
            publisher       TEXT,
            language        TEXT
            )
        ",
            )
            .await
            .context("Failed to setup table")?;
        Ok(Self { client })
    }

    fn connected_client(&self) -> Result<&Client, BookRepositoryError> {
        if self.client.is_closed() {
            return Err(BookRepositoryError::Unavailable(
                "postgres connection is closed".to_string(),
            ));
        }
        Ok(&self.client)
    }
}

fn book_from_row(row: &Row) -> Result<Book, tokio_postgres::Error> {
    Ok(Book {
        isbn: row.try_get("isbn")?,
        title: row.try_get("title")?,
        author: row.try_get("author")?,
        summary: row.try_get("summary")?,
        cover_url: row.try_get("cover_url")?,
        publisher: row.try_get("publisher")?,
        language: row.try_get("language")?,
    })
}

#[async_trait::async_trait]
impl BookRepository for PostgresBooksRepository {
    async fn find_by_isbn(&self, isbn: &Isbn) -> Result<Option<Book>, BookRepositoryError> {
        let client = self.connected_client()?;
        let stmt: Statement = client
            .prepare(
                "SELECT isbn, title, author, summary, cover_url, publisher, language \
                 FROM books WHERE isbn = ($1)",
            )
            .await?;

        let rows = client.query(&stmt, &[&isbn.as_str()]).await?;

        Ok(rows.first().map(book_from_row).transpose()?)
    }

    async fn insert(&self, book: Book) -> Result<(), BookRepositoryError> {
        let client = self.connected_client()?;
        let stmt: Statement = client
            .prepare(
                "INSERT INTO books (isbn, title, author, summary, cover_url, publisher, language) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7) \
                 ON CONFLICT (isbn) DO NOTHING RETURNING isbn",
            )
            .await?;

        let rows = client
            .query(
                &stmt,
                &[
                    &book.isbn,
                    &book.title,
                    &book.author,
                    &book.summary,
                    &book.cover_url,
                    &book.publisher,
                    &book.language,
                ],
            )
            .await;

        match rows {
            Ok(rows) if rows.is_empty() => Err(BookRepositoryError::AlreadyExists(book.isbn)),
            Ok(_) => Ok(()),
            Err(err)
                if err
                    .as_db_error()
                    .map(|db_err| db_err.code() == &SqlState::UNIQUE_VIOLATION)
                    .unwrap_or_default() =>
            {
                Err(BookRepositoryError::AlreadyExists(book.isbn))
            }
            Err(other_err) => Err(other_err.into()),
        }
    }

    async fn list_books(&self) -> Result<Vec<Book>, BookRepositoryError> {
        let client = self.connected_client()?;
        let stmt: Statement = client
            .prepare(
                "SELECT isbn, title, author, summary, cover_url, publisher, language \
                 FROM books ORDER BY id",
            )
            .await?;

        let rows = client.query(&stmt, &[]).await?;

        rows.iter()
            .map(|row| Ok(book_from_row(row)?))
            .collect()
    }
}
