use actix_web::http::StatusCode;
use actix_web::web::Data;
use actix_web::Error;
use actix_web::HttpResponse;
use paperclip::actix::{
    api_v2_operation,
    web::{self},
};

use crate::api::{ErrorCode, ErrorResponse, SaveBookRequest};
use crate::library::{Library, LibraryError};

pub(crate) fn error_response(status: StatusCode, code: ErrorCode, message: String) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse { code, message })
}

fn library_error_response(err: LibraryError) -> HttpResponse {
    match &err {
        LibraryError::InvalidIsbn(_) => {
            error_response(StatusCode::BAD_REQUEST, ErrorCode::InvalidIsbn, err.to_string())
        }
        LibraryError::BookNotFound(_) => {
            error_response(StatusCode::NOT_FOUND, ErrorCode::BookNotFound, err.to_string())
        }
        LibraryError::AlreadyInLibrary(_) => {
            error_response(StatusCode::CONFLICT, ErrorCode::AlreadyInLibrary, err.to_string())
        }
        LibraryError::UpstreamFailure(_) => {
            tracing::error!("Catalog lookup failed {}", err);
            error_response(
                StatusCode::BAD_GATEWAY,
                ErrorCode::UpstreamFailure,
                err.to_string(),
            )
        }
        LibraryError::StorageFailure(_) => {
            tracing::error!("Storage operation failed {}", err);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::StorageFailure,
                "Storage failure".to_string(),
            )
        }
    }
}

#[api_v2_operation]
pub async fn health() -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().finish())
}

#[api_v2_operation(
    summary = "Fetch book details by ISBN",
    description = "Returns author, title, summary and cover url for the given ISBN without saving it"
)]
pub async fn get_book_details(
    library: Data<Library>,
    isbn: web::Path<String>,
) -> Result<HttpResponse, Error> {
    Ok(match library.book_details(&isbn.into_inner()).await {
        Ok(book) => HttpResponse::Ok().json(book),
        Err(err) => library_error_response(err),
    })
}

#[api_v2_operation(
    summary = "List all books in the library",
    description = "Returns every saved book in the order they were added"
)]
pub async fn get_all_books(library: Data<Library>) -> Result<HttpResponse, Error> {
    Ok(match library.list_books().await {
        Ok(books) => HttpResponse::Ok().json(books),
        Err(err) => library_error_response(err),
    })
}

#[api_v2_operation(
    summary = "Save book to the library",
    description = "Fetches details of the book with given ISBN (10 or 13 digits) from the catalog and saves them"
)]
pub async fn save_book(
    library: Data<Library>,
    request: web::Json<SaveBookRequest>,
) -> Result<HttpResponse, Error> {
    Ok(match library.save_book(&request.into_inner().isbn).await {
        Ok(book) => HttpResponse::Created().json(book),
        Err(err) => library_error_response(err),
    })
}
