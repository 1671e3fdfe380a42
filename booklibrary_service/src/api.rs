use paperclip::actix::Apiv2Schema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
/// Book stored in the library, identified by its normalized ISBN
pub struct Book {
    pub isbn: String,
    pub title: String,
    /// All contributors joined into one string, empty if the catalog has none
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
/// Body of POST /books, only the ISBN is taken from the client
pub struct SaveBookRequest {
    pub isbn: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidIsbn,
    InvalidRequest,
    BookNotFound,
    AlreadyInLibrary,
    UpstreamFailure,
    StorageFailure,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
}
