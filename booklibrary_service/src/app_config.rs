use actix_web::error::InternalError;
use actix_web::http::StatusCode;
use paperclip::actix::web;

use crate::api::ErrorCode;
use crate::handlers;

pub fn config_app(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(handlers::health)))
        .service(
            web::resource("/isbn/{isbn}").route(web::get().to(handlers::get_book_details)),
        )
        .service(
            web::resource("/books")
                .route(web::get().to(handlers::get_all_books))
                .route(web::post().to(handlers::save_book)),
        );
}

/// Rejects unparsable or incomplete JSON bodies with the same error shape as the handlers
pub fn json_config() -> actix_web::web::JsonConfig {
    actix_web::web::JsonConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        InternalError::from_response(
            err,
            handlers::error_response(StatusCode::BAD_REQUEST, ErrorCode::InvalidRequest, message),
        )
        .into()
    })
}
