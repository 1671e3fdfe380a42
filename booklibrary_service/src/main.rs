use std::sync::Arc;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use anyhow::Context;
use paperclip::actix::OpenApiExt;
use tracing_actix_web::TracingLogger;

use booklibrary_service::app_config::{config_app, json_config};
use booklibrary_service::books_repository::{
    BookRepository, InMemoryBookRepository, PostgresBooksRepository,
};
use booklibrary_service::library::Library;
use booklibrary_service::metadata_client::OpenLibraryClient;
use booklibrary_service::settings::Settings;
use booklibrary_service::telemetry::{init_telemetry, shutdown_telemetry};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load()?;
    init_telemetry(&settings.telemetry)?;

    let result = run(settings).await;
    if let Err(err) = &result {
        tracing::error!("Service failed: {:#}", err);
    }
    // pending spans are exported on both exit paths
    shutdown_telemetry();
    result
}

async fn run(settings: Settings) -> anyhow::Result<()> {
    let books_repository: Arc<dyn BookRepository> = if settings.database.in_memory {
        tracing::warn!("Using in memory database, books are lost on restart");
        Arc::new(InMemoryBookRepository::default())
    } else {
        Arc::new(
            PostgresBooksRepository::init(settings.database.postgres_config())
                .await
                .context("Failed to init postgres")?,
        )
    };
    let metadata_client = Arc::new(
        OpenLibraryClient::new(settings.catalog.open_library_config())
            .context("Failed to create catalog client")?,
    );

    let library = Data::new(Library::new(books_repository, metadata_client));

    let host = settings.server.host.clone();
    let port = settings.server.port;
    tracing::info!("Starting HTTP server at http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .wrap_api()
            .app_data(library.clone())
            .app_data(json_config())
            .wrap(NormalizePath::trim())
            .wrap(TracingLogger::default())
            .configure(config_app)
            .with_json_spec_at("/apispec/v2")
            .build()
    })
    .bind((host.as_str(), port))?
    .run()
    .await?;

    // the library and its storage connection are dropped with the server
    tracing::info!("HTTP server stopped");
    Ok(())
}
