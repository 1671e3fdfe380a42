use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use crate::books_repository::PostgresBooksRepositoryConfig;
use crate::metadata_client::OpenLibraryClientConfig;

const CONFIG_PATH_ENV: &str = "BOOKLIBRARY_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/booklibrary.toml";
const ENV_PREFIX: &str = "BOOKLIBRARY";
const ENV_SEPARATOR: &str = "__";

/// Service configuration, layered from defaults, an optional toml file
/// and `BOOKLIBRARY__<SECTION>__<KEY>` environment variables
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub catalog: CatalogSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Keeps books in process memory instead of postgres
    pub in_memory: bool,
    pub hostname: String,
    pub username: String,
    pub password: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            in_memory: false,
            hostname: "127.0.0.1".to_string(),
            username: "postgres".to_string(),
            password: "postgres".to_string(),
        }
    }
}

impl DatabaseSettings {
    pub fn postgres_config(&self) -> PostgresBooksRepositoryConfig {
        PostgresBooksRepositoryConfig {
            hostname: self.hostname.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    pub search_url: String,
    pub covers_url: String,
    pub timeout_ms: u64,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            search_url: "https://openlibrary.org/search.json".to_string(),
            covers_url: "https://covers.openlibrary.org".to_string(),
            timeout_ms: 10_000,
        }
    }
}

impl CatalogSettings {
    pub fn open_library_config(&self) -> OpenLibraryClientConfig {
        OpenLibraryClientConfig {
            search_url: self.search_url.clone(),
            covers_url: self.covers_url.clone(),
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelemetrySettings {
    pub service_name: String,
    pub jaeger_enabled: bool,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            service_name: "booklibrary_service".to_string(),
            jaeger_enabled: true,
        }
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .separator(ENV_SEPARATOR)
        .try_parsing(true)
}

impl Settings {
    pub fn load() -> anyhow::Result<Self> {
        // a missing .env file is fine
        let _ = dotenvy::dotenv();

        let config_path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let builder = config::Config::builder()
            .add_source(config::File::with_name(&config_path).required(false))
            .add_source(environment());

        builder
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }
}
