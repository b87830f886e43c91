//! Backend creation and utility functions.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use vitrina::backend::{
    Backend as StoreBackend,
    database::{InMemory, Postgres, Sqlite},
    http::HttpStore,
};

use crate::cli::{Backend, BackendConfig, TargetArgs};

const SQLITE_FILE: &str = "vitrina.db";
const JSON_FILE: &str = "vitrina.json";

/// Redact credentials from a PostgreSQL connection URL for safe logging
pub fn redact_postgres_url(url: &str) -> String {
    if let Ok(parsed) = url::Url::parse(url) {
        let mut redacted = parsed.clone();
        if !parsed.username().is_empty() {
            let _ = redacted.set_username("***");
        }
        if parsed.password().is_some() {
            let _ = redacted.set_password(Some("***"));
        }
        redacted.to_string()
    } else {
        "postgres://***@<unparsable-url>".to_string()
    }
}

fn data_dir(config: &BackendConfig) -> PathBuf {
    config.data_dir.clone().unwrap_or_else(|| PathBuf::from("."))
}

/// Path of the JSON snapshot used by the in-memory backend.
pub fn json_path(config: &BackendConfig) -> PathBuf {
    data_dir(config).join(JSON_FILE)
}

/// Create the appropriate backend based on configuration
pub async fn create_backend(
    config: &BackendConfig,
) -> Result<Arc<dyn StoreBackend>, Box<dyn std::error::Error>> {
    let data_dir = data_dir(config);
    tokio::fs::create_dir_all(&data_dir).await?;

    match config.backend {
        Backend::Sqlite => {
            let db_path = data_dir.join(SQLITE_FILE);
            tracing::info!("Using SQLite backend at {}", db_path.display());
            Ok(Arc::new(Sqlite::open_sqlite(&db_path).await?))
        }
        Backend::Postgres => {
            let url = config
                .postgres_url
                .as_ref()
                .ok_or("PostgreSQL backend requires --postgres-url or VITRINA_POSTGRES_URL")?;

            let display_url = redact_postgres_url(url);
            tracing::info!("Connecting to PostgreSQL backend at {}", display_url);

            match Postgres::connect_postgres(url).await {
                Ok(backend) => {
                    tracing::info!("Connected to PostgreSQL successfully");
                    Ok(Arc::new(backend))
                }
                Err(e) => {
                    Err(format!("Failed to connect to PostgreSQL at {}: {}", display_url, e).into())
                }
            }
        }
        Backend::Inmemory => {
            let json_path = data_dir.join(JSON_FILE);
            tracing::info!(
                "Using in-memory backend with persistence at {}",
                json_path.display()
            );
            Ok(Arc::new(InMemory::load_from_file(&json_path).await?))
        }
    }
}

/// Open the store an item command works on: a remote server when `--url` is set.
pub async fn open_target(
    target: &TargetArgs,
) -> Result<Arc<dyn StoreBackend>, Box<dyn std::error::Error>> {
    match &target.url {
        Some(url) => {
            tracing::info!("Using server at {url}");
            Ok(Arc::new(HttpStore::new(url.as_str())?))
        }
        None => create_backend(&target.backend_config).await,
    }
}

/// Write the in-memory backend's contents to `path`; other backends persist on their own.
pub async fn save_if_in_memory(
    backend: &dyn StoreBackend,
    path: &Path,
) -> Result<bool, Box<dyn std::error::Error>> {
    match backend.as_any().downcast_ref::<InMemory>() {
        Some(in_memory) => {
            in_memory.save_to_file(path).await?;
            tracing::info!("Database saved to {}", path.display());
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Persist local changes made by an item command.
pub async fn finish_target(
    backend: &dyn StoreBackend,
    target: &TargetArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    if target.url.is_none() {
        save_if_in_memory(backend, &json_path(&target.backend_config)).await?;
    }
    Ok(())
}
