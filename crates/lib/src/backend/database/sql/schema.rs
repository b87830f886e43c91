//! The `home_items` schema, portable between SQLite and PostgreSQL.

use crate::Result;
use crate::backend::BackendError;

use super::SqlxBackend;

/// Version recorded in `schema_version` when a database is first initialized.
pub const SCHEMA_VERSION: i64 = 1;

pub const CREATE_TABLES: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS schema_version (
        version BIGINT PRIMARY KEY
    )",
    // Both collections share one table, told apart by scope.
    // `position` holds the display order; ORDER is reserved in both dialects.
    // Slides use the title/image columns, featured products use product_id.
    "CREATE TABLE IF NOT EXISTS home_items (
        id BIGINT PRIMARY KEY NOT NULL,
        scope TEXT NOT NULL,
        position BIGINT NOT NULL,
        active BIGINT NOT NULL DEFAULT 1,
        title TEXT,
        image_url TEXT,
        image_mobile_url TEXT,
        product_id BIGINT
    )",
];

pub const CREATE_INDEXES: &[&str] =
    &["CREATE INDEX IF NOT EXISTS idx_home_items_scope ON home_items(scope, position)"];

/// Create the tables and indexes that don't exist yet.
///
/// A database that already carries a version row keeps it untouched.
pub async fn initialize(backend: &SqlxBackend) -> Result<()> {
    let pool = backend.pool();

    for statement in CREATE_TABLES.iter().chain(CREATE_INDEXES) {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| BackendError::SqlxError {
                reason: format!("Schema creation failed: {e} - SQL: {statement}"),
                source: Some(e),
            })?;
    }

    let row: Option<(i64,)> = sqlx::query_as("SELECT version FROM schema_version")
        .fetch_optional(pool)
        .await
        .map_err(|e| BackendError::SqlxError {
            reason: format!("Failed to check schema version: {e}"),
            source: Some(e),
        })?;

    match row {
        Some((version,)) => {
            tracing::debug!(version, "Schema already initialized");
        }
        None => {
            sqlx::query("INSERT INTO schema_version (version) VALUES ($1)")
                .bind(SCHEMA_VERSION)
                .execute(pool)
                .await
                .map_err(|e| BackendError::SqlxError {
                    reason: format!("Failed to initialize schema version: {e}"),
                    source: Some(e),
                })?;
        }
    }

    Ok(())
}
