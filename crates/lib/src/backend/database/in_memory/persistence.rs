//! Persistence operations for InMemory database
//!
//! This module handles serialization and file I/O for saving/loading
//! the in-memory database state to/from JSON files.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use tokio::sync::RwLock;

use super::{InMemory, Tables};
use crate::{
    Error, Result,
    backend::BackendError,
    order::{OrderedItem, Scope},
};

/// The current persistence file format version.
/// v0 indicates this is an unstable format subject to breaking changes.
const PERSISTENCE_VERSION: u8 = 0;

/// Helper to check if version is default (0) for serde skip_serializing_if
fn is_v0(v: &u8) -> bool {
    *v == 0
}

/// Validates the persistence version during deserialization.
fn validate_persistence_version<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let version = u8::deserialize(deserializer)?;
    if version != PERSISTENCE_VERSION {
        return Err(serde::de::Error::custom(format!(
            "unsupported persistence version {version}; only version {PERSISTENCE_VERSION} is supported"
        )));
    }
    Ok(version)
}

/// Serializable version of InMemory database for persistence
#[derive(Serialize, Deserialize)]
struct SerializableDatabase {
    /// File format version for compatibility checking
    #[serde(
        rename = "_v",
        default,
        skip_serializing_if = "is_v0",
        deserialize_with = "validate_persistence_version"
    )]
    version: u8,
    #[serde(default)]
    items: BTreeMap<Scope, Vec<OrderedItem>>,
    #[serde(default)]
    last_id: i64,
}

/// Saves the entire database state to a specified file as JSON.
pub(crate) async fn save_to_file<P: AsRef<Path>>(backend: &InMemory, path: P) -> Result<()> {
    let tables = backend.tables.read().await.clone();
    let serializable = SerializableDatabase {
        version: PERSISTENCE_VERSION,
        items: tables.items,
        last_id: tables.last_id,
    };

    let json = serde_json::to_string_pretty(&serializable)
        .map_err(|e| -> Error { BackendError::SerializationFailed { source: e }.into() })?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| -> Error { BackendError::FileIo { source: e }.into() })
}

/// Loads the database state from a specified JSON file.
///
/// If the file does not exist, a new, empty `InMemory` database is returned.
/// The id counter never goes below the highest stored id, so a hand-edited file
/// cannot cause id reuse.
pub(crate) async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<InMemory> {
    match tokio::fs::read_to_string(path).await {
        Ok(json) => {
            let serializable: SerializableDatabase = serde_json::from_str(&json)
                .map_err(|e| -> Error { BackendError::DeserializationFailed { source: e }.into() })?;
            let max_id = serializable
                .items
                .values()
                .flatten()
                .map(|item| item.id.get())
                .max()
                .unwrap_or(0);
            Ok(InMemory {
                tables: RwLock::new(Tables {
                    items: serializable.items,
                    last_id: serializable.last_id.max(max_id),
                }),
            })
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(InMemory::new()),
        Err(e) => Err(BackendError::FileIo { source: e }.into()),
    }
}
