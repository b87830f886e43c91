//! Storage error types for the Vitrina backends.
//!
//! This module defines structured error types for storage operations,
//! shared by the local backends and the HTTP client store.

use thiserror::Error;

use crate::order::{ItemId, Scope};

/// Errors that can occur during storage operations.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Existing variants will not be removed in minor versions
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BackendError {
    /// Item not found in the given collection.
    #[error("Item {id} not found in {scope}")]
    ItemNotFound {
        /// The collection that was searched
        scope: Scope,
        /// The ID of the item that was not found
        id: ItemId,
    },

    /// Payload or field does not belong to the target collection.
    #[error("Expected a {expected} item, got a {found} item")]
    ScopeMismatch {
        /// The collection being written to
        expected: Scope,
        /// The collection the payload belongs to
        found: Scope,
    },

    /// Request rejected before reaching storage.
    #[error("Invalid item: {reason}")]
    InvalidItem {
        /// Description of what is wrong with the request
        reason: String,
    },

    /// Stored data could not be turned back into an item.
    #[error("Storage state inconsistency: {reason}")]
    StateInconsistency {
        /// Description of the inconsistency
        reason: String,
    },

    /// Serialization failed.
    #[error("Serialization failed")]
    SerializationFailed {
        /// The underlying serialization error
        #[source]
        source: serde_json::Error,
    },

    /// Deserialization failed.
    #[error("Deserialization failed")]
    DeserializationFailed {
        /// The underlying deserialization error
        #[source]
        source: serde_json::Error,
    },

    /// File I/O error.
    #[error("File I/O error")]
    FileIo {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// SQL database error.
    #[cfg(any(feature = "sqlite", feature = "postgres"))]
    #[error("SQL error: {reason}")]
    SqlxError {
        /// Description of the failed operation
        reason: String,
        /// The underlying sqlx error, if any
        #[source]
        source: Option<sqlx::Error>,
    },

    /// A remote server could not be reached or returned an unreadable body.
    #[error("Request to {url} failed: {reason}")]
    Transport {
        /// The URL that was requested
        url: String,
        /// Description of the failure
        reason: String,
    },

    /// A remote server answered with an error status.
    #[error("Server returned {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Message from the response body
        message: String,
    },
}

impl BackendError {
    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            BackendError::ItemNotFound { .. } | BackendError::Status { status: 404, .. }
        )
    }

    /// Check if this error indicates a rejected request.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            BackendError::ScopeMismatch { .. }
                | BackendError::InvalidItem { .. }
                | BackendError::Status { status: 400, .. }
        )
    }

    /// Check if this error indicates corrupt stored data.
    pub fn is_integrity_error(&self) -> bool {
        matches!(self, BackendError::StateInconsistency { .. })
    }

    /// Check if this error is related to I/O operations.
    pub fn is_io_error(&self) -> bool {
        matches!(
            self,
            BackendError::FileIo { .. }
                | BackendError::SerializationFailed { .. }
                | BackendError::DeserializationFailed { .. }
        )
    }

    /// Check if this error came from talking to a remote server.
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            BackendError::Transport { .. } | BackendError::Status { .. }
        )
    }

    /// Get the item ID if this error is about a specific item.
    pub fn item_id(&self) -> Option<ItemId> {
        match self {
            BackendError::ItemNotFound { id, .. } => Some(*id),
            _ => None,
        }
    }
}

// Conversion from BackendError to the main Error type
impl From<BackendError> for crate::Error {
    fn from(err: BackendError) -> Self {
        crate::Error::Backend(err)
    }
}
