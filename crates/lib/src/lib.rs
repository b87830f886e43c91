//!
//! Vitrina: the homepage content service of a storefront.
//! This library provides the components that keep manually ordered homepage
//! collections (carousel slides and featured products) consistent between an
//! admin client and the server that persists them.
//!
//! ## Core Concepts
//!
//! * **Ordered collections (`order::OrderedItem`)**: items carrying an explicit
//!   `order` position. Once reconciled, the orders of a collection of N items are
//!   exactly `1..=N`.
//! * **State container (`state::CollectionState`)**: the client's in-memory copy of a
//!   collection, mutated only through a fixed set of `state::Action`s.
//! * **Reconciler (`reconcile::Reconciler`)**: applies drag-and-drop swaps and
//!   deletions optimistically, persists them, and reloads the authoritative state when
//!   persistence fails.
//! * **Backends (`backend::Backend`)**: pluggable storage for the collections:
//!     * **InMemory (`backend::database::InMemory`)**: maps behind async locks, with JSON persistence.
//!     * **SqlxBackend (`backend::database::SqlxBackend`)**: SQLite or PostgreSQL through sqlx.
//!     * **HttpStore (`backend::http::HttpStore`)**: a remote server reached over its REST API.
//! * **REST API (`api`)**: the axum router that exposes a backend to admin and public clients.
//! * **Cart and catalog (`cart`, `catalog`)**: the storefront's client-side shopping cart
//!   and the product listing filter/sort pipeline.

pub mod api;
pub mod backend;
pub mod cart;
pub mod catalog;
pub mod order;
pub mod reconcile;
pub mod state;

pub use order::{ItemId, OrderUpdate, OrderedItem, Payload, Scope};
pub use reconcile::Reconciler;

/// Result type used throughout the Vitrina library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Vitrina library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured ordering errors from the order module
    #[error(transparent)]
    Order(order::OrderError),

    /// Structured storage errors from the backend module
    #[error(transparent)]
    Backend(backend::BackendError),

    /// Structured cart errors from the cart module
    #[error(transparent)]
    Cart(cart::CartError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Order(_) => "order",
            Error::Backend(_) => "backend",
            Error::Cart(_) => "cart",
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Order(order_err) => order_err.is_not_member(),
            Error::Backend(backend_err) => backend_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error is caused by invalid input.
    pub fn is_validation_error(&self) -> bool {
        match self {
            Error::Order(_) => true,
            Error::Backend(backend_err) => backend_err.is_validation_error(),
            Error::Cart(_) => true,
            _ => false,
        }
    }

    /// Check if this error is storage-related.
    pub fn is_backend_error(&self) -> bool {
        matches!(self, Error::Backend(_))
    }

    /// Check if this error came from talking to a remote server.
    pub fn is_transport_error(&self) -> bool {
        match self {
            Error::Backend(backend_err) => backend_err.is_transport_error(),
            _ => false,
        }
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        match self {
            Error::Io(_) => true,
            Error::Backend(backend_err) => backend_err.is_io_error(),
            _ => false,
        }
    }
}
