//! Database-style backend implementations
//!
//! These backends own the data: an in-memory store with JSON file persistence,
//! and SQL storage through sqlx.

mod in_memory;
#[cfg(any(feature = "sqlite", feature = "postgres"))]
pub mod sql;

pub use in_memory::InMemory;
#[cfg(feature = "postgres")]
pub use sql::Postgres;
#[cfg(feature = "sqlite")]
pub use sql::Sqlite;
#[cfg(any(feature = "sqlite", feature = "postgres"))]
pub use sql::{DbKind, SqlxBackend};
