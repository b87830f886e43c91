//! In-memory database backend implementation
//!
//! This module provides an in-memory implementation of the storage traits,
//! suitable for testing, development, or single-process deployments that
//! persist by saving the whole state to a JSON file.

mod persistence;
mod storage;

use std::any::Any;
use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::Result;
use crate::backend::{Backend, OrderStore};
use crate::order::{ImageField, ItemId, ItemPatch, NewItem, OrderUpdate, OrderedItem, Scope};

/// Everything guarded by the backend's lock.
#[derive(Debug, Default, Clone)]
pub(crate) struct Tables {
    /// Items of each collection, in no particular order
    pub(crate) items: BTreeMap<Scope, Vec<OrderedItem>>,
    /// Highest id handed out so far. Ids are unique across collections.
    pub(crate) last_id: i64,
}

/// A simple in-memory database implementation.
///
/// All collections live behind a single `RwLock`, so every operation observes
/// and produces a consistent snapshot. [`bulk_update_order`](OrderStore::bulk_update_order)
/// checks the whole batch before writing any of it.
///
/// Basic persistence is provided by [`save_to_file`](InMemory::save_to_file) and
/// [`load_from_file`](InMemory::load_from_file), serializing the state to JSON.
#[derive(Debug, Default)]
pub struct InMemory {
    pub(crate) tables: RwLock<Tables>,
}

impl InMemory {
    /// Creates a new, empty `InMemory` database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of items stored in a collection.
    pub async fn count(&self, scope: Scope) -> usize {
        let tables = self.tables.read().await;
        tables.items.get(&scope).map_or(0, Vec::len)
    }

    /// Saves the entire database state to a specified file as JSON.
    ///
    /// # Returns
    /// A `Result` indicating success or an I/O or serialization error.
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        persistence::save_to_file(self, path).await
    }

    /// Loads the database state from a specified JSON file.
    ///
    /// If the file does not exist, a new, empty `InMemory` database is returned.
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        persistence::load_from_file(path).await
    }
}

#[async_trait]
impl OrderStore for InMemory {
    async fn fetch_collection(&self, scope: Scope) -> Result<Vec<OrderedItem>> {
        storage::fetch_collection(self, scope).await
    }

    async fn bulk_update_order(&self, scope: Scope, updates: &[OrderUpdate]) -> Result<()> {
        storage::bulk_update_order(self, scope, updates).await
    }

    async fn delete_item(&self, scope: Scope, id: ItemId) -> Result<()> {
        storage::delete_item(self, scope, id).await
    }
}

#[async_trait]
impl Backend for InMemory {
    async fn create_item(&self, scope: Scope, item: NewItem) -> Result<OrderedItem> {
        storage::create_item(self, scope, item).await
    }

    async fn update_item(&self, scope: Scope, id: ItemId, patch: ItemPatch) -> Result<OrderedItem> {
        storage::update_item(self, scope, id, patch).await
    }

    async fn set_active(&self, scope: Scope, id: ItemId, active: bool) -> Result<OrderedItem> {
        storage::set_active(self, scope, id, active).await
    }

    async fn clear_image(&self, scope: Scope, id: ItemId, field: ImageField) -> Result<OrderedItem> {
        storage::clear_image(self, scope, id, field).await
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
