//! Storage operations for the InMemory backend

use std::collections::BTreeSet;

use tracing::debug;

use super::{InMemory, Tables};
use crate::Result;
use crate::backend::{self, BackendError};
use crate::order::{self, ImageField, ItemId, ItemPatch, NewItem, OrderUpdate, OrderedItem, Scope};

fn find_mut(tables: &mut Tables, scope: Scope, id: ItemId) -> Result<&mut OrderedItem> {
    tables
        .items
        .get_mut(&scope)
        .and_then(|items| items.iter_mut().find(|item| item.id == id))
        .ok_or_else(|| BackendError::ItemNotFound { scope, id }.into())
}

pub(crate) async fn fetch_collection(backend: &InMemory, scope: Scope) -> Result<Vec<OrderedItem>> {
    let tables = backend.tables.read().await;
    let mut items = tables.items.get(&scope).cloned().unwrap_or_default();
    order::sort_by_order(&mut items);
    Ok(items)
}

pub(crate) async fn bulk_update_order(
    backend: &InMemory,
    scope: Scope,
    updates: &[OrderUpdate],
) -> Result<()> {
    let mut tables = backend.tables.write().await;
    let items = tables.items.entry(scope).or_default();

    // Check every id before touching anything
    let known: BTreeSet<ItemId> = items.iter().map(|item| item.id).collect();
    if let Some(missing) = updates.iter().find(|u| !known.contains(&u.id)) {
        return Err(BackendError::ItemNotFound {
            scope,
            id: missing.id,
        }
        .into());
    }

    let changed = order::apply_updates(items, updates);
    debug!(%scope, requested = updates.len(), changed, "Applied bulk order update");
    Ok(())
}

pub(crate) async fn delete_item(backend: &InMemory, scope: Scope, id: ItemId) -> Result<()> {
    let mut tables = backend.tables.write().await;
    let items = tables.items.entry(scope).or_default();
    let before = items.len();
    items.retain(|item| item.id != id);
    if items.len() == before {
        return Err(BackendError::ItemNotFound { scope, id }.into());
    }
    Ok(())
}

pub(crate) async fn create_item(
    backend: &InMemory,
    scope: Scope,
    item: NewItem,
) -> Result<OrderedItem> {
    backend::check_new_item(scope, &item)?;

    let mut tables = backend.tables.write().await;
    tables.last_id += 1;
    let id = tables.last_id;
    let items = tables.items.entry(scope).or_default();
    let created = OrderedItem::new(id, backend::creation_order(items, &item), item.payload);
    items.push(created.clone());
    Ok(created)
}

pub(crate) async fn update_item(
    backend: &InMemory,
    scope: Scope,
    id: ItemId,
    patch: ItemPatch,
) -> Result<OrderedItem> {
    let mut tables = backend.tables.write().await;
    let item = find_mut(&mut tables, scope, id)?;
    // Edit a copy so a rejected patch leaves the stored item untouched
    let mut edited = item.clone();
    backend::apply_patch(scope, &mut edited, patch)?;
    *item = edited.clone();
    Ok(edited)
}

pub(crate) async fn set_active(
    backend: &InMemory,
    scope: Scope,
    id: ItemId,
    active: bool,
) -> Result<OrderedItem> {
    let mut tables = backend.tables.write().await;
    let item = find_mut(&mut tables, scope, id)?;
    item.active = active;
    Ok(item.clone())
}

pub(crate) async fn clear_image(
    backend: &InMemory,
    scope: Scope,
    id: ItemId,
    field: ImageField,
) -> Result<OrderedItem> {
    let mut tables = backend.tables.write().await;
    let item = find_mut(&mut tables, scope, id)?;
    backend::clear_image_field(scope, item, field)?;
    Ok(item.clone())
}
