//! Storage for ordered homepage collections
//!
//! This module provides the storage traits and their implementations.
//!
//! [`OrderStore`] is the narrow interface the reconciler depends on: fetch a
//! collection, bulk-update orders, delete an item. [`Backend`] extends it with
//! the rest of the admin surface (create, edit, toggle). This keeps the
//! reconciliation logic independent of whether the collection lives in memory,
//! in a SQL database, or behind a remote server.

use std::any::Any;

use async_trait::async_trait;

use crate::Result;
use crate::order::{self, ImageField, ItemId, ItemPatch, NewItem, OrderUpdate, OrderedItem, Payload, Scope};

pub mod database;
mod errors;
pub mod http;

pub use errors::BackendError;

/// The storage operations a reconciler needs.
///
/// Every operation is keyed by [`Scope`]; collections never share positions.
/// Implementations must be `Send` and `Sync` so a store can be shared between
/// request handlers.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// The full collection as currently persisted, sorted by order.
    async fn fetch_collection(&self, scope: Scope) -> Result<Vec<OrderedItem>>;

    /// Set the order of every listed item.
    ///
    /// Either all updates are applied or none are. An unknown id fails the
    /// whole batch with `BackendError::ItemNotFound`. No uniqueness or gap
    /// check is performed: the batch may describe a transient state.
    async fn bulk_update_order(&self, scope: Scope, updates: &[OrderUpdate]) -> Result<()>;

    /// Remove an item. Other items keep their orders; compaction is the caller's job.
    async fn delete_item(&self, scope: Scope, id: ItemId) -> Result<()>;
}

/// The full storage surface used by the REST API and the admin CLI.
#[async_trait]
pub trait Backend: OrderStore {
    /// Items visible on the public homepage: active ones, sorted by order.
    async fn fetch_active(&self, scope: Scope) -> Result<Vec<OrderedItem>> {
        let mut items = self.fetch_collection(scope).await?;
        items.retain(|item| item.active);
        Ok(items)
    }

    /// Create an item, appending it when no explicit order is requested.
    async fn create_item(&self, scope: Scope, item: NewItem) -> Result<OrderedItem>;

    /// Edit fields of an item.
    async fn update_item(&self, scope: Scope, id: ItemId, patch: ItemPatch) -> Result<OrderedItem>;

    /// Show or hide an item without changing its position.
    async fn set_active(&self, scope: Scope, id: ItemId, active: bool) -> Result<OrderedItem>;

    /// Drop one image reference of a slide, keeping the row.
    async fn clear_image(&self, scope: Scope, id: ItemId, field: ImageField) -> Result<OrderedItem>;

    /// Returns a reference to the backend as `&dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}

fn has_value(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

/// Reject creation requests that do not fit the target collection.
pub(crate) fn check_new_item(scope: Scope, item: &NewItem) -> Result<()> {
    match (&item.payload, scope) {
        (Payload::Product { .. }, Scope::Products) => Ok(()),
        (
            Payload::Slide {
                image_url,
                image_mobile_url,
                ..
            },
            Scope::Carousel,
        ) => {
            if has_value(image_url) || has_value(image_mobile_url) {
                Ok(())
            } else {
                Err(BackendError::InvalidItem {
                    reason: "a slide needs a desktop or a mobile image".to_string(),
                }
                .into())
            }
        }
        // A product request without product_id deserializes as an empty slide
        (Payload::Slide { .. }, Scope::Products) => Err(BackendError::InvalidItem {
            reason: "product_id is required".to_string(),
        }
        .into()),
        (payload, scope) => Err(BackendError::ScopeMismatch {
            expected: scope,
            found: payload.scope(),
        }
        .into()),
    }
}

/// Order a created item gets in `existing`.
pub(crate) fn creation_order(existing: &[OrderedItem], item: &NewItem) -> u32 {
    item.requested_order()
        .unwrap_or_else(|| order::next_order(existing))
}

/// Apply an edit to a stored item in place.
pub(crate) fn apply_patch(scope: Scope, item: &mut OrderedItem, patch: ItemPatch) -> Result<()> {
    if patch.is_empty() {
        return Err(BackendError::InvalidItem {
            reason: "nothing to update".to_string(),
        }
        .into());
    }
    if patch.order == Some(0) {
        return Err(BackendError::InvalidItem {
            reason: "order must be positive".to_string(),
        }
        .into());
    }

    match &mut item.payload {
        Payload::Slide {
            title,
            image_url,
            image_mobile_url,
        } => {
            if patch.product_id.is_some() {
                return Err(BackendError::ScopeMismatch {
                    expected: scope,
                    found: Scope::Products,
                }
                .into());
            }
            if let Some(value) = patch.title {
                *title = Some(value);
            }
            if let Some(value) = patch.image_url {
                *image_url = Some(value);
            }
            if let Some(value) = patch.image_mobile_url {
                *image_mobile_url = Some(value);
            }
        }
        Payload::Product { product_id } => {
            if patch.title.is_some() || patch.image_url.is_some() || patch.image_mobile_url.is_some()
            {
                return Err(BackendError::ScopeMismatch {
                    expected: scope,
                    found: Scope::Carousel,
                }
                .into());
            }
            if let Some(value) = patch.product_id {
                *product_id = value;
            }
        }
    }

    if let Some(order) = patch.order {
        item.order = order;
    }
    Ok(())
}

/// Clear one image reference of a slide.
pub(crate) fn clear_image_field(scope: Scope, item: &mut OrderedItem, field: ImageField) -> Result<()> {
    match &mut item.payload {
        Payload::Slide {
            image_url,
            image_mobile_url,
            ..
        } => {
            match field {
                ImageField::ImageUrl => *image_url = None,
                ImageField::ImageMobileUrl => *image_mobile_url = None,
            }
            Ok(())
        }
        Payload::Product { .. } => Err(BackendError::ScopeMismatch {
            expected: scope,
            found: Scope::Carousel,
        }
        .into()),
    }
}
