//! Manually ordered collections.
//!
//! A collection is a list of items that carry an explicit `order` position.
//! After every completed reconciliation the orders of a collection of N items
//! are exactly `1..=N`. Mid-operation the list may transiently hold gaps or
//! duplicates; nothing here panics on them.
//!
//! The functions in this module are pure. Persisting their results and
//! recovering from storage failures is the job of [`crate::reconcile`].

mod errors;
mod types;


use std::collections::BTreeMap;

pub use errors::OrderError;
pub use types::{ImageField, ItemId, ItemPatch, NewItem, OrderUpdate, OrderedItem, Payload, Scope};

/// Anything with an identity and a position in a manually ordered collection.
pub trait Ordered {
    fn id(&self) -> ItemId;
    fn order(&self) -> u32;
    fn set_order(&mut self, order: u32);
}

impl Ordered for OrderedItem {
    fn id(&self) -> ItemId {
        self.id
    }

    fn order(&self) -> u32 {
        self.order
    }

    fn set_order(&mut self, order: u32) {
        self.order = order;
    }
}

impl Ordered for OrderUpdate {
    fn id(&self) -> ItemId {
        self.id
    }

    fn order(&self) -> u32 {
        self.order
    }

    fn set_order(&mut self, order: u32) {
        self.order = order;
    }
}

/// Position for an item appended to the collection: `max(order) + 1`, or 1 when empty.
pub fn next_order<T: Ordered>(items: &[T]) -> u32 {
    items
        .iter()
        .map(Ordered::order)
        .max()
        .unwrap_or(0)
        .saturating_add(1)
}

/// Confirm that the orders of `items` are exactly `1..=N`, in any iteration order.
///
/// Reports the first violation found: an order of 0, a shared position, or a
/// skipped position.
pub fn validate<T: Ordered>(items: &[T]) -> Result<(), OrderError> {
    let mut positions: BTreeMap<u32, ItemId> = BTreeMap::new();
    for item in items {
        if item.order() == 0 {
            return Err(OrderError::ZeroOrder { id: item.id() });
        }
        if let Some(first) = positions.insert(item.order(), item.id()) {
            return Err(OrderError::DuplicateOrder {
                order: item.order(),
                first,
                second: item.id(),
            });
        }
    }

    for (expected, found) in (1u32..).zip(positions.keys()) {
        if *found != expected {
            return Err(OrderError::Gap {
                expected,
                found: *found,
            });
        }
    }

    Ok(())
}

/// Sort ascending by order. Stable, so ties keep their relative order.
pub fn sort_by_order<T: Ordered>(items: &mut [T]) {
    items.sort_by_key(|item| item.order());
}

/// The `{id, order}` pairs of a collection, in its current sequence.
pub fn updates<T: Ordered>(items: &[T]) -> Vec<OrderUpdate> {
    items
        .iter()
        .map(|item| OrderUpdate {
            id: item.id(),
            order: item.order(),
        })
        .collect()
}

fn order_of<T: Ordered>(items: &[T], id: ItemId) -> Result<u32, OrderError> {
    items
        .iter()
        .find(|item| item.id() == id)
        .map(Ordered::order)
        .ok_or(OrderError::NotMember { id })
}

/// Exchange the positions of `dragged` and `target`.
///
/// Returns `Ok(None)` when both are the same item. Otherwise the returned
/// collection has the two orders swapped, every other item untouched, and is
/// sorted by order.
///
/// # Errors
/// [`OrderError::NotMember`] if either item is missing from `items`.
pub fn swap<T: Ordered + Clone>(
    items: &[T],
    dragged: ItemId,
    target: ItemId,
) -> Result<Option<Vec<T>>, OrderError> {
    if dragged == target {
        return Ok(None);
    }

    let dragged_order = order_of(items, dragged)?;
    let target_order = order_of(items, target)?;

    let mut swapped: Vec<T> = items
        .iter()
        .cloned()
        .map(|mut item| {
            if item.id() == dragged {
                item.set_order(target_order);
            } else if item.id() == target {
                item.set_order(dragged_order);
            }
            item
        })
        .collect();
    sort_by_order(&mut swapped);

    Ok(Some(swapped))
}

/// Order changes needed after an item is removed from a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compaction {
    /// Order held by the removed item, 0 if it was not in the collection
    pub deleted_order: u32,
    /// Every remaining item positioned after the removed one, moved up by one
    pub shifted: Vec<OrderUpdate>,
}

impl Compaction {
    pub fn is_empty(&self) -> bool {
        self.shifted.is_empty()
    }
}

/// Compute the shifts that close the gap left by `deleted`.
///
/// `items` is the collection as it was before the deletion.
pub fn compact_after_delete<T: Ordered>(items: &[T], deleted: ItemId) -> Compaction {
    let deleted_order = order_of(items, deleted).unwrap_or(0);
    let shifted = items
        .iter()
        .filter(|item| item.id() != deleted && item.order() > deleted_order)
        .map(|item| OrderUpdate {
            id: item.id(),
            order: item.order() - 1,
        })
        .collect();

    Compaction {
        deleted_order,
        shifted,
    }
}

/// Apply `updates` to the matching items of `items`. Unknown ids are ignored.
///
/// Returns how many items changed position.
pub fn apply_updates<T: Ordered>(items: &mut [T], updates: &[OrderUpdate]) -> usize {
    let by_id: BTreeMap<ItemId, u32> = updates.iter().map(|u| (u.id, u.order)).collect();
    let mut changed = 0;
    for item in items.iter_mut() {
        if let Some(order) = by_id.get(&item.id())
            && *order != item.order()
        {
            item.set_order(*order);
            changed += 1;
        }
    }
    changed
}
