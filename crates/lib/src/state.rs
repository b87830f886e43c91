//! Client-side state container for one ordered collection.
//!
//! The admin client keeps a cached copy of each collection it edits. The copy
//! only changes through [`CollectionState::apply`], which makes every rule the
//! reconciler relies on testable without a storage backend.

use crate::order::{self, ItemId, OrderedItem};

/// The actions that can change a cached collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Insert a freshly created item.
    AddItem(OrderedItem),
    /// Replace the collection with a locally reordered version.
    Reorder(Vec<OrderedItem>),
    /// Remove an item and close the gap it leaves.
    Delete(ItemId),
    /// Replace the collection with the authoritative state from storage.
    Reload(Vec<OrderedItem>),
    /// Flip an item's visibility without touching its position.
    SetActive { id: ItemId, active: bool },
}

/// Cached copy of a collection, always sorted by order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionState {
    items: Vec<OrderedItem>,
    /// Set when the cache could not be refreshed after a failed write.
    stale: bool,
}

impl CollectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a state from items fetched from storage.
    pub fn loaded(items: Vec<OrderedItem>) -> Self {
        let mut state = Self::new();
        state.apply(Action::Reload(items));
        state
    }

    pub fn items(&self) -> &[OrderedItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: ItemId) -> Option<&OrderedItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Whether the cache may disagree with storage.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn mark_stale(&mut self) {
        self.stale = true;
    }

    /// Position a new item would get when appended.
    pub fn next_order(&self) -> u32 {
        order::next_order(&self.items)
    }

    /// Apply one action to the cached collection.
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::AddItem(item) => {
                self.items.retain(|existing| existing.id != item.id);
                self.items.push(item);
                order::sort_by_order(&mut self.items);
            }
            Action::Reorder(items) => {
                self.items = items;
                order::sort_by_order(&mut self.items);
            }
            Action::Delete(id) => {
                if self.get(id).is_none() {
                    return;
                }
                let compaction = order::compact_after_delete(&self.items, id);
                self.items.retain(|item| item.id != id);
                order::apply_updates(&mut self.items, &compaction.shifted);
            }
            Action::Reload(items) => {
                self.items = items;
                order::sort_by_order(&mut self.items);
                self.stale = false;
            }
            Action::SetActive { id, active } => {
                if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
                    item.active = active;
                }
            }
        }
    }

    /// Take the items out, leaving an empty collection behind.
    pub fn into_items(self) -> Vec<OrderedItem> {
        self.items
    }
}
