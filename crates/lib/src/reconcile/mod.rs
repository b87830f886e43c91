//! Optimistic reordering of one collection against its store.
//!
//! A [`Reconciler`] holds the admin client's cached copy of a single
//! collection. Drag-and-drop swaps and deletions are applied to that copy
//! first and persisted second. When persistence fails, the authoritative
//! collection is fetched again so the cached copy converges on whatever the
//! store actually holds.
//!
//! Every action moves through the same phases:
//!
//! ```text
//! Idle -> Computing -> Persisting -> Reconciled    -> Idle
//!                                 \-> ReloadOnError -> Idle
//! ```
//!
//! Actions on one reconciler run one at a time. The cached copy is published
//! as soon as it changes, so readers see an optimistic swap while the store
//! is still writing it. Storage failures are reported in the returned
//! outcome; only a request naming an item that is not part of the collection
//! is returned as an `Err`.


use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tracing::{debug, warn};

use crate::Result;
use crate::backend::OrderStore;
use crate::order::{self, ItemId, OrderUpdate, OrderedItem, Scope};
use crate::state::{Action, CollectionState};

/// Where a reconciler is within its current action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No action in flight
    Idle,
    /// Working out the new orders locally
    Computing,
    /// Waiting on the store
    Persisting,
    /// The store accepted every write
    Reconciled,
    /// A write failed and the collection is being fetched again
    ReloadOnError,
}

/// Result of [`Reconciler::swap`].
#[derive(Debug)]
pub enum SwapOutcome {
    /// Both ids named the same item. Nothing was sent to the store.
    Unchanged,
    /// The new orders were stored.
    Persisted,
    /// Storing failed; the cached copy was reloaded from the store.
    Reverted { cause: crate::Error },
}

impl SwapOutcome {
    pub fn is_persisted(&self) -> bool {
        matches!(self, SwapOutcome::Persisted)
    }

    /// The storage error that caused a revert.
    pub fn cause(&self) -> Option<&crate::Error> {
        match self {
            SwapOutcome::Reverted { cause } => Some(cause),
            _ => None,
        }
    }
}

/// Result of [`Reconciler::delete`].
#[derive(Debug)]
pub enum DeleteOutcome {
    /// The item is gone and every later item moved up by one.
    Compacted { shifted: Vec<OrderUpdate> },
    /// The store refused the deletion. Nothing changed.
    DeleteFailed { cause: crate::Error },
    /// The item is gone but the shift failed, leaving a gap in the stored orders
    /// until they are rewritten.
    CompactFailed {
        shifted: Vec<OrderUpdate>,
        cause: crate::Error,
    },
}

impl DeleteOutcome {
    pub fn is_compacted(&self) -> bool {
        matches!(self, DeleteOutcome::Compacted { .. })
    }

    /// The storage error, if any step failed.
    pub fn cause(&self) -> Option<&crate::Error> {
        match self {
            DeleteOutcome::Compacted { .. } => None,
            DeleteOutcome::DeleteFailed { cause } | DeleteOutcome::CompactFailed { cause, .. } => {
                Some(cause)
            }
        }
    }
}

/// Client-side owner of one ordered collection.
///
/// Generic over the store so it can sit on a concrete backend or on a
/// `dyn Backend` shared with other parts of a program.
pub struct Reconciler<S: OrderStore + ?Sized = dyn OrderStore> {
    store: Arc<S>,
    scope: Scope,
    /// Held for the whole of an action, store round trips included
    actions: Mutex<()>,
    /// Never borrowed across an await
    state: watch::Sender<CollectionState>,
    phase: watch::Sender<Phase>,
}

impl<S: OrderStore + ?Sized> Reconciler<S> {
    /// Fetch the collection and start tracking it.
    pub async fn load(store: Arc<S>, scope: Scope) -> Result<Self> {
        let items = store.fetch_collection(scope).await?;
        debug!(%scope, count = items.len(), "Loaded collection");
        let (state, _) = watch::channel(CollectionState::loaded(items));
        let (phase, _) = watch::channel(Phase::Idle);
        Ok(Self {
            store,
            scope,
            actions: Mutex::new(()),
            state,
            phase,
        })
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Subscribe to phase changes.
    pub fn phases(&self) -> watch::Receiver<Phase> {
        self.phase.subscribe()
    }

    /// The phase of the action in flight, or `Idle`.
    pub fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    /// Subscribe to changes of the cached collection.
    pub fn changes(&self) -> watch::Receiver<CollectionState> {
        self.state.subscribe()
    }

    /// Copy of the cached collection, sorted by order.
    pub async fn snapshot(&self) -> Vec<OrderedItem> {
        self.state.borrow().items().to_vec()
    }

    /// Order a newly created item should get.
    pub async fn next_order(&self) -> u32 {
        self.state.borrow().next_order()
    }

    /// Whether the cached copy could not be refreshed after a failure.
    pub async fn is_stale(&self) -> bool {
        self.state.borrow().is_stale()
    }

    /// Replace the cached copy with the stored collection.
    pub async fn reload(&self) -> Result<()> {
        let _action = self.actions.lock().await;
        self.refresh().await
    }

    /// Record an item that was created directly through the store.
    pub async fn add(&self, item: OrderedItem) {
        self.dispatch(Action::AddItem(item));
    }

    /// Record a visibility change made through the store.
    pub async fn set_active(&self, id: ItemId, active: bool) {
        self.dispatch(Action::SetActive { id, active });
    }

    /// Exchange the positions of two items and persist the whole collection.
    ///
    /// The swapped collection is visible through [`snapshot`](Self::snapshot)
    /// before the store has answered.
    ///
    /// # Errors
    /// [`OrderError::NotMember`](crate::order::OrderError::NotMember) when
    /// either id is not in the cached collection. Storage failures are
    /// reported as [`SwapOutcome::Reverted`].
    pub async fn swap(&self, dragged: ItemId, target: ItemId) -> Result<SwapOutcome> {
        let _action = self.actions.lock().await;
        self.enter(Phase::Computing);

        let before = self.state.borrow().items().to_vec();
        let swapped = match order::swap(&before, dragged, target) {
            Ok(Some(swapped)) => swapped,
            Ok(None) => {
                self.enter(Phase::Idle);
                return Ok(SwapOutcome::Unchanged);
            }
            Err(e) => {
                self.enter(Phase::Idle);
                return Err(e.into());
            }
        };

        let updates = order::updates(&swapped);
        self.dispatch(Action::Reorder(swapped));

        self.enter(Phase::Persisting);
        let outcome = match self.store.bulk_update_order(self.scope, &updates).await {
            Ok(()) => {
                self.enter(Phase::Reconciled);
                SwapOutcome::Persisted
            }
            Err(cause) => {
                warn!(scope = %self.scope, %dragged, %target, error = %cause, "Failed to persist swap, reloading");
                self.enter(Phase::ReloadOnError);
                self.dispatch(Action::Reorder(before));
                if let Err(e) = self.refresh().await {
                    warn!(scope = %self.scope, error = %e, "Reload after failed swap failed");
                    self.state.send_modify(CollectionState::mark_stale);
                }
                SwapOutcome::Reverted { cause }
            }
        };

        self.enter(Phase::Idle);
        Ok(outcome)
    }

    /// Delete an item, then close the gap it leaves.
    ///
    /// The deletion and the shift are two separate store calls. Once the
    /// deletion has gone through, the collection is always fetched again.
    pub async fn delete(&self, id: ItemId) -> DeleteOutcome {
        let _action = self.actions.lock().await;
        self.enter(Phase::Computing);

        let shifted = {
            let state = self.state.borrow();
            if state.get(id).is_some() {
                Some(order::compact_after_delete(state.items(), id).shifted)
            } else {
                None
            }
        };
        let shifted = shifted.unwrap_or_else(|| {
            // Nothing to shift relative to; the reload below picks up the stored orders
            warn!(scope = %self.scope, %id, "Deleting an item missing from the cached collection");
            Vec::new()
        });

        self.enter(Phase::Persisting);
        if let Err(cause) = self.store.delete_item(self.scope, id).await {
            warn!(scope = %self.scope, %id, error = %cause, "Failed to delete item");
            self.enter(Phase::Idle);
            return DeleteOutcome::DeleteFailed { cause };
        }

        let compact_error = if shifted.is_empty() {
            None
        } else {
            self.store
                .bulk_update_order(self.scope, &shifted)
                .await
                .err()
        };

        match &compact_error {
            Some(cause) => {
                warn!(scope = %self.scope, %id, error = %cause, "Failed to compact after delete");
                self.enter(Phase::ReloadOnError);
            }
            None => self.enter(Phase::Reconciled),
        }

        if let Err(e) = self.refresh().await {
            warn!(scope = %self.scope, error = %e, "Reload after delete failed");
            self.state.send_modify(|state| {
                state.apply(Action::Delete(id));
                state.mark_stale();
            });
        }

        self.enter(Phase::Idle);
        match compact_error {
            Some(cause) => DeleteOutcome::CompactFailed { shifted, cause },
            None => DeleteOutcome::Compacted { shifted },
        }
    }

    /// Fetch the stored collection and publish it. Callers hold `actions`.
    async fn refresh(&self) -> Result<()> {
        let items = self.store.fetch_collection(self.scope).await?;
        debug!(scope = %self.scope, count = items.len(), "Reloaded collection");
        self.dispatch(Action::Reload(items));
        Ok(())
    }

    fn dispatch(&self, action: Action) {
        self.state.send_modify(|state| state.apply(action));
    }

    fn enter(&self, phase: Phase) {
        debug!(scope = %self.scope, ?phase, "Reconciler phase");
        self.phase.send_replace(phase);
    }
}
