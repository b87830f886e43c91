//! Error types for ordered collections.

use thiserror::Error;

use super::types::ItemId;

/// Errors raised by the ordering functions.
///
/// `ZeroOrder`, `DuplicateOrder` and `Gap` are only produced by
/// [`validate`](super::validate); the reconciliation functions tolerate
/// transient violations and never return them.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// The referenced item is not part of the collection.
    #[error("Item {id} is not a member of the collection")]
    NotMember {
        /// The ID that was looked up
        id: ItemId,
    },

    /// An item carries order 0; positions start at 1.
    #[error("Item {id} has order 0")]
    ZeroOrder {
        /// The offending item
        id: ItemId,
    },

    /// Two items share the same position.
    #[error("Items {first} and {second} share order {order}")]
    DuplicateOrder {
        order: u32,
        first: ItemId,
        second: ItemId,
    },

    /// The sequence of positions skips a value.
    #[error("Order sequence has a gap: expected {expected}, found {found}")]
    Gap { expected: u32, found: u32 },

    /// A scope name that does not identify any collection.
    #[error("Unknown collection scope: {name}")]
    UnknownScope { name: String },
}

impl OrderError {
    /// Check if this error is a membership failure.
    pub fn is_not_member(&self) -> bool {
        matches!(self, OrderError::NotMember { .. })
    }

    /// Check if this error reports a broken gap-free invariant.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            OrderError::ZeroOrder { .. } | OrderError::DuplicateOrder { .. } | OrderError::Gap { .. }
        )
    }
}

impl From<OrderError> for crate::Error {
    fn from(err: OrderError) -> Self {
        crate::Error::Order(err)
    }
}
