//! Item store abstraction.
//!
//! The reconciliation core needs exactly two things from storage: a point read
//! and a conditional quantity write. Everything else (catalog management,
//! analytics) lives outside this workspace.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use stockrecon_core::ItemId;
use stockrecon_inventory::Item;

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryItemStore;
pub use postgres::PostgresItemStore;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The backend could not be reached (pool closed, IO, timeouts).
    #[error("item store unavailable: {0}")]
    Unavailable(String),

    /// The backend answered with an error.
    #[error("item store query failed: {0}")]
    Query(String),

    /// A stored row could not be turned into an [`Item`].
    #[error("corrupt item row: {0}")]
    Corrupt(String),
}

/// Keyed collection of items supporting point reads and compare-and-set writes.
#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn get(&self, id: ItemId) -> Result<Option<Item>, StoreError>;

    /// Write `new` as the item's quantity (and stamp `at`) only if the stored
    /// quantity still equals `expected` and, when `require_active` is set, the
    /// item is still active.
    ///
    /// Returns `Ok(false)` when the row is missing or either condition no longer holds.
    async fn compare_and_set_quantity(
        &self,
        id: ItemId,
        expected: i64,
        new: i64,
        at: DateTime<Utc>,
        require_active: bool,
    ) -> Result<bool, StoreError>;

    /// All items, ordered by id.
    async fn list(&self) -> Result<Vec<Item>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> ItemStore for Arc<S>
where
    S: ItemStore + ?Sized,
{
    async fn get(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        (**self).get(id).await
    }

    async fn compare_and_set_quantity(
        &self,
        id: ItemId,
        expected: i64,
        new: i64,
        at: DateTime<Utc>,
        require_active: bool,
    ) -> Result<bool, StoreError> {
        (**self)
            .compare_and_set_quantity(id, expected, new, at, require_active)
            .await
    }

    async fn list(&self) -> Result<Vec<Item>, StoreError> {
        (**self).list().await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        (**self).ping().await
    }
}
