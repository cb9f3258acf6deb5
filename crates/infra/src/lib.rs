//! Infrastructure layer: item stores and the stock reconciliation service.

pub mod reconciler;
pub mod store;

pub use reconciler::{ReconcileError, ReconcilerConfig, StockReconciler};
pub use store::{InMemoryItemStore, ItemStore, PostgresItemStore, StoreError};
