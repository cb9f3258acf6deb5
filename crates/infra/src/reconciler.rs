//! Stock reconciliation service.
//!
//! Applies quantity changes to items for order placement (`reserve`), order
//! cancellation (`release`) and administrative corrections (`adjust`), and
//! answers read-only availability checks.
//!
//! ## Per-item execution
//!
//! ```text
//! line
//!   ↓
//! 1. Read the item (point read)
//!   ↓
//! 2. Decide the new quantity (pure, `Item::decide`)
//!   ↓
//! 3. Conditional write: only if the stored quantity is still the one read in 1
//!   ↓
//! 4. On a miss, go back to 1 (bounded by `max_cas_attempts`), else `CONFLICT`
//! ```
//!
//! Lines of one batch are processed in request order and independently: a
//! rejected line never blocks or undoes its siblings, and nothing is rolled
//! back if the caller goes away mid-batch.

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, error, instrument, warn};

use stockrecon_core::{DomainError, ItemId};
use stockrecon_inventory::{
    AdjustLine, AdjustedItem, AvailabilityLine, AvailabilityReport, Batch, BatchOutcome, Item,
    QuantityChange, ReleasedItem, ReservedItem, StockCommand, StockFailure, StockLine,
};

use crate::store::{ItemStore, StoreError};

/// Batch-level failure: the call as a whole could not be processed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    /// The batch was malformed; no line was processed.
    #[error("{}", .0.message())]
    Validation(DomainError),

    /// The store could not resolve any line.
    #[error("item store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<DomainError> for ReconcileError {
    fn from(value: DomainError) -> Self {
        ReconcileError::Validation(value)
    }
}

impl From<StoreError> for ReconcileError {
    fn from(value: StoreError) -> Self {
        ReconcileError::StoreUnavailable(value.to_string())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ReconcilerConfig {
    /// Read/decide/write rounds per line before giving up with `CONFLICT`.
    pub max_cas_attempts: u32,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self { max_cas_attempts: 5 }
    }
}

#[derive(Debug)]
pub struct StockReconciler<S> {
    store: S,
    config: ReconcilerConfig,
}

impl<S> StockReconciler<S> {
    pub fn new(store: S, config: ReconcilerConfig) -> Self {
        Self {
            store,
            config: ReconcilerConfig {
                max_cas_attempts: config.max_cas_attempts.max(1),
            },
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S> StockReconciler<S>
where
    S: ItemStore,
{
    /// Order placement: take stock for every line that can be fully served.
    #[instrument(skip(self, batch), fields(lines = batch.len()), err)]
    pub async fn reserve(
        &self,
        batch: Batch<StockLine>,
    ) -> Result<BatchOutcome<ReservedItem>, ReconcileError> {
        self.store.ping().await?;

        let mut outcome = BatchOutcome::with_capacity(batch.len());
        for line in batch {
            match self.apply(line.item_id, StockCommand::Reserve(line.quantity)).await {
                Ok((item, change)) => outcome.push_ok(ReservedItem::new(&item, line.quantity, change)),
                Err(failure) => Self::record_failure(&mut outcome, line.item_id, failure),
            }
        }
        Self::finish(outcome)
    }

    /// Order cancellation: put stock back, active or not, with no upper bound.
    #[instrument(skip(self, batch), fields(lines = batch.len()), err)]
    pub async fn release(
        &self,
        batch: Batch<StockLine>,
    ) -> Result<BatchOutcome<ReleasedItem>, ReconcileError> {
        self.store.ping().await?;

        let mut outcome = BatchOutcome::with_capacity(batch.len());
        for line in batch {
            match self.apply(line.item_id, StockCommand::Release(line.quantity)).await {
                Ok((item, change)) => outcome.push_ok(ReleasedItem::new(&item, line.quantity, change)),
                Err(failure) => Self::record_failure(&mut outcome, line.item_id, failure),
            }
        }
        Self::finish(outcome)
    }

    /// Administrative `set` / `add` / `subtract`.
    #[instrument(skip(self, batch), fields(lines = batch.len()), err)]
    pub async fn adjust(
        &self,
        batch: Batch<AdjustLine>,
    ) -> Result<BatchOutcome<AdjustedItem>, ReconcileError> {
        self.store.ping().await?;

        let mut outcome = BatchOutcome::with_capacity(batch.len());
        for line in batch {
            let command = StockCommand::Adjust {
                operation: line.operation,
                amount: line.quantity,
            };
            match self.apply(line.item_id, command).await {
                Ok((item, change)) => outcome.push_ok(AdjustedItem::new(&item, line.operation, change)),
                Err(failure) => Self::record_failure(&mut outcome, line.item_id, failure),
            }
        }
        Self::finish(outcome)
    }

    /// Read-only availability check. Never writes.
    ///
    /// There is no per-line failure list here, so a store error on any read
    /// fails the whole call.
    #[instrument(skip(self, batch), fields(lines = batch.len()), err)]
    pub async fn check_availability(
        &self,
        batch: Batch<AvailabilityLine>,
    ) -> Result<AvailabilityReport, ReconcileError> {
        let mut report = AvailabilityReport::default();
        for line in batch.lines() {
            let item = self.store.get(line.item_id).await?;
            report.record(line, item.as_ref());
        }
        Ok(report)
    }

    /// Items at or below their low-stock threshold.
    pub async fn low_stock(&self) -> Result<Vec<Item>, ReconcileError> {
        let items = self.store.list().await?;
        Ok(items.into_iter().filter(Item::is_low_stock).collect())
    }

    pub async fn item(&self, id: ItemId) -> Result<Option<Item>, ReconcileError> {
        Ok(self.store.get(id).await?)
    }

    /// Compare-and-set loop for one line.
    ///
    /// Returns the item as read on the successful round together with the
    /// accepted change.
    async fn apply(
        &self,
        item_id: ItemId,
        command: StockCommand,
    ) -> Result<(Item, QuantityChange), StockFailure> {
        let attempts = self.config.max_cas_attempts;
        let require_active = matches!(command, StockCommand::Reserve(_));
        for attempt in 1..=attempts {
            let item = self
                .store
                .get(item_id)
                .await
                .map_err(|e| StockFailure::Store(e.to_string()))?
                .ok_or(StockFailure::ItemNotFound)?;

            let change = item.decide(&command)?;

            let written = self
                .store
                .compare_and_set_quantity(
                    item_id,
                    change.previous,
                    change.new,
                    Utc::now(),
                    require_active,
                )
                .await
                .map_err(|e| StockFailure::Store(e.to_string()))?;

            if written {
                debug!(%item_id, previous = change.previous, new = change.new, "stock updated");
                return Ok((item, change));
            }

            debug!(%item_id, attempt, "stale quantity, retrying");
        }

        warn!(%item_id, attempts, "giving up after repeated concurrent modification");
        Err(StockFailure::Conflict { attempts })
    }

    fn record_failure<T>(outcome: &mut BatchOutcome<T>, item_id: ItemId, failure: StockFailure) {
        if failure.is_store_error() {
            error!(%item_id, error = %failure, "store error while processing line");
        } else {
            debug!(%item_id, code = failure.code(), "line rejected");
        }
        outcome.push_failed(item_id, failure);
    }

    fn finish<T>(outcome: BatchOutcome<T>) -> Result<BatchOutcome<T>, ReconcileError> {
        if outcome.all_store_errors() {
            let reason = outcome
                .failed
                .first()
                .map(|f| f.error.clone())
                .unwrap_or_default();
            return Err(ReconcileError::StoreUnavailable(reason));
        }
        Ok(outcome)
    }
}
