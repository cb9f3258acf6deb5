//! Per-line results of mutating batches.

use serde::Serialize;

use stockrecon_core::ItemId;

use crate::batch::AdjustOperation;
use crate::failure::StockFailure;
use crate::item::{Item, QuantityChange};

/// Committed reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservedItem {
    pub item_id: ItemId,
    pub item_name: String,
    pub previous_quantity: i64,
    pub ordered_quantity: i64,
    pub new_quantity: i64,
    pub is_low_stock: bool,
}

impl ReservedItem {
    pub fn new(item: &Item, ordered_quantity: i64, change: QuantityChange) -> Self {
        Self {
            item_id: item.id(),
            item_name: item.name().to_string(),
            previous_quantity: change.previous,
            ordered_quantity,
            new_quantity: change.new,
            is_low_stock: change.new <= item.min_stock_level(),
        }
    }
}

/// Committed release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleasedItem {
    pub item_id: ItemId,
    pub item_name: String,
    pub previous_quantity: i64,
    pub restored_quantity: i64,
    pub new_quantity: i64,
    pub is_low_stock: bool,
}

impl ReleasedItem {
    pub fn new(item: &Item, restored_quantity: i64, change: QuantityChange) -> Self {
        Self {
            item_id: item.id(),
            item_name: item.name().to_string(),
            previous_quantity: change.previous,
            restored_quantity,
            new_quantity: change.new,
            is_low_stock: change.new <= item.min_stock_level(),
        }
    }
}

/// Committed administrative adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustedItem {
    pub item_id: ItemId,
    pub item_name: String,
    pub operation: AdjustOperation,
    pub previous_quantity: i64,
    /// Signed difference actually applied (`new - previous`).
    pub change_amount: i64,
    pub new_quantity: i64,
    pub is_low_stock: bool,
}

impl AdjustedItem {
    pub fn new(item: &Item, operation: AdjustOperation, change: QuantityChange) -> Self {
        Self {
            item_id: item.id(),
            item_name: item.name().to_string(),
            operation,
            previous_quantity: change.previous,
            change_amount: change.delta(),
            new_quantity: change.new,
            is_low_stock: change.new <= item.min_stock_level(),
        }
    }
}

/// Rejected line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedItem {
    pub item_id: ItemId,
    pub code: &'static str,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_quantity: Option<i64>,
    #[serde(skip)]
    pub failure: StockFailure,
}

impl FailedItem {
    pub fn new(item_id: ItemId, failure: StockFailure) -> Self {
        let (available_quantity, requested_quantity) = match failure {
            StockFailure::InsufficientStock {
                available,
                requested,
            } => (Some(available), Some(requested)),
            _ => (None, None),
        };
        Self {
            item_id,
            code: failure.code(),
            error: failure.to_string(),
            available_quantity,
            requested_quantity,
            failure,
        }
    }
}

/// Dual-list result of a mutating batch, in request order within each list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchOutcome<T> {
    pub successful: Vec<T>,
    pub failed: Vec<FailedItem>,
}

impl<T> BatchOutcome<T> {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            successful: Vec::with_capacity(n),
            failed: Vec::new(),
        }
    }

    pub fn push_ok(&mut self, value: T) {
        self.successful.push(value);
    }

    pub fn push_failed(&mut self, item_id: ItemId, failure: StockFailure) {
        self.failed.push(FailedItem::new(item_id, failure));
    }

    /// Nothing committed and at least one line was rejected.
    pub fn all_failed(&self) -> bool {
        self.successful.is_empty() && !self.failed.is_empty()
    }

    /// Every line hit a store error, i.e. no line could be resolved at all.
    pub fn all_store_errors(&self) -> bool {
        self.all_failed() && self.failed.iter().all(|f| f.failure.is_store_error())
    }
}
