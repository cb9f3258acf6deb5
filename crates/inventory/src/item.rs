use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockrecon_core::{DomainError, DomainResult, ItemId};

use crate::batch::AdjustOperation;
use crate::failure::StockFailure;

/// An inventory item as seen by the reconciliation core.
///
/// Items are created and deleted by the catalog; this workspace only ever
/// changes `quantity` (and stamps `updated_at` when it does).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    id: ItemId,
    name: String,
    quantity: i64,
    min_stock_level: i64,
    is_active: bool,
    updated_at: DateTime<Utc>,
}

impl Item {
    /// Create an active item with no low-stock threshold.
    pub fn new(id: ItemId, name: impl Into<String>, quantity: i64) -> DomainResult<Self> {
        Self::restore(id, name.into(), quantity, 0, true, Utc::now())
    }

    /// Rebuild an item from stored state.
    pub fn restore(
        id: ItemId,
        name: String,
        quantity: i64,
        min_stock_level: i64,
        is_active: bool,
        updated_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if quantity < 0 {
            return Err(DomainError::invariant(format!(
                "item {id} has negative quantity {quantity}"
            )));
        }
        Ok(Self {
            id,
            name,
            quantity,
            min_stock_level,
            is_active,
            updated_at,
        })
    }

    pub fn with_min_stock_level(mut self, min_stock_level: i64) -> Self {
        self.min_stock_level = min_stock_level;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn min_stock_level(&self) -> i64 {
        self.min_stock_level
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.min_stock_level
    }

    /// Decide the quantity change a command would produce, without mutating.
    ///
    /// Reservations check `is_active`; releases and administrative adjustments
    /// do not, so cancelled orders can restock items deactivated after ordering.
    pub fn decide(&self, command: &StockCommand) -> Result<QuantityChange, StockFailure> {
        let previous = self.quantity;
        let new = match *command {
            StockCommand::Reserve(requested) => {
                if !self.is_active {
                    return Err(StockFailure::ItemInactive);
                }
                if previous < requested {
                    return Err(StockFailure::InsufficientStock {
                        available: previous,
                        requested,
                    });
                }
                previous - requested
            }
            StockCommand::Release(restored) => previous
                .checked_add(restored)
                .ok_or(StockFailure::QuantityOverflow)?,
            StockCommand::Adjust { operation, amount } => match operation {
                AdjustOperation::Set => amount,
                AdjustOperation::Add => previous
                    .checked_add(amount)
                    .ok_or(StockFailure::QuantityOverflow)?,
                AdjustOperation::Subtract => previous
                    .checked_sub(amount)
                    .ok_or(StockFailure::QuantityOverflow)?,
            },
        };

        if new < 0 {
            return Err(StockFailure::NegativeResult {
                current: previous,
                change: new - previous,
            });
        }

        Ok(QuantityChange { previous, new })
    }

    /// Overwrite the on-hand quantity. Stores call this once a write has been accepted.
    pub fn set_quantity(&mut self, quantity: i64, at: DateTime<Utc>) -> DomainResult<()> {
        if quantity < 0 {
            return Err(DomainError::invariant(format!(
                "refusing to set item {} to negative quantity {quantity}",
                self.id
            )));
        }
        self.quantity = quantity;
        self.updated_at = at;
        Ok(())
    }
}

/// A single per-item stock mutation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StockCommand {
    /// Order placement: take units out of stock.
    Reserve(i64),
    /// Order cancellation: put units back, with no upper bound.
    Release(i64),
    /// Administrative correction.
    Adjust {
        operation: AdjustOperation,
        amount: i64,
    },
}

/// Before/after quantities of an accepted decision.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct QuantityChange {
    pub previous: i64,
    pub new: i64,
}

impl QuantityChange {
    pub fn delta(&self) -> i64 {
        self.new - self.previous
    }
}
