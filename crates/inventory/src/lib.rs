//! Inventory stock rules.
//!
//! This crate contains the business rules for mutating item stock, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage). The
//! reconciliation service in `stockrecon-infra` reads items, asks [`Item::decide`]
//! what the new quantity should be, and writes it back conditionally.

pub mod availability;
pub mod batch;
pub mod failure;
pub mod item;
pub mod outcome;

pub use availability::{AvailabilityReport, StockCheckEntry, UnavailableItem, UnavailableReason};
pub use batch::{
    AdjustLine, AdjustOperation, AvailabilityLine, Batch, RawAdjustLine, RawAvailabilityLine,
    RawStockLine, StockLine, parse_adjust_lines, parse_availability_lines, parse_stock_lines,
};
pub use failure::StockFailure;
pub use item::{Item, QuantityChange, StockCommand};
pub use outcome::{AdjustedItem, BatchOutcome, FailedItem, ReleasedItem, ReservedItem};
