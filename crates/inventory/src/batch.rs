//! Batch request shapes and batch-level validation.
//!
//! `Raw*` types mirror what arrives on the wire (every field optional); the
//! `parse_*` constructors turn them into validated [`Batch`]es or reject the
//! whole batch with [`DomainError::Validation`].

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use stockrecon_core::{DomainError, DomainResult, ItemId};

/// Administrative adjustment kind.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustOperation {
    /// The supplied quantity becomes the absolute stock level.
    Set,
    Add,
    Subtract,
}

impl AdjustOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustOperation::Set => "set",
            AdjustOperation::Add => "add",
            AdjustOperation::Subtract => "subtract",
        }
    }
}

impl fmt::Display for AdjustOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdjustOperation {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "set" => Ok(AdjustOperation::Set),
            "add" => Ok(AdjustOperation::Add),
            "subtract" => Ok(AdjustOperation::Subtract),
            other => Err(DomainError::validation(format!(
                "operation must be one of: set, add, subtract (got '{other}')"
            ))),
        }
    }
}

/// `{itemId, quantity}` as received for placement and cancellation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStockLine {
    pub item_id: Option<i64>,
    pub quantity: Option<i64>,
}

/// `{itemId, quantity, operation}` as received for bulk adjustment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAdjustLine {
    pub item_id: Option<i64>,
    pub quantity: Option<i64>,
    pub operation: Option<String>,
}

/// `{itemId, requiredQuantity}` as received for availability checks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAvailabilityLine {
    pub item_id: Option<i64>,
    pub required_quantity: Option<i64>,
}

/// Validated reservation/release line: positive item id, positive quantity.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StockLine {
    pub item_id: ItemId,
    pub quantity: i64,
}

impl StockLine {
    pub fn new(item_id: i64, quantity: i64) -> DomainResult<Self> {
        let item_id = ItemId::checked(item_id).map_err(|e| DomainError::validation(e.message()))?;
        if quantity <= 0 {
            return Err(DomainError::validation(format!(
                "quantity must be a positive integer (item {item_id}, got {quantity})"
            )));
        }
        Ok(Self { item_id, quantity })
    }
}

/// Validated adjustment line.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AdjustLine {
    pub item_id: ItemId,
    pub quantity: i64,
    pub operation: AdjustOperation,
}

impl AdjustLine {
    pub fn new(item_id: i64, quantity: i64, operation: AdjustOperation) -> DomainResult<Self> {
        let item_id = ItemId::checked(item_id).map_err(|e| DomainError::validation(e.message()))?;
        if operation == AdjustOperation::Set && quantity < 0 {
            return Err(DomainError::validation(format!(
                "set quantity cannot be negative (item {item_id}, got {quantity})"
            )));
        }
        Ok(Self {
            item_id,
            quantity,
            operation,
        })
    }
}

/// Validated availability line.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AvailabilityLine {
    pub item_id: ItemId,
    pub required_quantity: i64,
}

/// An ordered list of independent per-item lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch<L> {
    lines: Vec<L>,
}

impl<L> Batch<L> {
    /// Build a batch from already-validated lines. Empty batches are rejected.
    pub fn new(lines: Vec<L>) -> DomainResult<Self> {
        if lines.is_empty() {
            return Err(DomainError::validation("batch must contain at least one item"));
        }
        Ok(Self { lines })
    }

    pub fn lines(&self) -> &[L] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl<L> IntoIterator for Batch<L> {
    type Item = L;
    type IntoIter = std::vec::IntoIter<L>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.into_iter()
    }
}

fn require_lines<T>(field: &str, raw: Option<Vec<T>>) -> DomainResult<Vec<T>> {
    match raw {
        Some(lines) if !lines.is_empty() => Ok(lines),
        Some(_) => Err(DomainError::validation(format!("{field} cannot be empty"))),
        None => Err(DomainError::validation(format!("{field} is required and must be an array"))),
    }
}

fn at_index(field: &str, idx: usize, err: DomainError) -> DomainError {
    DomainError::validation(format!("{field}[{idx}]: {}", err.message()))
}

/// Validate a placement or cancellation batch (`orderItems`).
pub fn parse_stock_lines(field: &str, raw: Option<Vec<RawStockLine>>) -> DomainResult<Batch<StockLine>> {
    let raw = require_lines(field, raw)?;
    let mut lines = Vec::with_capacity(raw.len());
    for (idx, line) in raw.into_iter().enumerate() {
        let (Some(item_id), Some(quantity)) = (line.item_id, line.quantity) else {
            return Err(DomainError::validation(format!(
                "{field}[{idx}]: itemId and quantity are required"
            )));
        };
        lines.push(StockLine::new(item_id, quantity).map_err(|e| at_index(field, idx, e))?);
    }
    Batch::new(lines)
}

/// Validate a bulk adjustment batch (`updates`).
pub fn parse_adjust_lines(field: &str, raw: Option<Vec<RawAdjustLine>>) -> DomainResult<Batch<AdjustLine>> {
    let raw = require_lines(field, raw)?;
    let mut lines = Vec::with_capacity(raw.len());
    for (idx, line) in raw.into_iter().enumerate() {
        let (Some(item_id), Some(quantity), Some(operation)) =
            (line.item_id, line.quantity, line.operation)
        else {
            return Err(DomainError::validation(format!(
                "{field}[{idx}]: itemId, quantity and operation are required"
            )));
        };
        let operation: AdjustOperation = operation.parse().map_err(|e| at_index(field, idx, e))?;
        lines.push(AdjustLine::new(item_id, quantity, operation).map_err(|e| at_index(field, idx, e))?);
    }
    Batch::new(lines)
}

/// Validate an availability batch (`items`).
///
/// The list itself must be present and non-empty. Entries without a positive
/// `requiredQuantity` are dropped silently, so the resulting batch may be
/// empty. Every remaining entry is checked: a non-positive id is kept as is
/// and resolves to `Item not found`, a missing id rejects the batch.
pub fn parse_availability_lines(
    field: &str,
    raw: Option<Vec<RawAvailabilityLine>>,
) -> DomainResult<Batch<AvailabilityLine>> {
    let raw = require_lines(field, raw)?;
    let mut lines = Vec::with_capacity(raw.len());
    for (idx, line) in raw.into_iter().enumerate() {
        let Some(required_quantity) = line.required_quantity.filter(|q| *q > 0) else {
            continue;
        };
        let Some(item_id) = line.item_id else {
            return Err(DomainError::validation(format!(
                "{field}[{idx}]: itemId is required"
            )));
        };
        lines.push(AvailabilityLine {
            item_id: ItemId::new(item_id),
            required_quantity,
        });
    }
    Ok(Batch { lines })
}
