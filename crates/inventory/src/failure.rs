use thiserror::Error;

/// Why a single line of a batch was rejected.
///
/// Closed set: callers branch on the variant (or on [`StockFailure::code`] over
/// the wire) rather than on message text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StockFailure {
    #[error("Item not found")]
    ItemNotFound,

    #[error("Item is not active")]
    ItemInactive,

    #[error("Insufficient stock. Available: {available}, Requested: {requested}")]
    InsufficientStock { available: i64, requested: i64 },

    #[error("Operation would result in negative stock (current: {current}, change: {change})")]
    NegativeResult { current: i64, change: i64 },

    /// Concurrent writers kept moving the quantity under us.
    #[error("Stock changed concurrently; gave up after {attempts} attempts")]
    Conflict { attempts: u32 },

    #[error("Quantity would overflow")]
    QuantityOverflow,

    /// Unexpected store failure while processing this one line.
    #[error("Store error: {0}")]
    Store(String),
}

impl StockFailure {
    /// Stable wire code.
    pub fn code(&self) -> &'static str {
        match self {
            StockFailure::ItemNotFound => "ITEM_NOT_FOUND",
            StockFailure::ItemInactive => "ITEM_INACTIVE",
            StockFailure::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            StockFailure::NegativeResult { .. } => "NEGATIVE_RESULT",
            StockFailure::Conflict { .. } => "CONFLICT",
            StockFailure::QuantityOverflow => "QUANTITY_OVERFLOW",
            StockFailure::Store(_) => "STORE_ERROR",
        }
    }

    pub fn is_store_error(&self) -> bool {
        matches!(self, StockFailure::Store(_))
    }
}
