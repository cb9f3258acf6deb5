//! Read-only availability assessment.

use serde::Serialize;

use stockrecon_core::ItemId;

use crate::batch::AvailabilityLine;
use crate::item::Item;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum UnavailableReason {
    #[serde(rename = "Item not found")]
    NotFound,
    #[serde(rename = "Item is not active")]
    Inactive,
    #[serde(rename = "Insufficient stock")]
    InsufficientStock,
}

/// Stock comparison for an existing, active item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockCheckEntry {
    pub item_id: ItemId,
    pub item_name: String,
    pub available_quantity: i64,
    pub required_quantity: i64,
    pub is_available: bool,
    pub shortfall: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnavailableItem {
    pub item_id: ItemId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_name: Option<String>,
    pub required_quantity: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortfall: Option<i64>,
    pub reason: UnavailableReason,
}

/// Result of a read-only availability check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityReport {
    pub all_available: bool,
    pub stock_check: Vec<StockCheckEntry>,
    pub unavailable_items: Vec<UnavailableItem>,
}

impl Default for AvailabilityReport {
    fn default() -> Self {
        Self {
            all_available: true,
            stock_check: Vec::new(),
            unavailable_items: Vec::new(),
        }
    }
}

impl AvailabilityReport {
    /// Fold one line into the report. `item` is the current stored state, if any.
    pub fn record(&mut self, line: &AvailabilityLine, item: Option<&Item>) {
        let required = line.required_quantity;

        let Some(item) = item else {
            self.push_unavailable(UnavailableItem {
                item_id: line.item_id,
                item_name: None,
                required_quantity: required,
                available_quantity: None,
                shortfall: None,
                reason: UnavailableReason::NotFound,
            });
            return;
        };

        if !item.is_active() {
            self.push_unavailable(UnavailableItem {
                item_id: line.item_id,
                item_name: Some(item.name().to_string()),
                required_quantity: required,
                available_quantity: None,
                shortfall: None,
                reason: UnavailableReason::Inactive,
            });
            return;
        }

        let available = item.quantity();
        let is_available = available >= required;
        let shortfall = (required - available).max(0);

        self.stock_check.push(StockCheckEntry {
            item_id: line.item_id,
            item_name: item.name().to_string(),
            available_quantity: available,
            required_quantity: required,
            is_available,
            shortfall,
        });

        if !is_available {
            self.push_unavailable(UnavailableItem {
                item_id: line.item_id,
                item_name: Some(item.name().to_string()),
                required_quantity: required,
                available_quantity: Some(available),
                shortfall: Some(shortfall),
                reason: UnavailableReason::InsufficientStock,
            });
        }
    }

    fn push_unavailable(&mut self, entry: UnavailableItem) {
        self.unavailable_items.push(entry);
        self.all_available = false;
    }
}
