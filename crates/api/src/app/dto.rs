use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;

use stockrecon_inventory::{
    AvailabilityReport, BatchOutcome, Item, RawAdjustLine, RawAvailabilityLine, RawStockLine,
};

// -------------------------
// Request DTOs
// -------------------------

/// Body of `place-order` and `cancel-order`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemsRequest {
    pub order_items: Option<Vec<RawStockLine>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BulkUpdateRequest {
    pub updates: Option<Vec<RawAdjustLine>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CheckAvailabilityRequest {
    pub items: Option<Vec<RawAvailabilityLine>>,
}

// -------------------------
// Response envelopes
// -------------------------

/// Envelope messages for one kind of mutating batch.
#[derive(Debug, Copy, Clone)]
pub struct BatchMessages {
    pub all_succeeded: &'static str,
    pub partial: &'static str,
    pub all_failed: &'static str,
}

pub const PLACE_ORDER: BatchMessages = BatchMessages {
    all_succeeded: "Order placed successfully",
    partial: "Order placed with some items failing",
    all_failed: "Failed to place order",
};

pub const CANCEL_ORDER: BatchMessages = BatchMessages {
    all_succeeded: "Order cancelled, stock restored",
    partial: "Order cancelled with some items failing",
    all_failed: "Failed to cancel order",
};

pub const BULK_UPDATE: BatchMessages = BatchMessages {
    all_succeeded: "Stock updated successfully",
    partial: "Stock updated with some items failing",
    all_failed: "Failed to update stock",
};

/// `{success, message, data: {successful, failed}}`; 400 when every line failed, else 200.
pub fn batch_response<T: Serialize>(
    outcome: &BatchOutcome<T>,
    messages: BatchMessages,
) -> axum::response::Response {
    let (status, success, message) = if outcome.all_failed() {
        (StatusCode::BAD_REQUEST, false, messages.all_failed)
    } else if outcome.failed.is_empty() {
        (StatusCode::OK, true, messages.all_succeeded)
    } else {
        (StatusCode::OK, true, messages.partial)
    };

    (
        status,
        Json(json!({
            "success": success,
            "message": message,
            "data": outcome,
        })),
    )
        .into_response()
}

pub fn availability_response(report: &AvailabilityReport) -> axum::response::Response {
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": report,
        })),
    )
        .into_response()
}

pub fn item_to_json(item: &Item) -> serde_json::Value {
    json!({
        "id": item.id(),
        "name": item.name(),
        "quantity": item.quantity(),
        "minStockLevel": item.min_stock_level(),
        "isActive": item.is_active(),
        "isLowStock": item.is_low_stock(),
        "updatedAt": item.updated_at().to_rfc3339(),
    })
}
