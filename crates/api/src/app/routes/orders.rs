use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    routing::post,
    Json, Router,
};

use stockrecon_inventory::{parse_adjust_lines, parse_availability_lines, parse_stock_lines};

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/place-order", post(place_order))
        .route("/cancel-order", post(cancel_order))
        .route("/bulk-update", post(bulk_update))
        .route("/check-availability", post(check_availability))
}

pub async fn place_order(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::OrderItemsRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    let batch = match parse_stock_lines("orderItems", body.order_items) {
        Ok(b) => b,
        Err(e) => return errors::reconcile_error_to_response(e.into()),
    };

    match services.reconciler().reserve(batch).await {
        Ok(outcome) => dto::batch_response(&outcome, dto::PLACE_ORDER),
        Err(e) => errors::reconcile_error_to_response(e),
    }
}

pub async fn cancel_order(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::OrderItemsRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    let batch = match parse_stock_lines("orderItems", body.order_items) {
        Ok(b) => b,
        Err(e) => return errors::reconcile_error_to_response(e.into()),
    };

    match services.reconciler().release(batch).await {
        Ok(outcome) => dto::batch_response(&outcome, dto::CANCEL_ORDER),
        Err(e) => errors::reconcile_error_to_response(e),
    }
}

pub async fn bulk_update(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::BulkUpdateRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    let batch = match parse_adjust_lines("updates", body.updates) {
        Ok(b) => b,
        Err(e) => return errors::reconcile_error_to_response(e.into()),
    };

    match services.reconciler().adjust(batch).await {
        Ok(outcome) => dto::batch_response(&outcome, dto::BULK_UPDATE),
        Err(e) => errors::reconcile_error_to_response(e),
    }
}

pub async fn check_availability(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CheckAvailabilityRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    let batch = match parse_availability_lines("items", body.items) {
        Ok(b) => b,
        Err(e) => return errors::reconcile_error_to_response(e.into()),
    };

    match services.reconciler().check_availability(batch).await {
        Ok(report) => dto::availability_response(&report),
        Err(e) => errors::reconcile_error_to_response(e),
    }
}
