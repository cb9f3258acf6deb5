use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;

use stockrecon_core::ItemId;

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/low-stock", get(low_stock))
        .route("/items/:id", get(get_item))
}

pub async fn get_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ItemId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                errors::VALIDATION_ERROR,
                "item id must be a positive integer",
            )
        }
    };

    match services.reconciler().item(id).await {
        Ok(Some(item)) => (
            StatusCode::OK,
            Json(json!({ "success": true, "data": dto::item_to_json(&item) })),
        )
            .into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "Item not found"),
        Err(e) => errors::reconcile_error_to_response(e),
    }
}

pub async fn low_stock(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.reconciler().low_stock().await {
        Ok(items) => {
            let data: Vec<serde_json::Value> = items.iter().map(dto::item_to_json).collect();
            (
                StatusCode::OK,
                Json(json!({
                    "success": true,
                    "count": data.len(),
                    "data": data,
                })),
            )
                .into_response()
        }
        Err(e) => errors::reconcile_error_to_response(e),
    }
}
