use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use stockrecon_infra::ItemStore;

use crate::app::services::AppServices;

/// 200 while the item store answers, 503 otherwise.
pub async fn health(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    let backend = services.backend().as_str();
    match services.reconciler().store().ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok", "store": backend }))).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable", "store": backend })),
            )
                .into_response()
        }
    }
}
