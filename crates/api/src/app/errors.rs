use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use stockrecon_infra::ReconcileError;

pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
pub const STORE_UNAVAILABLE: &str = "STORE_UNAVAILABLE";

pub fn reconcile_error_to_response(err: ReconcileError) -> axum::response::Response {
    match err {
        ReconcileError::Validation(e) => {
            json_error(StatusCode::BAD_REQUEST, VALIDATION_ERROR, e.message())
        }
        ReconcileError::StoreUnavailable(msg) => {
            tracing::error!(error = %msg, "item store unavailable");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                STORE_UNAVAILABLE,
                "Item store is unavailable",
            )
        }
    }
}

/// Unparseable or mistyped bodies are validation errors, not framework 4xx defaults.
pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, VALIDATION_ERROR, rejection.body_text())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "success": false,
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
