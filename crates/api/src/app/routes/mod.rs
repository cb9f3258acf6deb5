use axum::Router;

pub mod inventory;
pub mod orders;
pub mod system;

/// Router for the stock endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/orders", orders::router())
        .nest("/inventory", inventory::router())
}
