use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde_json::{json, Value};

use stockrecon_api::app::{build_app, services::{AppServices, StoreBackend}};
use stockrecon_core::ItemId;
use stockrecon_infra::{InMemoryItemStore, ItemStore, ReconcilerConfig, StoreError};
use stockrecon_inventory::Item;

struct TestServer {
    base_url: String,
    store: Arc<InMemoryItemStore>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(items: Vec<Item>) -> Self {
        let store = Arc::new(InMemoryItemStore::with_items(items));
        let services = AppServices::in_memory(store.clone(), ReconcilerConfig::default());
        let (base_url, handle) = serve(services).await;
        Self {
            base_url,
            store,
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn quantity(&self, id: i64) -> i64 {
        self.store
            .get(ItemId::new(id))
            .await
            .unwrap()
            .expect("item should exist")
            .quantity()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Build app (same router as prod), but bind to an ephemeral port.
async fn serve(services: AppServices) -> (String, tokio::task::JoinHandle<()>) {
    let app = build_app(Arc::new(services));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind ephemeral port");
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), handle)
}

fn item(id: i64, name: &str, quantity: i64) -> Item {
    Item::new(ItemId::new(id), name, quantity).unwrap()
}

async fn post(client: &reqwest::Client, url: String, body: Value) -> (StatusCode, Value) {
    let res = client.post(url).json(&body).send().await.unwrap();
    let status = res.status();
    (status, res.json().await.unwrap())
}

#[tokio::test]
async fn reserve_then_oversized_reserve() {
    let srv = TestServer::spawn(vec![item(1, "Widget", 10)]).await;
    let client = reqwest::Client::new();

    let (status, body) = post(
        &client,
        srv.url("/orders/place-order"),
        json!({ "orderItems": [{ "itemId": 1, "quantity": 4 }] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let ok = &body["data"]["successful"][0];
    assert_eq!(ok["itemId"], 1);
    assert_eq!(ok["previousQuantity"], 10);
    assert_eq!(ok["orderedQuantity"], 4);
    assert_eq!(ok["newQuantity"], 6);
    assert_eq!(srv.quantity(1).await, 6);

    let (status, body) = post(
        &client,
        srv.url("/orders/place-order"),
        json!({ "orderItems": [{ "itemId": 1, "quantity": 100 }] }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    let failed = &body["data"]["failed"][0];
    assert_eq!(failed["code"], "INSUFFICIENT_STOCK");
    assert_eq!(failed["availableQuantity"], 6);
    assert_eq!(failed["requestedQuantity"], 100);
    assert_eq!(failed["error"], "Insufficient stock. Available: 6, Requested: 100");
    assert_eq!(srv.quantity(1).await, 6);
}

#[tokio::test]
async fn subtract_below_zero_is_rejected_without_writing() {
    let srv = TestServer::spawn(vec![item(2, "Gizmo", 5)]).await;
    let client = reqwest::Client::new();

    let (status, body) = post(
        &client,
        srv.url("/orders/bulk-update"),
        json!({ "updates": [{ "itemId": 2, "quantity": 3, "operation": "subtract" }] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["successful"][0]["newQuantity"], 2);
    assert_eq!(body["data"]["successful"][0]["changeAmount"], -3);

    let (status, body) = post(
        &client,
        srv.url("/orders/bulk-update"),
        json!({ "updates": [{ "itemId": 2, "quantity": 10, "operation": "subtract" }] }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["data"]["failed"][0]["code"], "NEGATIVE_RESULT");
    assert_eq!(srv.quantity(2).await, 2);
}

#[tokio::test]
async fn availability_reports_missing_items() {
    let srv = TestServer::spawn(vec![item(1, "Widget", 6)]).await;
    let client = reqwest::Client::new();
    let request = json!({
        "items": [
            { "itemId": 1, "requiredQuantity": 3 },
            { "itemId": 999, "requiredQuantity": 1 }
        ]
    });

    let (status, body) = post(&client, srv.url("/orders/check-availability"), request.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let data = &body["data"];
    assert_eq!(data["allAvailable"], false);
    assert_eq!(data["stockCheck"].as_array().unwrap().len(), 1);
    assert_eq!(data["stockCheck"][0]["itemId"], 1);
    assert_eq!(data["stockCheck"][0]["isAvailable"], true);
    assert_eq!(data["unavailableItems"].as_array().unwrap().len(), 1);
    assert_eq!(data["unavailableItems"][0]["itemId"], 999);
    assert_eq!(data["unavailableItems"][0]["reason"], "Item not found");

    // Read-only: a second call sees the same stock.
    let (_, again) = post(&client, srv.url("/orders/check-availability"), request).await;
    assert_eq!(again, body);
    assert_eq!(srv.quantity(1).await, 6);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_orders_for_the_last_units_admit_exactly_one() {
    let srv = TestServer::spawn(vec![item(1, "Widget", 6)]).await;
    let client = reqwest::Client::new();
    let body = json!({ "orderItems": [{ "itemId": 1, "quantity": 6 }] });

    let (a, b) = tokio::join!(
        post(&client, srv.url("/orders/place-order"), body.clone()),
        post(&client, srv.url("/orders/place-order"), body.clone()),
    );

    let statuses = [a.0, b.0];
    let successes = statuses.iter().filter(|s| **s == StatusCode::OK).count();
    assert_eq!(successes, 1, "statuses: {statuses:?}");

    let loser = if a.0 == StatusCode::OK { &b.1 } else { &a.1 };
    assert_eq!(loser["data"]["failed"][0]["code"], "INSUFFICIENT_STOCK");
    assert_eq!(srv.quantity(1).await, 0);
}

#[tokio::test]
async fn partial_success_is_ok_and_keeps_committed_lines() {
    let srv = TestServer::spawn(vec![item(1, "Widget", 10), item(2, "Gizmo", 1)]).await;
    let client = reqwest::Client::new();

    let (status, body) = post(
        &client,
        srv.url("/orders/place-order"),
        json!({ "orderItems": [
            { "itemId": 1, "quantity": 2 },
            { "itemId": 2, "quantity": 5 },
            { "itemId": 404, "quantity": 1 }
        ] }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["successful"].as_array().unwrap().len(), 1);
    let failed = body["data"]["failed"].as_array().unwrap();
    assert_eq!(failed.len(), 2);
    assert_eq!(failed[0]["code"], "INSUFFICIENT_STOCK");
    assert_eq!(failed[1]["code"], "ITEM_NOT_FOUND");
    assert_eq!(srv.quantity(1).await, 8);
    assert_eq!(srv.quantity(2).await, 1);
}

#[tokio::test]
async fn cancel_order_restocks_inactive_items() {
    let srv = TestServer::spawn(vec![item(4, "Legacy Gadget", 0).inactive()]).await;
    let client = reqwest::Client::new();

    let (status, _) = post(
        &client,
        srv.url("/orders/place-order"),
        json!({ "orderItems": [{ "itemId": 4, "quantity": 1 }] }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = post(
        &client,
        srv.url("/orders/cancel-order"),
        json!({ "orderItems": [{ "itemId": 4, "quantity": 3 }] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["successful"][0]["restoredQuantity"], 3);
    assert_eq!(srv.quantity(4).await, 3);
}

#[tokio::test]
async fn malformed_batches_are_validation_errors() {
    let srv = TestServer::spawn(vec![item(1, "Widget", 10)]).await;
    let client = reqwest::Client::new();

    let cases = [
        ("/orders/place-order", json!({})),
        ("/orders/place-order", json!({ "orderItems": [] })),
        ("/orders/place-order", json!({ "orderItems": [{ "itemId": 1 }] })),
        ("/orders/place-order", json!({ "orderItems": [{ "itemId": 1, "quantity": 0 }] })),
        ("/orders/cancel-order", json!({ "orderItems": "nope" })),
        ("/orders/bulk-update", json!({ "updates": [{ "itemId": 1, "quantity": 1, "operation": "multiply" }] })),
        ("/orders/bulk-update", json!({ "updates": [{ "itemId": 1, "quantity": -1, "operation": "set" }] })),
        ("/orders/check-availability", json!({ "items": [] })),
    ];

    for (path, body) in cases {
        let (status, resp) = post(&client, srv.url(path), body.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{path} {body}");
        assert_eq!(resp["success"], false);
        assert_eq!(resp["error"], "VALIDATION_ERROR");
    }

    let res = client
        .post(srv.url("/orders/place-order"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Nothing was written by any rejected batch.
    assert_eq!(srv.quantity(1).await, 10);
}

#[tokio::test]
async fn availability_skips_only_entries_without_a_required_quantity() {
    let srv = TestServer::spawn(vec![item(1, "Widget", 6)]).await;
    let client = reqwest::Client::new();

    let (status, body) = post(
        &client,
        srv.url("/orders/check-availability"),
        json!({ "items": [{ "itemId": 1, "requiredQuantity": 0 }, { "itemId": 2 }] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["allAvailable"], true);
    assert!(body["data"]["stockCheck"].as_array().unwrap().is_empty());

    let (status, body) = post(
        &client,
        srv.url("/orders/check-availability"),
        json!({ "items": [{ "itemId": 1, "requiredQuantity": 3 }, { "itemId": 0, "requiredQuantity": 1 }] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["allAvailable"], false);
    assert_eq!(body["data"]["unavailableItems"][0]["itemId"], 0);
    assert_eq!(body["data"]["unavailableItems"][0]["reason"], "Item not found");

    let (status, body) = post(
        &client,
        srv.url("/orders/check-availability"),
        json!({ "items": [{ "itemId": 1, "requiredQuantity": 3 }, { "requiredQuantity": 1 }] }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn bulk_update_lines_are_independent() {
    let srv = TestServer::spawn(vec![item(1, "Widget", 10), item(2, "Gizmo", 3)]).await;
    let client = reqwest::Client::new();

    let (status, body) = post(
        &client,
        srv.url("/orders/bulk-update"),
        json!({ "updates": [
            { "itemId": 1, "quantity": 4, "operation": "subtract" },
            { "itemId": 2, "quantity": 7, "operation": "subtract" },
            { "itemId": 404, "quantity": 1, "operation": "add" }
        ] }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["successful"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["successful"][0]["newQuantity"], 6);
    let failed = body["data"]["failed"].as_array().unwrap();
    assert_eq!(failed[0]["code"], "NEGATIVE_RESULT");
    assert_eq!(failed[1]["code"], "ITEM_NOT_FOUND");
    assert_eq!(failed[1]["itemId"], 404);
    assert_eq!(srv.quantity(1).await, 6);
    assert_eq!(srv.quantity(2).await, 3);
}

#[tokio::test]
async fn item_lookup_and_low_stock_listing() {
    let srv = TestServer::spawn(vec![
        item(1, "Widget", 25).with_min_stock_level(5),
        item(3, "Sprocket", 2).with_min_stock_level(5),
    ])
    .await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/inventory/items/3")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["data"]["name"], "Sprocket");
    assert_eq!(body["data"]["isLowStock"], true);

    let res = client.get(srv.url("/inventory/items/77")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client.get(srv.url("/inventory/items/abc")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client.get(srv.url("/inventory/low-stock")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["id"], 3);
}

#[tokio::test]
async fn health_reports_store_and_request_id() {
    let srv = TestServer::spawn(vec![]).await;
    let res = reqwest::get(srv.url("/health")).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"], "in-memory");
}

/// A store whose backend is gone.
struct DownStore;

#[async_trait]
impl ItemStore for DownStore {
    async fn get(&self, _id: ItemId) -> Result<Option<Item>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn compare_and_set_quantity(
        &self,
        _id: ItemId,
        _expected: i64,
        _new: i64,
        _at: DateTime<Utc>,
        _require_active: bool,
    ) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn list(&self) -> Result<Vec<Item>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
}

#[tokio::test]
async fn store_outage_is_a_server_error() {
    let services = AppServices::new(Arc::new(DownStore), ReconcilerConfig::default(), StoreBackend::Postgres);
    let (base_url, handle) = serve(services).await;
    let client = reqwest::Client::new();

    let (status, body) = post(
        &client,
        format!("{base_url}/orders/place-order"),
        json!({ "orderItems": [{ "itemId": 1, "quantity": 1 }] }),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "STORE_UNAVAILABLE");

    let (status, _) = post(
        &client,
        format!("{base_url}/orders/check-availability"),
        json!({ "items": [{ "itemId": 1, "requiredQuantity": 1 }] }),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let res = client.get(format!("{base_url}/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);

    handle.abort();
}
