//! Integration tests for the coordinator API.

use std::sync::OnceLock;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use metrics_exporter_prometheus::PrometheusHandle;
use saga::{InMemoryParticipantClient, InMemoryTransactionStore, StepName};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> (axum::Router, InMemoryParticipantClient) {
    let client = InMemoryParticipantClient::new();
    let state = api::create_state(InMemoryTransactionStore::new(), client.clone());
    (api::create_app(state, get_metrics_handle()), client)
}

fn saga_body() -> serde_json::Value {
    serde_json::json!({
        "customer_id": "CUST-1",
        "items": [{"id": "SKU-001", "name": "Widget", "price": 10.0, "quantity": 2}],
        "amount": 20.0,
        "address": "1 Main St"
    })
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

fn start_request(body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/create-order-saga")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

fn status_request(id: &str) -> Request<Body> {
    Request::builder()
        .uri(format!("/transaction-status?transaction_id={id}"))
        .body(Body::empty())
        .unwrap()
}

async fn wait_for_terminal(app: &axum::Router, id: &str) -> serde_json::Value {
    for _ in 0..200 {
        let (status, json) = send(app, status_request(id)).await;
        assert_eq!(status, StatusCode::OK);
        if json["transaction"]["status"] != "PENDING" {
            return json["transaction"].clone();
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("transaction {id} did not reach a terminal state");
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = setup();

    let (status, json) = send(
        &app,
        Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!({"status": "ok"}));
}

#[tokio::test]
async fn test_start_saga_returns_pending_transaction() {
    let (app, _) = setup();

    let (status, json) = send(&app, start_request(&saga_body())).await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Transaction initiated successfully");
    assert_eq!(json["transaction"]["id"], "TRX-1");
    assert_eq!(json["transaction"]["status"], "PENDING");
    assert_eq!(json["transaction"]["customer_id"], "CUST-1");
    assert_eq!(json["transaction"]["amount"], 20.0);
}

#[tokio::test]
async fn test_saga_completes() {
    let (app, _) = setup();

    let (_, json) = send(&app, start_request(&saga_body())).await;
    let id = json["transaction"]["id"].as_str().unwrap().to_string();

    let tx = wait_for_terminal(&app, &id).await;
    assert_eq!(tx["status"], "COMPLETED");
    assert!(tx.get("failure_reason").is_none());
    assert!(tx["completed_at"].is_string());
    assert_eq!(tx["order_id"], "ORD-1");

    let steps: Vec<(&str, &str)> = tx["steps"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| (s["name"].as_str().unwrap(), s["status"].as_str().unwrap()))
        .collect();
    assert_eq!(
        steps,
        vec![
            ("CREATE_ORDER", "COMPLETED"),
            ("PROCESS_PAYMENT", "COMPLETED"),
            ("START_SHIPPING", "COMPLETED"),
        ]
    );
}

#[tokio::test]
async fn test_saga_failure_is_reported() {
    let (app, client) = setup();
    client.set_fail_on(StepName::StartShipping, true);

    let (_, json) = send(&app, start_request(&saga_body())).await;
    let id = json["transaction"]["id"].as_str().unwrap().to_string();

    let tx = wait_for_terminal(&app, &id).await;
    assert_eq!(tx["status"], "FAILED");
    assert!(
        tx["failure_reason"]
            .as_str()
            .unwrap()
            .starts_with("Failed to start shipping")
    );

    let names: Vec<&str> = tx["steps"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec![
            "CREATE_ORDER",
            "PROCESS_PAYMENT",
            "START_SHIPPING",
            "REFUND_PAYMENT",
            "CANCEL_ORDER",
        ]
    );
}

#[tokio::test]
async fn test_start_saga_validation() {
    let (app, client) = setup();

    let cases = [
        ("customer_id", serde_json::json!(""), "Customer ID is required"),
        ("amount", serde_json::json!(0), "Amount must be greater than zero"),
        ("amount", serde_json::json!(-3.5), "Amount must be greater than zero"),
        ("address", serde_json::json!(""), "Shipping address is required"),
    ];

    for (field, value, message) in cases {
        let mut body = saga_body();
        body[field] = value;

        let (status, json) = send(&app, start_request(&body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "field {field}");
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], message);
    }

    assert!(client.calls().is_empty());

    let (status, _) = send(&app, status_request("TRX-1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_start_saga_malformed_json() {
    let (app, _) = setup();

    let (status, json) = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/create-order-saga")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn test_status_requires_transaction_id() {
    let (app, _) = setup();

    let (status, json) = send(
        &app,
        Request::builder()
            .uri("/transaction-status")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Transaction ID is required");
}

#[tokio::test]
async fn test_status_unknown_transaction() {
    let (app, _) = setup();

    let (status, json) = send(&app, status_request("TRX-42")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Transaction not found: TRX-42");
}

#[tokio::test]
async fn test_ids_are_distinct() {
    let (app, _) = setup();

    let mut ids = Vec::new();
    for _ in 0..5 {
        let (_, json) = send(&app, start_request(&saga_body())).await;
        ids.push(json["transaction"]["id"].as_str().unwrap().to_string());
    }

    let mut unique = ids.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), ids.len());
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, _) = setup();

    let (_, json) = send(&app, start_request(&saga_body())).await;
    let id = json["transaction"]["id"].as_str().unwrap().to_string();
    wait_for_terminal(&app, &id).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("saga_executions_total"));
}
