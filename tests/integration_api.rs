//! API Integration Tests
//!
//! Full router on top of the PostgreSQL-backed service.

use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::util::ServiceExt;
use uuid::Uuid;
use wallet_ledger::api::{self, AppState};
use wallet_ledger::{BalanceStore, LedgerService};

mod common;

async fn setup_app() -> Option<Router> {
    let pool = common::setup_test_db().await?;
    let service = LedgerService::new(BalanceStore::new(pool), common::contention_retry_policy());
    Some(api::build_app(AppState::new(service), Duration::from_secs(30)))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn operation(wallet_id: &str, kind: &str, amount: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/wallet")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "walletId": wallet_id, "operationType": kind, "amount": amount }).to_string(),
        ))
        .unwrap()
}

fn balance_of(wallet_id: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(format!("/api/v1/wallets/{}", wallet_id))
        .body(Body::empty())
        .unwrap()
}

async fn create_wallet(app: &Router) -> String {
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/create-wallet")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::CREATED, "Wallet creation failed");
    assert_eq!(body["balance"], "0");
    body["walletId"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_wallet_lifecycle_e2e() {
    let Some(app) = setup_app().await else { return };

    // 1. Create wallet
    let wallet_id = create_wallet(&app).await;

    // 2. Deposit
    let (status, body) = send(&app, operation(&wallet_id, "DEPOSIT", "100.00")).await;
    assert_eq!(status, StatusCode::OK, "Deposit failed: {:?}", body);
    assert_eq!(body["message"], "Operation completed");
    assert_eq!(body["balance"], "100.00");

    // 3. Withdraw
    let (status, body) = send(&app, operation(&wallet_id, "WITHDRAW", "40.00")).await;
    assert_eq!(status, StatusCode::OK, "Withdraw failed: {:?}", body);
    assert_eq!(body["balance"], "60.00");

    // 4. Overdraw is rejected
    let (status, body) = send(&app, operation(&wallet_id, "WITHDRAW", "60.01")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "insufficient_funds");

    // 5. Balance unchanged
    let (status, body) = send(&app, balance_of(&wallet_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["walletId"], wallet_id);
    assert_eq!(body["balance"], "60.00");
}

#[tokio::test]
async fn test_unknown_wallet_e2e() {
    let Some(app) = setup_app().await else { return };
    let missing = Uuid::new_v4().to_string();

    let (status, body) = send(&app, balance_of(&missing)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_code"], "wallet_not_found");

    let (status, _) = send(&app, operation(&missing, "DEPOSIT", "5")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_amount_e2e() {
    let Some(app) = setup_app().await else { return };
    let wallet_id = create_wallet(&app).await;

    let (status, body) = send(&app, operation(&wallet_id, "DEPOSIT", "ten")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "invalid_amount");

    let (status, body) = send(&app, operation(&wallet_id, "WITHDRAW", "0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "non_positive_amount");

    let (_, body) = send(&app, balance_of(&wallet_id)).await;
    assert_eq!(body["balance"], "0");
}

#[tokio::test]
async fn test_concurrent_requests_e2e() {
    let Some(app) = setup_app().await else { return };
    let wallet_id = create_wallet(&app).await;

    const N: usize = 10;
    let mut handles = Vec::with_capacity(N);
    for _ in 0..N {
        let app = app.clone();
        let wallet_id = wallet_id.clone();
        handles.push(tokio::spawn(async move {
            send(&app, operation(&wallet_id, "DEPOSIT", "1.10")).await.0
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::OK);
    }

    let (_, body) = send(&app, balance_of(&wallet_id)).await;
    assert_eq!(body["balance"], "11.00");
}
