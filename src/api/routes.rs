//! API Routes
//!
//! HTTP endpoint definitions.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use crate::domain::{Money, OperationType, Wallet, WalletOperation};
use crate::error::{AppError, ErrorResponse};
use crate::service::WalletService;

// =========================================================================
// Shared state
// =========================================================================

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub wallets: Arc<dyn WalletService>,
}

impl AppState {
    pub fn new<S: WalletService>(service: S) -> Self {
        Self {
            wallets: Arc::new(service),
        }
    }
}

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OperationResponse {
    #[schema(example = "Operation completed")]
    pub message: String,
    #[schema(value_type = String, example = "60.00")]
    pub balance: Money,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub wallet_id: Uuid,
    #[schema(value_type = String, example = "60.00")]
    pub balance: Money,
}

// =========================================================================
// OpenAPI document
// =========================================================================

#[derive(OpenApi)]
#[openapi(
    info(title = "walletLedger API", description = "Wallet creation, deposits, withdrawals and balances"),
    paths(create_wallet, change_balance, get_balance),
    components(schemas(
        Wallet,
        WalletOperation,
        OperationType,
        OperationResponse,
        BalanceResponse,
        ErrorResponse
    ))
)]
pub struct ApiDoc;

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/create-wallet", post(create_wallet))
        .route("/wallet", post(change_balance))
        .route("/wallets/:wallet_id", get(get_balance))
        .route("/openapi.json", get(openapi_json))
}

/// Serve the OpenAPI document
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

// =========================================================================
// POST /create-wallet
// =========================================================================

/// Create a new wallet with balance 0
#[utoipa::path(
    post,
    path = "/api/v1/create-wallet",
    tag = "wallets",
    responses(
        (status = 201, description = "Wallet created", body = Wallet),
        (status = 503, description = "Transient failure, retry later", body = ErrorResponse)
    )
)]
async fn create_wallet(State(state): State<AppState>) -> Result<(StatusCode, Json<Wallet>), AppError> {
    let wallet = state.wallets.create_wallet().await?;

    Ok((StatusCode::CREATED, Json(wallet)))
}

// =========================================================================
// POST /wallet
// =========================================================================

/// Deposit to or withdraw from a wallet
#[utoipa::path(
    post,
    path = "/api/v1/wallet",
    tag = "wallets",
    request_body = WalletOperation,
    responses(
        (status = 200, description = "Balance changed", body = OperationResponse),
        (status = 400, description = "Invalid request, invalid amount or insufficient funds", body = ErrorResponse),
        (status = 404, description = "Wallet not found", body = ErrorResponse),
        (status = 503, description = "Transient failure, retry later", body = ErrorResponse)
    )
)]
async fn change_balance(
    State(state): State<AppState>,
    payload: Result<Json<WalletOperation>, JsonRejection>,
) -> Result<Json<OperationResponse>, AppError> {
    let Json(op) = payload.map_err(|e| AppError::InvalidRequest(e.body_text()))?;

    let balance = state.wallets.process_operation(op).await?;

    Ok(Json(OperationResponse {
        message: "Operation completed".to_string(),
        balance,
    }))
}

// =========================================================================
// GET /wallets/:wallet_id
// =========================================================================

/// Get wallet balance
#[utoipa::path(
    get,
    path = "/api/v1/wallets/{wallet_id}",
    tag = "wallets",
    params(("wallet_id" = Uuid, Path, description = "Wallet identifier")),
    responses(
        (status = 200, description = "Current balance", body = BalanceResponse),
        (status = 400, description = "Malformed wallet id", body = ErrorResponse),
        (status = 404, description = "Wallet not found", body = ErrorResponse)
    )
)]
async fn get_balance(
    State(state): State<AppState>,
    Path(wallet_id): Path<String>,
) -> Result<Json<BalanceResponse>, AppError> {
    let wallet_id = Uuid::parse_str(&wallet_id)
        .map_err(|_| AppError::InvalidRequest(format!("Invalid wallet id: {}", wallet_id)))?;

    let balance = state.wallets.get_balance(wallet_id).await?;

    Ok(Json(BalanceResponse { wallet_id, balance }))
}
