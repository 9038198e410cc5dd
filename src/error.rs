//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Money, MoneyError};
use crate::store::StoreError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Money(#[from] MoneyError),

    #[error("Insufficient funds")]
    InsufficientFunds { balance: Money, delta: Money },

    #[error("Wallet not found: {0}")]
    WalletNotFound(Uuid),

    // Retriable (503)
    #[error("Temporarily unable to complete the operation, retry later")]
    Transient(String),

    // Server errors (5xx)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AppError {
    /// Check if the caller may retry the same request
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Transient(_))
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => AppError::WalletNotFound(id),
            StoreError::InsufficientFunds { balance, delta } => {
                AppError::InsufficientFunds { balance, delta }
            }
            StoreError::Money(e) => AppError::Money(e),
            StoreError::Transient(e) => AppError::Transient(e.to_string()),
            StoreError::Database(e) => AppError::Database(e),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = match &self {
            // 400 Bad Request
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", Some(msg.clone()))
            }
            AppError::Money(money_err) => match money_err {
                MoneyError::InvalidAmount(msg) => {
                    (StatusCode::BAD_REQUEST, "invalid_amount", Some(msg.clone()))
                }
                MoneyError::NonPositiveAmount(_) => {
                    (StatusCode::BAD_REQUEST, "non_positive_amount", None)
                }
                MoneyError::Overflow => (StatusCode::BAD_REQUEST, "amount_overflow", None),
            },
            AppError::InsufficientFunds { balance, delta } => (
                StatusCode::BAD_REQUEST,
                "insufficient_funds",
                Some(format!("balance {}, requested {}", balance, -*delta)),
            ),

            // 404 Not Found
            AppError::WalletNotFound(id) => {
                (StatusCode::NOT_FOUND, "wallet_not_found", Some(id.to_string()))
            }

            // 503 Service Unavailable
            AppError::Transient(msg) => {
                tracing::warn!("Transient failure surfaced to client: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, "transient_failure", None)
            }

            // 500 Internal Server Error
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_mapping() {
        let id = Uuid::new_v4();
        assert!(matches!(
            AppError::from(StoreError::NotFound(id)),
            AppError::WalletNotFound(found) if found == id
        ));

        let err = AppError::from(StoreError::Transient(sqlx::Error::PoolTimedOut));
        assert!(err.is_retryable());

        let err = AppError::from(StoreError::Database(sqlx::Error::RowNotFound));
        assert!(matches!(err, AppError::Database(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_status_codes() {
        let cases = vec![
            (AppError::InvalidRequest("bad".into()), StatusCode::BAD_REQUEST),
            (AppError::Money(MoneyError::InvalidAmount("x".into())), StatusCode::BAD_REQUEST),
            (AppError::Money(MoneyError::NonPositiveAmount(Money::ZERO)), StatusCode::BAD_REQUEST),
            (
                AppError::InsufficientFunds {
                    balance: Money::ZERO,
                    delta: Money::ZERO,
                },
                StatusCode::BAD_REQUEST,
            ),
            (AppError::WalletNotFound(Uuid::nil()), StatusCode::NOT_FOUND),
            (AppError::Transient("conflict".into()), StatusCode::SERVICE_UNAVAILABLE),
            (AppError::Database(sqlx::Error::PoolClosed), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
