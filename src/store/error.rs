//! Balance Store Errors
//!
//! Error types for balance store operations.

use uuid::Uuid;

use crate::domain::{Money, MoneyError};

/// SQLSTATE codes that signal a retriable conflict or lost connection.
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";
const LOCK_NOT_AVAILABLE: &str = "55P03";
const CONNECTION_EXCEPTION_CLASS: &str = "08";

/// Errors that can occur in the balance store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No wallet record for the identifier
    #[error("Wallet not found: {0}")]
    NotFound(Uuid),

    /// Applying the delta would drive the balance below zero
    #[error("Insufficient funds: balance {balance}, delta {delta}")]
    InsufficientFunds { balance: Money, delta: Money },

    /// Arithmetic on the stored balance failed
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Serialization conflict, deadlock or connection loss; the whole
    /// operation may be retried
    #[error("Transient storage failure: {0}")]
    Transient(#[source] sqlx::Error),

    /// Any other database error
    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl StoreError {
    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Transient(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if is_transient(&err) {
            StoreError::Transient(err)
        } else {
            StoreError::Database(err)
        }
    }
}

/// Classify a sqlx error as transient (retry may help) or not.
pub fn is_transient(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err
            .code()
            .map(|code| is_transient_sqlstate(&code))
            .unwrap_or(false),
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::WorkerCrashed => true,
        _ => false,
    }
}

fn is_transient_sqlstate(code: &str) -> bool {
    matches!(code, SERIALIZATION_FAILURE | DEADLOCK_DETECTED | LOCK_NOT_AVAILABLE)
        || code.starts_with(CONNECTION_EXCEPTION_CLASS)
}
