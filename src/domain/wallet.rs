//! Wallet types
//!
//! The persisted wallet record and the transient operation request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::money::{Money, MoneyError};

/// A wallet and its current balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    #[serde(rename = "walletId")]
    pub id: Uuid,
    #[schema(value_type = String, example = "0")]
    pub balance: Money,
    pub created_at: DateTime<Utc>,
}

/// Kind of balance change requested by a caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum OperationType {
    Deposit,
    Withdraw,
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationType::Deposit => write!(f, "DEPOSIT"),
            OperationType::Withdraw => write!(f, "WITHDRAW"),
        }
    }
}

/// A deposit or withdrawal request. Never persisted.
///
/// Field presence and enum membership are enforced by deserialization;
/// [`WalletOperation::signed_amount`] enforces the amount rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WalletOperation {
    pub wallet_id: Uuid,
    pub operation_type: OperationType,
    /// Amount as text to avoid precision loss in transit
    #[schema(example = "100.00")]
    pub amount: String,
}

impl WalletOperation {
    pub fn new(wallet_id: Uuid, operation_type: OperationType, amount: impl Into<String>) -> Self {
        Self {
            wallet_id,
            operation_type,
            amount: amount.into(),
        }
    }

    pub fn deposit(wallet_id: Uuid, amount: impl Into<String>) -> Self {
        Self::new(wallet_id, OperationType::Deposit, amount)
    }

    pub fn withdraw(wallet_id: Uuid, amount: impl Into<String>) -> Self {
        Self::new(wallet_id, OperationType::Withdraw, amount)
    }

    /// Validate the amount and return it signed for the store:
    /// positive for deposits, negated for withdrawals.
    ///
    /// # Errors
    /// - `MoneyError::InvalidAmount` if the amount is not a decimal numeral
    /// - `MoneyError::NonPositiveAmount` if the amount is <= 0
    pub fn signed_amount(&self) -> Result<Money, MoneyError> {
        let amount = Money::parse_positive(&self.amount)?;

        Ok(match self.operation_type {
            OperationType::Deposit => amount,
            OperationType::Withdraw => -amount,
        })
    }
}
