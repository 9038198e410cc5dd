//! Wallet Service module
//!
//! The wallet capability set as an explicit trait, plus the
//! store-backed implementation used by the HTTP layer.

mod retry;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Money, Wallet, WalletOperation};
use crate::error::AppResult;
use crate::store::BalanceStore;

pub use retry::RetryPolicy;

/// Operations exposed to the HTTP layer
#[async_trait]
pub trait WalletService: Send + Sync + 'static {
    /// Create a wallet with balance 0
    async fn create_wallet(&self) -> AppResult<Wallet>;

    /// Validate and apply a deposit or withdrawal; returns the new balance.
    ///
    /// Delivery is at least once when retries are enabled: an I/O failure
    /// during commit is classified as transient, yet the commit may already
    /// have landed on the server, in which case the retry applies the delta
    /// a second time.
    async fn process_operation(&self, op: WalletOperation) -> AppResult<Money>;

    /// Current balance of a wallet
    async fn get_balance(&self, wallet_id: Uuid) -> AppResult<Money>;
}

/// WalletService backed by the PostgreSQL balance store
#[derive(Debug, Clone)]
pub struct LedgerService {
    store: BalanceStore,
    retry: RetryPolicy,
}

impl LedgerService {
    pub fn new(store: BalanceStore, retry: RetryPolicy) -> Self {
        Self { store, retry }
    }
}

#[async_trait]
impl WalletService for LedgerService {
    async fn create_wallet(&self) -> AppResult<Wallet> {
        let store = &self.store;
        let wallet = self
            .retry
            .run("create_wallet", move || store.create_wallet())
            .await?;

        tracing::info!(wallet_id = %wallet.id, "Wallet created");
        Ok(wallet)
    }

    async fn process_operation(&self, op: WalletOperation) -> AppResult<Money> {
        let delta = op.signed_amount()?;
        let wallet_id = op.wallet_id;

        let store = &self.store;
        let balance = self
            .retry
            .run("apply_delta", move || store.apply_delta(wallet_id, delta))
            .await?;

        tracing::info!(
            wallet_id = %wallet_id,
            operation = %op.operation_type,
            amount = %op.amount,
            balance = %balance,
            "Operation completed"
        );
        Ok(balance)
    }

    async fn get_balance(&self, wallet_id: Uuid) -> AppResult<Money> {
        let store = &self.store;
        let balance = self
            .retry
            .run("get_balance", move || store.get_balance(wallet_id))
            .await?;

        Ok(balance)
    }
}
