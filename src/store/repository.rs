//! Balance Store Repository
//!
//! Sole owner of durable per-wallet balance state.
//! Every balance change is one SERIALIZABLE transaction that reads the row
//! with `FOR UPDATE`, checks non-negativity and writes the new balance.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::{Money, Wallet};

use super::StoreError;

/// Balance Store backed by PostgreSQL
#[derive(Debug, Clone)]
pub struct BalanceStore {
    pool: PgPool,
}

impl BalanceStore {
    /// Create a new BalanceStore with a database pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // create_wallet
    // =========================================================================

    /// Allocate a new wallet with balance 0
    pub async fn create_wallet(&self) -> Result<Wallet, StoreError> {
        let wallet_id = Uuid::new_v4();

        let (id, balance, created_at): (Uuid, Decimal, DateTime<Utc>) = sqlx::query_as(
            r#"
            INSERT INTO wallets (wallet_id, balance)
            VALUES ($1, 0)
            RETURNING wallet_id, balance, created_at
            "#,
        )
        .bind(wallet_id)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(wallet_id = %id, "Wallet created");

        Ok(Wallet {
            id,
            balance: Money::new(balance),
            created_at,
        })
    }

    // =========================================================================
    // get_balance
    // =========================================================================

    /// Point-in-time read of a wallet's balance
    pub async fn get_balance(&self, wallet_id: Uuid) -> Result<Money, StoreError> {
        let balance: Option<Decimal> = sqlx::query_scalar(
            r#"
            SELECT balance FROM wallets WHERE wallet_id = $1
            "#,
        )
        .bind(wallet_id)
        .fetch_optional(&self.pool)
        .await?;

        balance
            .map(Money::new)
            .ok_or(StoreError::NotFound(wallet_id))
    }

    // =========================================================================
    // apply_delta (single attempt, never retried here)
    // =========================================================================

    /// Atomically apply a signed delta to a wallet's balance.
    ///
    /// Returns the new balance. The transaction rolls back when dropped
    /// uncommitted, so every early return below (and cancellation of this
    /// future) leaves the stored balance untouched.
    pub async fn apply_delta(&self, wallet_id: Uuid, delta: Money) -> Result<Money, StoreError> {
        let mut tx = self.begin_serializable().await?;

        let current = Self::lock_balance(&mut tx, wallet_id).await?;

        let new_balance = current.checked_add(delta)?;
        if new_balance.is_negative() {
            tracing::debug!(
                wallet_id = %wallet_id,
                balance = %current,
                delta = %delta,
                "Rejected delta: insufficient funds"
            );
            return Err(StoreError::InsufficientFunds {
                balance: current,
                delta,
            });
        }

        sqlx::query(
            r#"
            UPDATE wallets
            SET balance = $2, updated_at = NOW()
            WHERE wallet_id = $1
            "#,
        )
        .bind(wallet_id)
        .bind(new_balance.value())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(
            wallet_id = %wallet_id,
            delta = %delta,
            balance = %new_balance,
            "Delta applied"
        );

        Ok(new_balance)
    }

    /// Start a transaction at the strongest isolation level
    async fn begin_serializable(&self) -> Result<Transaction<'static, Postgres>, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Must be the first statement of the transaction
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await?;

        Ok(tx)
    }

    /// Read the balance holding an exclusive row lock until commit/rollback
    async fn lock_balance(
        tx: &mut Transaction<'_, Postgres>,
        wallet_id: Uuid,
    ) -> Result<Money, StoreError> {
        let balance: Option<Decimal> = sqlx::query_scalar(
            r#"
            SELECT balance FROM wallets WHERE wallet_id = $1 FOR UPDATE
            "#,
        )
        .bind(wallet_id)
        .fetch_optional(&mut **tx)
        .await?;

        balance
            .map(Money::new)
            .ok_or(StoreError::NotFound(wallet_id))
    }
}
