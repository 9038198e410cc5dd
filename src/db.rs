//! Database module
//!
//! Connection pool setup and schema utilities.

use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};

use crate::config::Config;

/// Schema for the wallets table (idempotent)
pub const SCHEMA: &str = include_str!("../migrations/0001_create_wallets.sql");

/// Serializes concurrent schema setup across processes
const SCHEMA_LOCK_KEY: i64 = 0x5741_4c4c_4554;

const REQUIRED_TABLES: &[&str] = &["wallets"];

/// Create the connection pool and verify connectivity
pub async fn connect(config: &Config) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .min_connections(config.database_min_connections)
        .acquire_timeout(config.database_acquire_timeout)
        .connect(&config.database_url)
        .await?;

    verify_connection(&pool).await?;

    Ok(pool)
}

/// Simple connectivity check
pub async fn verify_connection(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;

    Ok(())
}

/// Check if required tables exist
pub async fn check_schema(pool: &PgPool) -> Result<bool, sqlx::Error> {
    for table in REQUIRED_TABLES {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = current_schema() AND table_name = $1
            )
            "#,
        )
        .bind(*table)
        .fetch_one(pool)
        .await?;

        if !exists {
            tracing::error!("Required table '{}' does not exist", table);
            return Ok(false);
        }
    }

    Ok(true)
}

/// Create the schema if missing.
///
/// Runs under a transaction-scoped advisory lock so parallel callers
/// (several test binaries, several replicas) don't race on CREATE TABLE.
pub async fn apply_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(SCHEMA_LOCK_KEY)
        .execute(&mut *tx)
        .await?;

    // Unprepared execution so the file may hold several statements
    (&mut *tx).execute(SCHEMA).await?;

    tx.commit().await?;

    tracing::info!("Database schema applied");
    Ok(())
}
