//! Common test utilities

#![allow(dead_code)]

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use wallet_ledger::{db, RetryPolicy};

/// Connect to the test database and ensure the schema exists.
///
/// Returns `None` (and the test should return early) when `DATABASE_URL`
/// is not set. Tests never truncate: every test works on fresh wallets, so
/// test binaries can share one database in parallel.
pub async fn setup_test_db() -> Option<PgPool> {
    dotenvy::dotenv().ok();
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping database test");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    db::apply_schema(&pool).await.expect("Failed to apply schema");

    Some(pool)
}

/// Retry policy for tests that race many transactions on one wallet.
/// Each contention round lets one transaction commit, so attempts must
/// exceed the number of concurrent writers.
pub fn contention_retry_policy() -> RetryPolicy {
    RetryPolicy::new(200, Duration::from_millis(2)).with_max_delay(Duration::from_millis(50))
}
