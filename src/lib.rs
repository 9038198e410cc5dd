//! walletLedger Library
//!
//! Re-exports modules for the server binary, the load tool and integration testing.

pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod service;
pub mod store;

pub use config::Config;
pub use domain::{Money, MoneyError, OperationType, Wallet, WalletOperation};
pub use error::{AppError, AppResult};
pub use service::{LedgerService, RetryPolicy, WalletService};
pub use store::{BalanceStore, StoreError};
