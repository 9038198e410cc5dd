//! Domain module
//!
//! Core domain types: exact money and wallet requests.

pub mod money;
pub mod wallet;

pub use money::{Money, MoneyError};
pub use wallet::{OperationType, Wallet, WalletOperation};
