//! Balance Store module
//!
//! Durable wallet balances with serializable, row-locked updates.

mod error;
mod repository;

pub use error::{is_transient, StoreError};
pub use repository::BalanceStore;
