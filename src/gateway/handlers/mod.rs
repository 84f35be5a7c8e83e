//! HTTP handlers
//!
//! Handlers only decode, validate and map errors; every business rule lives
//! behind [`crate::bank::BankApi`].

pub mod account;
pub mod health;
pub mod transfer;

pub use account::{create_account, get_account, get_account_transactions};
pub use health::{HealthResponse, health_check};
pub use transfer::create_transfer;
