//! Transfers between accounts
//!
//! [`TransferEngine`] runs the locking protocol; [`TransferRecord`] is the
//! ledger entry each committed transfer leaves behind.

pub mod engine;
pub mod error;
pub mod types;

mod integration_tests;

// Re-exports for convenience
pub use engine::{TransferConfig, TransferEngine, lock_order};
pub use error::TransferError;
pub use types::{NewTransfer, TransferRecord};
