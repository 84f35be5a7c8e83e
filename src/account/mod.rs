//! Account management module
//!
//! Account records and their lifecycle (create, read). Balance mutation
//! belongs to the transfer engine.

pub mod error;
pub mod models;
pub mod service;

// Re-export commonly used types
pub use error::AccountError;
pub use models::{Account, AccountId};
pub use service::AccountService;
