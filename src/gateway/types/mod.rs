//! Gateway types module
//!
//! ## Input Types
//! - [`CreateAccountRequest`], [`TransferRequest`]: validated request bodies
//!
//! ## Output Types
//! - [`ApiResponse<T>`]: Unified API response wrapper
//! - [`AccountData`], [`TransferData`]: amounts rendered as exact strings
//!
//! ## Submodules
//! - [`account`]: Account DTOs
//! - [`transfer`]: Transfer DTOs
//! - [`response`]: Response envelope, errors and error codes

pub mod account;
pub mod response;
pub mod transfer;

// Re-export commonly used types at module root
pub use account::{AccountData, CreateAccountRequest};
pub use response::{ApiError, ApiResponse, ApiResult, created, error_codes, ok};
pub use transfer::{TransferData, TransferRequest};
