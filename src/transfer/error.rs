//! Transfer Error Types
//!
//! Validation errors are raised before any storage access. Everything after
//! `begin` is reported only once the transaction scope has been rolled back.

use thiserror::Error;

use crate::account::AccountId;
use crate::money::{Money, MoneyError};
use crate::store::StoreError;

/// Transfer error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    // === Validation Errors ===
    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] MoneyError),

    #[error("Invalid account id: {0}")]
    InvalidAccountId(i64),

    #[error("Source and destination account cannot be the same")]
    SameAccount,

    // === Account Errors ===
    #[error("Source account {0} not found")]
    SourceAccountNotFound(AccountId),

    #[error("Destination account {0} not found")]
    DestinationAccountNotFound(AccountId),

    // === Business Rule Errors ===
    #[error("Insufficient balance: available {available}, requested {requested}")]
    InsufficientBalance { available: Money, requested: Money },

    #[error("Amount would cause overflow")]
    Overflow,

    // === System Errors ===
    #[error("Storage error: {0}")]
    Store(String),

    #[error("Commit failed: {0}")]
    CommitFailure(String),

    #[error("Transfer timed out and was rolled back")]
    Timeout,
}

impl TransferError {
    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            TransferError::InvalidAmount(_) => "INVALID_AMOUNT",
            TransferError::InvalidAccountId(_) => "INVALID_ACCOUNT_ID",
            TransferError::SameAccount => "SAME_ACCOUNT",
            TransferError::SourceAccountNotFound(_) => "SOURCE_ACCOUNT_NOT_FOUND",
            TransferError::DestinationAccountNotFound(_) => "DESTINATION_ACCOUNT_NOT_FOUND",
            TransferError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            TransferError::Overflow => "OVERFLOW",
            TransferError::Store(_) => "STORE_ERROR",
            TransferError::CommitFailure(_) => "COMMIT_FAILURE",
            TransferError::Timeout => "TIMEOUT",
        }
    }

    /// Get HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            TransferError::InvalidAmount(_)
            | TransferError::InvalidAccountId(_)
            | TransferError::SameAccount => 400,
            TransferError::SourceAccountNotFound(_)
            | TransferError::DestinationAccountNotFound(_) => 404,
            TransferError::InsufficientBalance { .. } | TransferError::Overflow => 422,
            TransferError::Store(_) | TransferError::CommitFailure(_) => 500,
            TransferError::Timeout => 503,
        }
    }

    /// Business-rule and validation rejections (as opposed to infrastructure
    /// failures)
    pub fn is_rejection(&self) -> bool {
        self.http_status() < 500
    }
}

impl From<StoreError> for TransferError {
    fn from(e: StoreError) -> Self {
        TransferError::Store(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::DEFAULT_SCALE;

    #[test]
    fn test_error_codes() {
        assert_eq!(TransferError::SameAccount.code(), "SAME_ACCOUNT");
        assert_eq!(
            TransferError::InvalidAmount(MoneyError::NotPositive).code(),
            "INVALID_AMOUNT"
        );
        assert_eq!(
            TransferError::CommitFailure("x".into()).code(),
            "COMMIT_FAILURE"
        );
    }

    #[test]
    fn test_http_status() {
        assert_eq!(TransferError::SameAccount.http_status(), 400);
        assert_eq!(TransferError::InvalidAccountId(0).http_status(), 400);
        assert_eq!(
            TransferError::SourceAccountNotFound(AccountId::new(1)).http_status(),
            404
        );
        assert_eq!(TransferError::Store("down".into()).http_status(), 500);
        assert_eq!(TransferError::Timeout.http_status(), 503);
        assert!(TransferError::Overflow.is_rejection());
        assert!(!TransferError::Timeout.is_rejection());
    }

    #[test]
    fn test_display() {
        let err = TransferError::InsufficientBalance {
            available: Money::parse("900", DEFAULT_SCALE).unwrap(),
            requested: Money::parse("10000", DEFAULT_SCALE).unwrap(),
        };
        assert_eq!(err.code(), "INSUFFICIENT_BALANCE");
        assert_eq!(err.http_status(), 422);
        assert_eq!(
            err.to_string(),
            "Insufficient balance: available 900.00, requested 10000.00"
        );
    }

    #[test]
    fn test_from_money_error() {
        let err: TransferError = MoneyError::Negative.into();
        assert_eq!(err, TransferError::InvalidAmount(MoneyError::Negative));
    }
}
