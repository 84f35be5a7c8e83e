//! Account lifecycle errors

use thiserror::Error;

use super::models::AccountId;
use crate::money::MoneyError;
use crate::store::StoreError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccountError {
    #[error("Invalid initial balance: {0}")]
    InvalidAmount(#[from] MoneyError),

    #[error("Invalid account id: {0}")]
    InvalidAccountId(i64),

    #[error("Account {0} already exists")]
    DuplicateAccount(AccountId),

    #[error("Account {0} not found")]
    NotFound(AccountId),

    #[error("Storage error: {0}")]
    Store(String),
}

impl AccountError {
    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            AccountError::InvalidAmount(_) => "INVALID_AMOUNT",
            AccountError::InvalidAccountId(_) => "INVALID_ACCOUNT_ID",
            AccountError::DuplicateAccount(_) => "DUPLICATE_ACCOUNT",
            AccountError::NotFound(_) => "ACCOUNT_NOT_FOUND",
            AccountError::Store(_) => "STORE_ERROR",
        }
    }

    /// Get HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            AccountError::InvalidAmount(_) | AccountError::InvalidAccountId(_) => 400,
            AccountError::NotFound(_) => 404,
            AccountError::DuplicateAccount(_) => 409,
            AccountError::Store(_) => 500,
        }
    }
}

impl From<StoreError> for AccountError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => AccountError::NotFound(id),
            StoreError::DuplicateAccount(id) => AccountError::DuplicateAccount(id),
            other => AccountError::Store(other.to_string()),
        }
    }
}
