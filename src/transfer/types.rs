//! Transfer Core Types
//!
//! Ledger records produced by the transfer engine.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::account::AccountId;
use crate::money::Money;

/// A transfer about to be appended to the ledger (no id yet)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransfer {
    pub source_account_id: AccountId,
    pub destination_account_id: AccountId,
    pub amount: Money,
    pub created_at: DateTime<Utc>,
}

/// Immutable ledger entry, one per committed transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferRecord {
    /// Assigned by the store on append
    pub transfer_id: i64,
    pub source_account_id: AccountId,
    pub destination_account_id: AccountId,
    pub amount: Money,
    pub created_at: DateTime<Utc>,
}

impl TransferRecord {
    pub fn from_new(transfer_id: i64, new: &NewTransfer) -> Self {
        Self {
            transfer_id,
            source_account_id: new.source_account_id,
            destination_account_id: new.destination_account_id,
            amount: new.amount,
            created_at: new.created_at,
        }
    }

    /// True if `account_id` is the source or the destination
    pub fn touches(&self, account_id: AccountId) -> bool {
        self.source_account_id == account_id || self.destination_account_id == account_id
    }
}
