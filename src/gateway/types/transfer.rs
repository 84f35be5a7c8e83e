//! Transfer request/response DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::transfer::TransferRecord;

/// POST /api/v1/transactions body
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TransferRequest {
    #[validate(range(min = 1))]
    #[schema(example = 1)]
    pub source_account_id: i64,
    #[validate(range(min = 1))]
    #[schema(example = 2)]
    pub destination_account_id: i64,
    /// Positive decimal string
    #[validate(length(min = 1))]
    #[schema(example = "100.00")]
    pub amount: String,
}

/// Committed ledger entry
#[derive(Debug, Serialize, ToSchema)]
pub struct TransferData {
    pub transfer_id: i64,
    pub source_account_id: i64,
    pub destination_account_id: i64,
    #[schema(example = "100.00")]
    pub amount: String,
    pub created_at: DateTime<Utc>,
}

impl From<&TransferRecord> for TransferData {
    fn from(record: &TransferRecord) -> Self {
        Self {
            transfer_id: record.transfer_id,
            source_account_id: record.source_account_id.get(),
            destination_account_id: record.destination_account_id.get(),
            amount: record.amount.to_canonical_string(),
            created_at: record.created_at,
        }
    }
}
