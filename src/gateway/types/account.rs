//! Account request/response DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::account::Account;

/// POST /api/v1/accounts body
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAccountRequest {
    /// Caller-chosen account id
    #[validate(range(min = 1))]
    #[schema(example = 1)]
    pub account_id: i64,
    /// Decimal string; zero when omitted
    #[validate(length(min = 1))]
    #[schema(example = "1000.00")]
    pub initial_balance: Option<String>,
}

/// Account snapshot
#[derive(Debug, Serialize, ToSchema)]
pub struct AccountData {
    #[schema(example = 1)]
    pub account_id: i64,
    /// Exact decimal string
    #[schema(example = "1000.00")]
    pub balance: String,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Account> for AccountData {
    fn from(account: &Account) -> Self {
        Self {
            account_id: account.account_id.get(),
            balance: account.balance.to_canonical_string(),
            version: account.version,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}
