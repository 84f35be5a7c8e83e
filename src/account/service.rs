//! Account lifecycle: create, read, ledger history

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};

use super::error::AccountError;
use super::models::{Account, AccountId};
use crate::money::Money;
use crate::store::BankStore;
use crate::transfer::types::TransferRecord;

pub struct AccountService<S> {
    store: Arc<S>,
    scale: u32,
}

impl<S: BankStore> AccountService<S> {
    pub fn new(store: Arc<S>, scale: u32) -> Self {
        Self { store, scale }
    }

    /// Create an account with the given balance (`None` = zero)
    #[instrument(skip(self))]
    pub async fn create_account(
        &self,
        account_id: i64,
        initial_balance: Option<&str>,
    ) -> Result<Account, AccountError> {
        let id = valid_id(account_id)?;
        let balance = match initial_balance {
            Some(raw) => Money::parse(raw, self.scale)?,
            None => Money::zero(self.scale),
        };

        let account = Account::new(id, balance, Utc::now());
        if let Err(e) = self.store.create_account(&account).await {
            warn!(error = %e, "account creation rejected");
            return Err(e.into());
        }

        info!(balance = %account.balance, "account created");
        Ok(account)
    }

    /// Snapshot read of committed state
    pub async fn get_account(&self, account_id: i64) -> Result<Account, AccountError> {
        let id = valid_id(account_id)?;
        Ok(self.store.get_account(id).await?)
    }

    /// Ledger entries where the account is source or destination
    pub async fn account_transfers(
        &self,
        account_id: i64,
    ) -> Result<Vec<TransferRecord>, AccountError> {
        let id = valid_id(account_id)?;
        // Distinguish "no transfers" from "no such account"
        self.store.get_account(id).await?;
        Ok(self.store.list_transfers(id).await?)
    }
}

fn valid_id(raw: i64) -> Result<AccountId, AccountError> {
    let id = AccountId::new(raw);
    if !id.is_valid() {
        return Err(AccountError::InvalidAccountId(raw));
    }
    Ok(id)
}
