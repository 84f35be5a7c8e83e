//! Bank facade
//!
//! Wires one store into the account lifecycle and the transfer engine and
//! exposes them behind an object-safe trait, so the HTTP layer can hold an
//! `Arc<dyn BankApi>` without knowing which backend is in use.

use std::sync::Arc;

use async_trait::async_trait;

use crate::account::{Account, AccountError, AccountService};
use crate::store::{BankStore, StoreError};
use crate::transfer::{TransferConfig, TransferEngine, TransferError, TransferRecord};

/// Operations exposed to callers
#[async_trait]
pub trait BankApi: Send + Sync {
    async fn create_account(
        &self,
        account_id: i64,
        initial_balance: Option<&str>,
    ) -> Result<Account, AccountError>;

    async fn get_account(&self, account_id: i64) -> Result<Account, AccountError>;

    async fn account_transfers(&self, account_id: i64)
    -> Result<Vec<TransferRecord>, AccountError>;

    async fn transfer(
        &self,
        from: i64,
        to: i64,
        amount: &str,
    ) -> Result<TransferRecord, TransferError>;

    /// Backend liveness
    async fn health_check(&self) -> Result<(), StoreError>;
}

pub struct Bank<S> {
    store: Arc<S>,
    accounts: AccountService<S>,
    engine: TransferEngine<S>,
}

impl<S: BankStore> Bank<S> {
    pub fn new(store: Arc<S>, config: TransferConfig) -> Self {
        Self {
            accounts: AccountService::new(store.clone(), config.scale),
            engine: TransferEngine::new(store.clone(), config),
            store,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }
}

#[async_trait]
impl<S: BankStore + 'static> BankApi for Bank<S> {
    async fn create_account(
        &self,
        account_id: i64,
        initial_balance: Option<&str>,
    ) -> Result<Account, AccountError> {
        self.accounts
            .create_account(account_id, initial_balance)
            .await
    }

    async fn get_account(&self, account_id: i64) -> Result<Account, AccountError> {
        self.accounts.get_account(account_id).await
    }

    async fn account_transfers(
        &self,
        account_id: i64,
    ) -> Result<Vec<TransferRecord>, AccountError> {
        self.accounts.account_transfers(account_id).await
    }

    async fn transfer(
        &self,
        from: i64,
        to: i64,
        amount: &str,
    ) -> Result<TransferRecord, TransferError> {
        self.engine.transfer(from, to, amount).await
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.store.ping().await
    }
}
