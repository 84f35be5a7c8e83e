//! Storage Seams
//!
//! The transfer engine and account lifecycle only talk to storage through the
//! traits in this module. Two implementations ship with the crate:
//!
//! - [`memory::MemoryStore`] - in-process rows with exclusive row locks
//! - [`postgres::PgStore`] - PostgreSQL via sqlx (`SELECT ... FOR UPDATE`)
//!
//! # Transaction scope contract
//!
//! A [`TransactionScope`] is the unit inside which locking reads, writes and
//! ledger appends are isolated from everyone else until `commit`. Dropping a
//! scope without committing MUST roll it back and release its locks, so a
//! cancelled future or an early `?` can never leave a half-applied transfer.

pub mod memory;
pub mod postgres;
pub mod schema;

use async_trait::async_trait;
use thiserror::Error;

use crate::account::{Account, AccountId};
use crate::money::MoneyError;
use crate::transfer::types::{NewTransfer, TransferRecord};

pub use memory::{FaultPoint, MemoryStore};
pub use postgres::PgStore;

/// Storage errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("account {0} not found")]
    NotFound(AccountId),

    #[error("account {0} already exists")]
    DuplicateAccount(AccountId),

    #[error("account {0} is not locked by this transaction")]
    RowNotLocked(AccountId),

    #[error("corrupted row: {0}")]
    Corrupted(String),

    #[error("database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

impl From<MoneyError> for StoreError {
    fn from(e: MoneyError) -> Self {
        StoreError::Corrupted(e.to_string())
    }
}

/// Begin/commit/rollback unit
#[async_trait]
pub trait TransactionScope: Send + Sized {
    /// Publish every write made in this scope atomically and release locks
    async fn commit(self) -> Result<(), StoreError>;

    /// Discard every write made in this scope and release locks
    async fn rollback(self) -> Result<(), StoreError>;
}

/// A store that can open transaction scopes
#[async_trait]
pub trait TransactionalStore: Send + Sync {
    type Tx: TransactionScope;

    /// Open a new transaction scope
    async fn begin(&self) -> Result<Self::Tx, StoreError>;

    /// Liveness probe for health checks
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Durable keyed account balances
#[async_trait]
pub trait AccountStore: TransactionalStore {
    /// Insert a new account; `DuplicateAccount` if the id exists
    async fn create_account(&self, account: &Account) -> Result<(), StoreError>;

    /// Non-locking snapshot read of committed state
    async fn get_account(&self, account_id: AccountId) -> Result<Account, StoreError>;

    /// Locking read. Blocks until the row's exclusive lock is available and
    /// holds it until `tx` ends.
    async fn get_account_for_update(
        &self,
        tx: &mut Self::Tx,
        account_id: AccountId,
    ) -> Result<Account, StoreError>;

    /// Full-record write-back inside `tx`
    async fn save_account(&self, tx: &mut Self::Tx, account: &Account) -> Result<(), StoreError>;
}

/// Append-only transfer ledger
#[async_trait]
pub trait LedgerStore: TransactionalStore {
    /// Insert-only append inside `tx`; the store assigns `transfer_id`
    async fn append_transfer(
        &self,
        tx: &mut Self::Tx,
        transfer: &NewTransfer,
    ) -> Result<TransferRecord, StoreError>;

    /// Committed transfers where `account_id` is source or destination,
    /// oldest first
    async fn list_transfers(&self, account_id: AccountId)
    -> Result<Vec<TransferRecord>, StoreError>;
}

/// Everything the bank needs from one backend
pub trait BankStore: AccountStore + LedgerStore {}

impl<T: AccountStore + LedgerStore> BankStore for T {}
