//! In-memory Store
//!
//! Process-local implementation of the storage traits with the same isolation
//! behaviour as the PostgreSQL store:
//!
//! - Committed state lives behind one `RwLock`; snapshot reads never wait on
//!   row locks and never observe uncommitted writes.
//! - Each account row has its own exclusive lock. A transaction holds the
//!   owned guard until it commits, rolls back or is dropped.
//! - Writes and ledger appends are staged in the transaction and published in
//!   a single write-locked step at commit.
//!
//! Fault injection ([`FaultPoint`]) lets tests fail any step of a transfer.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::{debug, trace};

use super::{AccountStore, LedgerStore, StoreError, TransactionScope, TransactionalStore};
use crate::account::{Account, AccountId};
use crate::transfer::types::{NewTransfer, TransferRecord};

/// Step at which an injected fault fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultPoint {
    Begin,
    LockAccount(AccountId),
    SaveAccount(AccountId),
    AppendTransfer,
    Commit,
}

impl fmt::Display for FaultPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultPoint::Begin => write!(f, "begin"),
            FaultPoint::LockAccount(id) => write!(f, "lock account {id}"),
            FaultPoint::SaveAccount(id) => write!(f, "save account {id}"),
            FaultPoint::AppendTransfer => write!(f, "append transfer"),
            FaultPoint::Commit => write!(f, "commit"),
        }
    }
}

fn check_fault(faults: &DashSet<FaultPoint>, point: FaultPoint) -> Result<(), StoreError> {
    if faults.contains(&point) {
        return Err(StoreError::Database(format!("injected fault at {point}")));
    }
    Ok(())
}

#[derive(Default)]
struct Committed {
    accounts: HashMap<AccountId, Account>,
    transfers: Vec<TransferRecord>,
}

/// In-memory account + ledger store. Cheap to clone; clones share state.
#[derive(Clone, Default)]
pub struct MemoryStore {
    committed: Arc<RwLock<Committed>>,
    row_locks: Arc<DashMap<AccountId, Arc<Mutex<()>>>>,
    next_transfer_id: Arc<AtomicI64>,
    faults: Arc<DashSet<FaultPoint>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call reaching `point` fail until cleared
    pub fn inject_fault(&self, point: FaultPoint) {
        self.faults.insert(point);
    }

    pub fn clear_faults(&self) {
        self.faults.clear();
    }

    /// All committed accounts, ordered by id
    pub async fn accounts(&self) -> Vec<Account> {
        let state = self.committed.read().await;
        let mut accounts: Vec<Account> = state.accounts.values().cloned().collect();
        accounts.sort_by_key(|a| a.account_id);
        accounts
    }

    /// All committed ledger records, in commit order
    pub async fn transfers(&self) -> Vec<TransferRecord> {
        self.committed.read().await.transfers.clone()
    }
}

/// Transaction scope for [`MemoryStore`]
pub struct MemoryTx {
    committed: Arc<RwLock<Committed>>,
    faults: Arc<DashSet<FaultPoint>>,
    locks: HashMap<AccountId, OwnedMutexGuard<()>>,
    staged_accounts: HashMap<AccountId, Account>,
    staged_transfers: Vec<TransferRecord>,
}

impl MemoryTx {
    fn holds_lock(&self, account_id: AccountId) -> bool {
        self.locks.contains_key(&account_id)
    }
}

#[async_trait]
impl TransactionScope for MemoryTx {
    async fn commit(self) -> Result<(), StoreError> {
        // On failure `self` is dropped here: staged writes vanish, locks release
        check_fault(&self.faults, FaultPoint::Commit)?;

        let MemoryTx {
            committed,
            locks,
            staged_accounts,
            staged_transfers,
            ..
        } = self;

        {
            let mut state = committed.write().await;
            for (account_id, account) in staged_accounts {
                state.accounts.insert(account_id, account);
            }
            state.transfers.extend(staged_transfers);
        }

        trace!(rows = locks.len(), "memory tx committed");
        drop(locks);
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        debug!(
            rows = self.locks.len(),
            staged_transfers = self.staged_transfers.len(),
            "memory tx rolled back"
        );
        drop(self);
        Ok(())
    }
}

#[async_trait]
impl TransactionalStore for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<MemoryTx, StoreError> {
        check_fault(&self.faults, FaultPoint::Begin)?;
        Ok(MemoryTx {
            committed: Arc::clone(&self.committed),
            faults: Arc::clone(&self.faults),
            locks: HashMap::new(),
            staged_accounts: HashMap::new(),
            staged_transfers: Vec::new(),
        })
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn create_account(&self, account: &Account) -> Result<(), StoreError> {
        let mut state = self.committed.write().await;
        if state.accounts.contains_key(&account.account_id) {
            return Err(StoreError::DuplicateAccount(account.account_id));
        }
        state.accounts.insert(account.account_id, account.clone());
        Ok(())
    }

    async fn get_account(&self, account_id: AccountId) -> Result<Account, StoreError> {
        self.committed
            .read()
            .await
            .accounts
            .get(&account_id)
            .cloned()
            .ok_or(StoreError::NotFound(account_id))
    }

    async fn get_account_for_update(
        &self,
        tx: &mut MemoryTx,
        account_id: AccountId,
    ) -> Result<Account, StoreError> {
        check_fault(&self.faults, FaultPoint::LockAccount(account_id))?;

        if let Some(staged) = tx.staged_accounts.get(&account_id) {
            return Ok(staged.clone());
        }

        if !tx.holds_lock(account_id) {
            if !self
                .committed
                .read()
                .await
                .accounts
                .contains_key(&account_id)
            {
                return Err(StoreError::NotFound(account_id));
            }

            // Clone the Arc out so no map shard is held while waiting
            let row_lock = Arc::clone(
                &self
                    .row_locks
                    .entry(account_id)
                    .or_insert_with(Default::default),
            );
            let guard = row_lock.lock_owned().await;
            trace!(account_id = %account_id, "row lock acquired");
            tx.locks.insert(account_id, guard);
        }

        self.get_account(account_id).await
    }

    async fn save_account(&self, tx: &mut MemoryTx, account: &Account) -> Result<(), StoreError> {
        check_fault(&self.faults, FaultPoint::SaveAccount(account.account_id))?;

        if !tx.holds_lock(account.account_id) {
            return Err(StoreError::RowNotLocked(account.account_id));
        }
        tx.staged_accounts
            .insert(account.account_id, account.clone());
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn append_transfer(
        &self,
        tx: &mut MemoryTx,
        transfer: &NewTransfer,
    ) -> Result<TransferRecord, StoreError> {
        check_fault(&self.faults, FaultPoint::AppendTransfer)?;

        // Ids consumed by rolled-back transfers are not reused (like a sequence)
        let transfer_id = self.next_transfer_id.fetch_add(1, Ordering::SeqCst) + 1;
        let record = TransferRecord::from_new(transfer_id, transfer);
        tx.staged_transfers.push(record.clone());
        Ok(record)
    }

    async fn list_transfers(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<TransferRecord>, StoreError> {
        let state = self.committed.read().await;
        let mut records: Vec<TransferRecord> = state
            .transfers
            .iter()
            .filter(|t| t.touches(account_id))
            .cloned()
            .collect();
        // Ids are assigned at append, commits may land out of order
        records.sort_by_key(|t| t.transfer_id);
        Ok(records)
    }
}
