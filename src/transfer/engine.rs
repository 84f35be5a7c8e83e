//! Transfer Engine
//!
//! Moves money between two accounts as one atomic unit:
//!
//! ```text
//! validate → begin → lock (ascending id) → check → debit/credit → append → commit
//!                        └──────────── any failure: rollback ────────────┘
//! ```
//!
//! # Safety Invariants
//!
//! 1. **Canonical lock order**: rows are locked in ascending `AccountId`
//!    whatever the transfer direction, so `A→B` and `B→A` cannot deadlock
//! 2. **All or nothing**: every failure after `begin` rolls the scope back;
//!    no balance write or ledger row survives a failed transfer
//! 3. **No commit after timeout**: only the pre-commit phase is timed, and the
//!    scope lives inside it, so an expired phase is dropped (rolled back)
//!    before any commit could be issued
//! 4. **Not idempotent**: there is no request key; resubmitting a call moves
//!    the money again and appends a second ledger row

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info, instrument, warn};

use super::error::TransferError;
use super::types::{NewTransfer, TransferRecord};
use crate::account::{Account, AccountId};
use crate::money::{DEFAULT_SCALE, Money};
use crate::store::{BankStore, StoreError, TransactionScope};

/// Engine settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferConfig {
    /// Fractional digits accepted in amounts
    pub scale: u32,
    /// Limit on the pre-commit phase; `None` waits indefinitely
    pub timeout: Option<Duration>,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            timeout: Some(Duration::from_millis(5000)),
        }
    }
}

/// The order in which the two rows of a transfer are locked
pub fn lock_order(a: AccountId, b: AccountId) -> (AccountId, AccountId) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Stateless between calls; all shared state is in the store
pub struct TransferEngine<S> {
    store: Arc<S>,
    config: TransferConfig,
}

impl<S: BankStore> TransferEngine<S> {
    pub fn new(store: Arc<S>, config: TransferConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &TransferConfig {
        &self.config
    }

    /// Move `amount` from `from` to `to`.
    ///
    /// Returns the committed ledger record.
    #[instrument(skip(self))]
    pub async fn transfer(
        &self,
        from: i64,
        to: i64,
        amount: &str,
    ) -> Result<TransferRecord, TransferError> {
        // 1. Validation (no storage access)
        let source = AccountId::new(from);
        let destination = AccountId::new(to);
        if !source.is_valid() {
            return Err(TransferError::InvalidAccountId(from));
        }
        if !destination.is_valid() {
            return Err(TransferError::InvalidAccountId(to));
        }
        if source == destination {
            warn!("transfer rejected: same account");
            return Err(TransferError::SameAccount);
        }
        let amount = Money::parse_positive(amount, self.config.scale)?;

        // 2. Pre-commit phase
        let phase = self.prepare(source, destination, amount);
        let (tx, record) = match self.config.timeout {
            Some(limit) => match tokio::time::timeout(limit, phase).await {
                Ok(prepared) => prepared?,
                Err(_) => {
                    warn!(timeout_ms = limit.as_millis() as u64, "transfer timed out, rolled back");
                    return Err(TransferError::Timeout);
                }
            },
            None => phase.await?,
        };

        // 3. Commit
        if let Err(e) = tx.commit().await {
            error!(error = %e, "transfer commit failed");
            return Err(TransferError::CommitFailure(e.to_string()));
        }

        info!(
            transfer_id = record.transfer_id,
            amount = %record.amount,
            "transfer committed"
        );
        Ok(record)
    }

    /// Begin, run every write, and hand back the open scope ready to commit
    async fn prepare(
        &self,
        source: AccountId,
        destination: AccountId,
        amount: Money,
    ) -> Result<(S::Tx, TransferRecord), TransferError> {
        let mut tx = self.store.begin().await?;

        match self.apply(&mut tx, source, destination, amount).await {
            Ok(record) => Ok((tx, record)),
            Err(e) => {
                self.abort(tx, &e).await;
                Err(e)
            }
        }
    }

    async fn apply(
        &self,
        tx: &mut S::Tx,
        source: AccountId,
        destination: AccountId,
        amount: Money,
    ) -> Result<TransferRecord, TransferError> {
        let (first, second) = lock_order(source, destination);
        let first_row = self.lock(tx, first, source).await?;
        let second_row = self.lock(tx, second, source).await?;
        debug!(first = %first, second = %second, "rows locked");

        let (mut from_row, mut to_row) = if first == source {
            (first_row, second_row)
        } else {
            (second_row, first_row)
        };

        if from_row.balance < amount {
            return Err(TransferError::InsufficientBalance {
                available: from_row.balance,
                requested: amount,
            });
        }

        let now = Utc::now();
        from_row.debit(amount, now).ok_or(TransferError::Overflow)?;
        to_row.credit(amount, now).ok_or(TransferError::Overflow)?;

        self.store.save_account(tx, &from_row).await?;
        self.store.save_account(tx, &to_row).await?;

        let record = self
            .store
            .append_transfer(
                tx,
                &NewTransfer {
                    source_account_id: source,
                    destination_account_id: destination,
                    amount,
                    created_at: now,
                },
            )
            .await?;
        Ok(record)
    }

    async fn lock(
        &self,
        tx: &mut S::Tx,
        account_id: AccountId,
        source: AccountId,
    ) -> Result<Account, TransferError> {
        self.store
            .get_account_for_update(tx, account_id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound(id) if id == source => TransferError::SourceAccountNotFound(id),
                StoreError::NotFound(id) => TransferError::DestinationAccountNotFound(id),
                other => other.into(),
            })
    }

    async fn abort(&self, tx: S::Tx, cause: &TransferError) {
        if cause.is_rejection() {
            warn!(code = cause.code(), reason = %cause, "transfer rejected, rolling back");
        } else {
            error!(code = cause.code(), reason = %cause, "transfer failed, rolling back");
        }

        // The scope is consumed either way; a failed rollback still drops it
        if let Err(e) = tx.rollback().await {
            warn!(error = %e, "rollback failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::MoneyError;
    use crate::store::{AccountStore, FaultPoint, MemoryStore};

    async fn engine_with(balances: &[(i64, &str)]) -> (TransferEngine<MemoryStore>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        for (id, balance) in balances {
            let account = Account::new(
                AccountId::new(*id),
                Money::parse(balance, DEFAULT_SCALE).unwrap(),
                Utc::now(),
            );
            store.create_account(&account).await.unwrap();
        }
        (
            TransferEngine::new(store.clone(), TransferConfig::default()),
            store,
        )
    }

    async fn balance(store: &MemoryStore, id: i64) -> String {
        store
            .get_account(AccountId::new(id))
            .await
            .unwrap()
            .balance
            .to_string()
    }

    #[test]
    fn test_lock_order_is_ascending() {
        let (a, b) = (AccountId::new(1), AccountId::new(2));
        assert_eq!(lock_order(a, b), (a, b));
        assert_eq!(lock_order(b, a), (a, b));
    }

    #[tokio::test]
    async fn test_simple_transfer() {
        let (engine, store) = engine_with(&[(1, "1000.00"), (2, "200.00")]).await;

        let record = engine.transfer(1, 2, "100.00").await.unwrap();
        assert_eq!(record.source_account_id, AccountId::new(1));
        assert_eq!(record.destination_account_id, AccountId::new(2));
        assert_eq!(record.amount.to_string(), "100.00");

        assert_eq!(balance(&store, 1).await, "900.00");
        assert_eq!(balance(&store, 2).await, "300.00");

        let from = store.get_account(AccountId::new(1)).await.unwrap();
        assert_eq!(from.version, 2);
        assert_eq!(store.transfers().await, vec![record]);
    }

    #[tokio::test]
    async fn test_whole_balance_can_be_moved() {
        let (engine, store) = engine_with(&[(1, "10.00"), (2, "0")]).await;
        engine.transfer(1, 2, "10").await.unwrap();
        assert_eq!(balance(&store, 1).await, "0.00");
        assert_eq!(balance(&store, 2).await, "10.00");
    }

    #[tokio::test]
    async fn test_validation_happens_before_storage() {
        let (engine, store) = engine_with(&[(1, "100.00"), (2, "0")]).await;
        // Any storage access would fail now
        store.inject_fault(FaultPoint::Begin);

        assert_eq!(
            engine.transfer(1, 1, "5.00").await,
            Err(TransferError::SameAccount)
        );
        assert_eq!(
            engine.transfer(0, 2, "5.00").await,
            Err(TransferError::InvalidAccountId(0))
        );
        assert_eq!(
            engine.transfer(1, -2, "5.00").await,
            Err(TransferError::InvalidAccountId(-2))
        );
        assert_eq!(
            engine.transfer(1, 2, "0").await,
            Err(TransferError::InvalidAmount(MoneyError::NotPositive))
        );
        assert_eq!(
            engine.transfer(1, 2, "-5").await,
            Err(TransferError::InvalidAmount(MoneyError::Negative))
        );
        assert!(matches!(
            engine.transfer(1, 2, "1e2").await,
            Err(TransferError::InvalidAmount(MoneyError::InvalidFormat(_)))
        ));
        assert!(matches!(
            engine.transfer(1, 2, "0.001").await,
            Err(TransferError::InvalidAmount(MoneyError::PrecisionOverflow { .. }))
        ));
    }

    #[tokio::test]
    async fn test_missing_accounts_by_role() {
        let (engine, store) = engine_with(&[(5, "100.00")]).await;

        // Missing id locked first (ascending) and second, in both roles
        assert_eq!(
            engine.transfer(9, 5, "1.00").await,
            Err(TransferError::SourceAccountNotFound(AccountId::new(9)))
        );
        assert_eq!(
            engine.transfer(1, 5, "1.00").await,
            Err(TransferError::SourceAccountNotFound(AccountId::new(1)))
        );
        assert_eq!(
            engine.transfer(5, 9, "1.00").await,
            Err(TransferError::DestinationAccountNotFound(AccountId::new(9)))
        );
        assert_eq!(
            engine.transfer(5, 1, "1.00").await,
            Err(TransferError::DestinationAccountNotFound(AccountId::new(1)))
        );

        assert_eq!(balance(&store, 5).await, "100.00");
        assert!(store.transfers().await.is_empty());
    }

    #[tokio::test]
    async fn test_insufficient_balance_leaves_state_unchanged() {
        let (engine, store) = engine_with(&[(1, "900.00"), (2, "300.00")]).await;

        let err = engine.transfer(1, 2, "10000.00").await.unwrap_err();
        assert_eq!(
            err,
            TransferError::InsufficientBalance {
                available: Money::parse("900.00", DEFAULT_SCALE).unwrap(),
                requested: Money::parse("10000.00", DEFAULT_SCALE).unwrap(),
            }
        );

        assert_eq!(balance(&store, 1).await, "900.00");
        assert_eq!(balance(&store, 2).await, "300.00");
        assert_eq!(store.get_account(AccountId::new(1)).await.unwrap().version, 1);
        assert!(store.transfers().await.is_empty());
    }

    #[tokio::test]
    async fn test_overflow_leaves_state_unchanged() {
        // Destination already holds the largest balance representable at scale 2
        let max = "792281625142643375935439503.35";
        let (engine, store) = engine_with(&[(1, "1.00"), (2, max)]).await;

        assert_eq!(
            engine.transfer(1, 2, "0.01").await,
            Err(TransferError::Overflow)
        );

        assert_eq!(balance(&store, 1).await, "1.00");
        assert_eq!(balance(&store, 2).await, max);
        assert_eq!(store.get_account(AccountId::new(2)).await.unwrap().version, 1);
        assert!(store.transfers().await.is_empty());

        // Rows were unlocked by the rollback
        engine.transfer(2, 1, "0.01").await.unwrap();
        assert_eq!(balance(&store, 1).await, "1.01");
    }

    #[tokio::test]
    async fn test_scale_follows_config() {
        let store = Arc::new(MemoryStore::new());
        for id in [1, 2] {
            let account = Account::new(
                AccountId::new(id),
                Money::parse("1", 3).unwrap(),
                Utc::now(),
            );
            store.create_account(&account).await.unwrap();
        }
        let engine = TransferEngine::new(
            store.clone(),
            TransferConfig {
                scale: 3,
                timeout: None,
            },
        );

        let record = engine.transfer(1, 2, "0.125").await.unwrap();
        assert_eq!(record.amount.to_string(), "0.125");
        assert_eq!(balance(&store, 1).await, "0.875");
    }
}
