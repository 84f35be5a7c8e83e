//! PostgreSQL Store
//!
//! `sqlx::Transaction` is the transaction scope: sqlx rolls it back when it
//! is dropped uncommitted. Row locks are taken with `SELECT ... FOR UPDATE`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::{Postgres, Row, Transaction};

use super::{AccountStore, LedgerStore, StoreError, TransactionScope, TransactionalStore};
use crate::account::{Account, AccountId};
use crate::money::Money;
use crate::transfer::types::{NewTransfer, TransferRecord};

const ACCOUNT_COLUMNS: &str = "account_id, balance, version, created_at, updated_at";
const TRANSFER_COLUMNS: &str =
    "transfer_id, source_account_id, destination_account_id, amount, created_at";

/// Account + ledger store on a PostgreSQL pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    scale: u32,
}

impl PgStore {
    /// `scale` is used to re-validate every money value read back
    pub fn new(pool: PgPool, scale: u32) -> Self {
        Self { pool, scale }
    }

    fn account_from_row(&self, row: &PgRow) -> Result<Account, StoreError> {
        let account_id: i64 = row.try_get("account_id")?;
        let balance: Decimal = row.try_get("balance")?;
        let version: i64 = row.try_get("version")?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;
        let updated_at: DateTime<Utc> = row.try_get("updated_at")?;

        let balance = Money::from_decimal(balance, self.scale).map_err(|e| {
            StoreError::Corrupted(format!("accounts_tb.balance for {account_id}: {e}"))
        })?;

        Ok(Account {
            account_id: AccountId::new(account_id),
            balance,
            version,
            created_at,
            updated_at,
        })
    }

    fn transfer_from_row(&self, row: &PgRow) -> Result<TransferRecord, StoreError> {
        let transfer_id: i64 = row.try_get("transfer_id")?;
        let source: i64 = row.try_get("source_account_id")?;
        let destination: i64 = row.try_get("destination_account_id")?;
        let amount: Decimal = row.try_get("amount")?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;

        let amount = Money::from_decimal(amount, self.scale).map_err(|e| {
            StoreError::Corrupted(format!("transfers_tb.amount for {transfer_id}: {e}"))
        })?;

        Ok(TransferRecord {
            transfer_id,
            source_account_id: AccountId::new(source),
            destination_account_id: AccountId::new(destination),
            amount,
            created_at,
        })
    }
}

/// Transaction scope for [`PgStore`]
pub struct PgTx(Transaction<'static, Postgres>);

#[async_trait]
impl TransactionScope for PgTx {
    async fn commit(self) -> Result<(), StoreError> {
        self.0.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        self.0.rollback().await?;
        Ok(())
    }
}

#[async_trait]
impl TransactionalStore for PgStore {
    type Tx = PgTx;

    async fn begin(&self) -> Result<PgTx, StoreError> {
        Ok(PgTx(self.pool.begin().await?))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl AccountStore for PgStore {
    async fn create_account(&self, account: &Account) -> Result<(), StoreError> {
        let result = sqlx::query(
            "INSERT INTO accounts_tb (account_id, balance, version, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (account_id) DO NOTHING",
        )
        .bind(account.account_id.get())
        .bind(account.balance.as_decimal())
        .bind(account.version)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::DuplicateAccount(account.account_id));
        }
        Ok(())
    }

    async fn get_account(&self, account_id: AccountId) -> Result<Account, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts_tb WHERE account_id = $1"
        ))
        .bind(account_id.get())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound(account_id))?;

        self.account_from_row(&row)
    }

    async fn get_account_for_update(
        &self,
        tx: &mut PgTx,
        account_id: AccountId,
    ) -> Result<Account, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts_tb WHERE account_id = $1 FOR UPDATE"
        ))
        .bind(account_id.get())
        .fetch_optional(&mut *tx.0)
        .await?
        .ok_or(StoreError::NotFound(account_id))?;

        tracing::trace!(account_id = %account_id, "row locked (FOR UPDATE)");
        self.account_from_row(&row)
    }

    async fn save_account(&self, tx: &mut PgTx, account: &Account) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE accounts_tb SET balance = $2, version = $3, updated_at = $4
             WHERE account_id = $1",
        )
        .bind(account.account_id.get())
        .bind(account.balance.as_decimal())
        .bind(account.version)
        .bind(account.updated_at)
        .execute(&mut *tx.0)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(account.account_id));
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for PgStore {
    async fn append_transfer(
        &self,
        tx: &mut PgTx,
        transfer: &NewTransfer,
    ) -> Result<TransferRecord, StoreError> {
        let row = sqlx::query(
            "INSERT INTO transfers_tb (source_account_id, destination_account_id, amount, created_at)
             VALUES ($1, $2, $3, $4)
             RETURNING transfer_id",
        )
        .bind(transfer.source_account_id.get())
        .bind(transfer.destination_account_id.get())
        .bind(transfer.amount.as_decimal())
        .bind(transfer.created_at)
        .fetch_one(&mut *tx.0)
        .await?;

        let transfer_id: i64 = row.try_get("transfer_id")?;
        Ok(TransferRecord::from_new(transfer_id, transfer))
    }

    async fn list_transfers(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<TransferRecord>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {TRANSFER_COLUMNS} FROM transfers_tb
             WHERE source_account_id = $1 OR destination_account_id = $1
             ORDER BY transfer_id"
        ))
        .bind(account_id.get())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(|row| self.transfer_from_row(row)).collect()
    }
}
