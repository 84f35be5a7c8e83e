//! PostgreSQL schema for accounts and the transfer ledger
//!
//! Every statement is idempotent so it can run on each start-up.

use sqlx::PgPool;

/// Apply all schema statements in order
pub async fn init_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Initializing PostgreSQL schema...");

    for statement in SCHEMA_STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }

    tracing::info!("PostgreSQL schema ready ({} statements)", SCHEMA_STATEMENTS.len());
    Ok(())
}

pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_ACCOUNTS_TABLE,
    CREATE_TRANSFERS_TABLE,
    CREATE_TRANSFERS_SOURCE_INDEX,
    CREATE_TRANSFERS_DESTINATION_INDEX,
];

/// Balances are exact NUMERIC; the CHECK is a last line of defence behind
/// the engine's sufficiency check.
const CREATE_ACCOUNTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS accounts_tb (
    account_id  BIGINT PRIMARY KEY,
    balance     NUMERIC NOT NULL CHECK (balance >= 0),
    version     BIGINT NOT NULL DEFAULT 1,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

/// Append-only ledger; rows are never updated or deleted
const CREATE_TRANSFERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS transfers_tb (
    transfer_id             BIGSERIAL PRIMARY KEY,
    source_account_id       BIGINT NOT NULL REFERENCES accounts_tb (account_id),
    destination_account_id  BIGINT NOT NULL REFERENCES accounts_tb (account_id),
    amount                  NUMERIC NOT NULL CHECK (amount > 0),
    created_at              TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CHECK (source_account_id <> destination_account_id)
)
"#;

const CREATE_TRANSFERS_SOURCE_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_transfers_source
    ON transfers_tb (source_account_id)
"#;

const CREATE_TRANSFERS_DESTINATION_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_transfers_destination
    ON transfers_tb (destination_account_id)
"#;
