//! internal_transfer - Atomic Funds Transfer Service
//!
//! Moves money between account balances with atomicity, isolation and
//! conservation guarantees under concurrent access.
//!
//! # Modules
//!
//! - [`money`] - Exact decimal money type
//! - [`account`] - Account records and lifecycle (create, read)
//! - [`transfer`] - Transfer engine and ledger records
//! - [`store`] - Storage traits, in-memory and PostgreSQL stores
//! - [`bank`] - Object-safe facade wiring a store to the services
//! - [`db`] - PostgreSQL pool bootstrap
//! - [`config`] - YAML configuration
//! - [`logging`] - tracing subscriber setup
//! - [`gateway`] - HTTP API

// Core types - must be first!
pub mod money;

// Domain
pub mod account;
pub mod store;
pub mod transfer;

pub mod bank;

// Infrastructure
pub mod config;
pub mod db;
pub mod gateway;
pub mod logging;

// Convenient re-exports at crate root
pub use account::{Account, AccountError, AccountId, AccountService};
pub use bank::{Bank, BankApi};
pub use money::{Money, MoneyError};
pub use store::{BankStore, MemoryStore, PgStore, StoreError};
pub use transfer::{TransferConfig, TransferEngine, TransferError, TransferRecord};
