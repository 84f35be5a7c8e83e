//! internal_transfer - account and transfer service
//!
//! Usage:
//!   internal_transfer [--env dev] [--port 8080]
//!
//! With `postgres_url` configured (or `INTERNAL_TRANSFER_POSTGRES_URL` set) the
//! service runs on PostgreSQL; otherwise it falls back to the in-memory store.

use std::sync::Arc;

use internal_transfer::bank::{Bank, BankApi};
use internal_transfer::config::AppConfig;
use internal_transfer::db::Database;
use internal_transfer::store::{MemoryStore, PgStore};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let mut app_config = AppConfig::load(&env)?;
    if let Some(port) = get_port_override() {
        app_config.gateway.port = port;
    }
    let _log_guard = internal_transfer::logging::init_logging(&app_config);

    tracing::info!("Starting internal_transfer in {} mode", env);

    let transfer_config = app_config.transfer_config();
    let bank: Arc<dyn BankApi> = match &app_config.postgres_url {
        Some(url) => {
            let db = Database::connect(url, &app_config.database).await?;
            db.migrate().await?;
            let store = PgStore::new(db.pool().clone(), transfer_config.scale);
            tracing::info!("✅ PostgreSQL store ready");
            Arc::new(Bank::new(Arc::new(store), transfer_config))
        }
        None => {
            tracing::warn!("⚠️  No postgres_url configured, using in-memory store (data is not durable)");
            Arc::new(Bank::new(Arc::new(MemoryStore::new()), transfer_config))
        }
    };

    internal_transfer::gateway::run_server(&app_config.gateway, bank).await
}
