use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;

use crate::money::{DEFAULT_SCALE, MAX_SCALE};
use crate::transfer::TransferConfig;

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "INTERNAL_TRANSFER";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    /// PostgreSQL connection URL; the in-memory store is used when absent
    #[serde(default)]
    pub postgres_url: Option<String>,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub money: MoneyConfig,
    #[serde(default)]
    pub transfer: TransferSettings,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

/// Connection pool settings
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_ms: u64,
    pub max_lifetime_secs: u64,
    pub connect_retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            max_connections: 50,
            min_connections: 10,
            acquire_timeout_ms: 5000,
            max_lifetime_secs: 1800,
            connect_retries: 3,
            retry_delay_ms: 2000,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct MoneyConfig {
    /// Fractional digits of the currency's minor unit
    pub scale: u32,
}

impl Default for MoneyConfig {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct TransferSettings {
    /// Limit on a transfer's pre-commit phase, 0 = no limit
    pub timeout_ms: u64,
}

impl Default for TransferSettings {
    fn default() -> Self {
        Self { timeout_ms: 5000 }
    }
}

impl AppConfig {
    /// Load `config/{env}.yaml`, apply environment overrides and validate
    pub fn load(env: &str) -> anyhow::Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path))?;
        let mut config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config yaml: {}", config_path))?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Apply `INTERNAL_TRANSFER_*` overrides read through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(&format!("{ENV_PREFIX}_POSTGRES_URL")) {
            self.postgres_url = if url.trim().is_empty() { None } else { Some(url) };
        }
        if let Some(port) = lookup(&format!("{ENV_PREFIX}_PORT")) {
            self.gateway.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid {ENV_PREFIX}_PORT: {port}"))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.money.scale > MAX_SCALE {
            bail!("money.scale {} exceeds max {}", self.money.scale, MAX_SCALE);
        }
        if self.gateway.port == 0 {
            bail!("gateway.port must be non-zero");
        }
        if self.database.max_connections < self.database.min_connections {
            bail!(
                "database.max_connections ({}) < min_connections ({})",
                self.database.max_connections,
                self.database.min_connections
            );
        }
        Ok(())
    }

    /// Engine settings derived from `money` and `transfer`
    pub fn transfer_config(&self) -> TransferConfig {
        TransferConfig {
            scale: self.money.scale,
            timeout: match self.transfer.timeout_ms {
                0 => None,
                ms => Some(Duration::from_millis(ms)),
            },
        }
    }
}
