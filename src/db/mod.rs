//! Database connection management

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use crate::config::DatabaseConfig;
use crate::store::schema;

/// PostgreSQL database connection pool
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool, retrying failed attempts
    pub async fn connect(database_url: &str, config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let attempts = config.connect_retries.max(1);
        let mut attempt = 1;
        loop {
            match Self::pool_options(config).connect(database_url).await {
                Ok(pool) => {
                    tracing::info!(
                        max_connections = config.max_connections,
                        "PostgreSQL connection pool established"
                    );
                    return Ok(Self { pool });
                }
                Err(e) if attempt < attempts => {
                    tracing::warn!(
                        "PostgreSQL not reachable (attempt {}/{}): {}. Retrying in {}ms...",
                        attempt,
                        attempts,
                        e,
                        config.retry_delay_ms
                    );
                    tokio::time::sleep(Duration::from_millis(config.retry_delay_ms)).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!("PostgreSQL connection failed after {} attempts: {}", attempts, e);
                    return Err(e);
                }
            }
        }
    }

    fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_millis(config.acquire_timeout_ms))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health
    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Create tables and indexes if they do not exist
    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        schema::init_schema(&self.pool).await
    }
}
