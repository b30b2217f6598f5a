//! Connection pool setup.

use std::time::Duration;

use pmdb_core::AppConfig;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::DbError;

/// Pool sizing and the time a caller waits for a free connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
            acquire_timeout_secs: 10,
        }
    }
}

impl PoolConfig {
    /// Takes the `PMDB_DB_*` values already validated by the config loader.
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            max_connections: config.db_max_connections,
            min_connections: config.db_min_connections,
            acquire_timeout_secs: config.db_acquire_timeout_secs,
        }
    }

    fn options(self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(Duration::from_secs(self.acquire_timeout_secs))
    }
}

/// Opens a pool against `database_url` and waits for the first connection.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if Postgres cannot be reached or rejects the login.
pub async fn connect_pool(database_url: &str, config: PoolConfig) -> Result<PgPool, sqlx::Error> {
    config.options().connect(database_url).await
}

/// [`connect_pool`] with the URL and sizing taken from `config`.
///
/// # Errors
///
/// [`DbError::MissingDatabaseUrl`] when no `DATABASE_URL` was configured,
/// otherwise [`DbError::Sqlx`] from the connection attempt.
pub async fn connect_pool_from_config(config: &AppConfig) -> Result<PgPool, DbError> {
    let Some(database_url) = config.database_url.as_deref() else {
        return Err(DbError::MissingDatabaseUrl);
    };
    Ok(connect_pool(database_url, PoolConfig::from_app_config(config)).await?)
}

/// Runs `SELECT 1` on a pooled connection.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if no connection could be acquired or the query
/// failed.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
