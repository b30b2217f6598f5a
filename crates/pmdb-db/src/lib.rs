//! Postgres storage for extracted product records.
//!
//! [`pool`] opens connections from [`pmdb_core::AppConfig`], [`schema`] owns
//! the migrations and the health check, and [`products`] holds the queries.

pub mod pool;
pub mod products;
pub mod schema;

pub use pool::{connect_pool, connect_pool_from_config, ping, PoolConfig};
pub use products::{
    count_products, get_product_by_url, search_products, upsert_product, validate_record,
    ProductRow, ProductSearch, MAX_PRICE,
};
pub use schema::{health_check, run_migrations};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("DATABASE_URL is not set")]
    MissingDatabaseUrl,
    #[error("invalid product record: {0}")]
    InvalidRecord(String),
    #[error("the products table does not exist; run `pmdb-cli db migrate` first")]
    NotMigrated,
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}
