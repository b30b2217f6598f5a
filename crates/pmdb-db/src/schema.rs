//! Migrations and schema health.

use sqlx::PgPool;

use crate::pool::ping;
use crate::DbError;

// Relative to this crate's Cargo.toml: the workspace-level migrations/ directory.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

/// Successful rows in `_sqlx_migrations`, or zero before the first migration
/// has created that table.
async fn applied_migration_count(pool: &PgPool) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _sqlx_migrations WHERE success")
        .fetch_one(pool)
        .await
        .unwrap_or(0)
}

/// Applies every migration under `migrations/` that the database has not seen
/// and returns how many ran. Running it again on an up-to-date database
/// returns 0.
///
/// # Errors
///
/// Returns [`sqlx::migrate::MigrateError`] if a migration fails or an applied
/// migration was edited after the fact.
pub async fn run_migrations(pool: &PgPool) -> Result<usize, sqlx::migrate::MigrateError> {
    let before = applied_migration_count(pool).await;
    MIGRATOR.run(pool).await?;
    let after = applied_migration_count(pool).await;

    Ok(usize::try_from(after.saturating_sub(before)).unwrap_or(0))
}

/// Confirms the pool can run a query and that the `products` table exists.
///
/// # Errors
///
/// [`DbError::Sqlx`] if no connection can be used, or
/// [`DbError::NotMigrated`] if the schema has not been created yet.
pub async fn health_check(pool: &PgPool) -> Result<(), DbError> {
    ping(pool).await?;

    let has_products: bool =
        sqlx::query_scalar("SELECT to_regclass('public.products') IS NOT NULL")
            .fetch_one(pool)
            .await?;
    if has_products {
        Ok(())
    } else {
        Err(DbError::NotMigrated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_embedded() {
        let versions: Vec<i64> = MIGRATOR.iter().map(|m| m.version).collect();
        assert!(!versions.is_empty());
        assert!(versions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn not_migrated_error_names_the_fix() {
        assert!(DbError::NotMigrated.to_string().contains("db migrate"));
    }
}
