//! `search`: query stored products.

use pmdb_core::ProductRecord;
use pmdb_db::ProductSearch;

/// Prints the products matching `search` as a pretty JSON array.
///
/// # Errors
///
/// Returns an error if the query fails.
pub(crate) async fn run_search(
    pool: &sqlx::PgPool,
    search: &ProductSearch<'_>,
) -> anyhow::Result<()> {
    let rows = pmdb_db::search_products(pool, search).await?;
    tracing::debug!(matches = rows.len(), "search complete");

    let records: Vec<ProductRecord> = rows
        .into_iter()
        .map(pmdb_db::ProductRow::into_record)
        .collect();
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}
