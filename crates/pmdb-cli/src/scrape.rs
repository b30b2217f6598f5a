//! Page-range crawl: fetch, extract, save and export product pages one at a
//! time.
//!
//! Missing pages and pages that fail to fetch, extract or save are logged
//! and skipped so one bad id does not abort the run. A record that could not
//! be saved is left out of the export too.

use std::time::Duration;

use chrono::Utc;
use pmdb_core::{AppConfig, ProductRecord};
use pmdb_scraper::{extract_product_from_html, product_page_url, PageClient};

use crate::export::JsonlExporter;

/// What to crawl and where the results go.
#[derive(Debug)]
pub(crate) struct ScrapeOptions {
    pub start: u64,
    pub end: u64,
    pub export: Option<JsonlExporter>,
}

/// Per-run counters, printed when the crawl finishes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ScrapeTotals {
    pub extracted: usize,
    pub saved: usize,
    pub exported: usize,
    pub missing: usize,
    pub failed: usize,
}

/// Returns `true` when the crawl should take its long pause after the page at
/// zero-based `index`.
fn batch_boundary(index: usize, batch_size: usize) -> bool {
    batch_size > 0 && (index + 1) % batch_size == 0
}

/// Crawls product ids `start..=end` in order.
///
/// With `pool` set each extracted record is upserted; `None` is a dry run
/// that only extracts (and exports, if requested). Export rows are flushed at
/// every batch boundary and once more at the end.
///
/// # Errors
///
/// Returns an error if the id range is empty, the page client cannot be
/// built, or the export file cannot be written.
pub(crate) async fn run_scrape(
    pool: Option<&sqlx::PgPool>,
    config: &AppConfig,
    options: &ScrapeOptions,
) -> anyhow::Result<ScrapeTotals> {
    if options.start > options.end {
        anyhow::bail!(
            "invalid id range: start {} is greater than end {}",
            options.start,
            options.end
        );
    }

    let client = PageClient::new(
        config.scraper_request_timeout_secs,
        &config.scraper_user_agent,
        config.scraper_max_retries,
        config.scraper_retry_delay_secs,
    )
    .map_err(|e| anyhow::anyhow!("failed to build page client: {e}"))?;

    let inter_request_delay = Duration::from_millis(config.scraper_inter_request_delay_ms);
    let batch_pause = Duration::from_secs(config.scraper_batch_pause_secs);

    let mut totals = ScrapeTotals::default();
    let mut pending_export: Vec<ProductRecord> = Vec::new();

    tracing::info!(
        start = options.start,
        end = options.end,
        dry_run = pool.is_none(),
        "starting catalog crawl"
    );

    for (index, product_id) in (options.start..=options.end).enumerate() {
        if index > 0 && !inter_request_delay.is_zero() {
            tokio::time::sleep(inter_request_delay).await;
        }

        if let Some(record) = scrape_one(&client, config, product_id, &mut totals).await? {
            let kept = match pool {
                Some(pool) => save_one(pool, product_id, &record, &mut totals).await,
                None => true,
            };
            if kept && options.export.is_some() {
                pending_export.push(record);
            }
        }

        if batch_boundary(index, config.scraper_batch_size) && product_id < options.end {
            if let Some(exporter) = &options.export {
                totals.exported += exporter.append_rows(&pending_export)?;
                pending_export.clear();
            }
            tracing::info!(
                processed = index + 1,
                pause_secs = batch_pause.as_secs(),
                "batch complete, pausing"
            );
            tokio::time::sleep(batch_pause).await;
        }
    }

    if let Some(exporter) = &options.export {
        totals.exported += exporter.append_rows(&pending_export)?;
        tracing::info!(path = %exporter.path().display(), rows = totals.exported, "export written");
    }

    tracing::info!(
        extracted = totals.extracted,
        saved = totals.saved,
        missing = totals.missing,
        failed = totals.failed,
        "catalog crawl finished"
    );

    Ok(totals)
}

/// Upserts one record. Returns `false` if the write failed; the failure is
/// logged and counted in `totals`.
async fn save_one(
    pool: &sqlx::PgPool,
    product_id: u64,
    record: &ProductRecord,
    totals: &mut ScrapeTotals,
) -> bool {
    match pmdb_db::upsert_product(pool, record).await {
        Ok(id) => {
            tracing::debug!(product_id, row_id = id, "saved product");
            totals.saved += 1;
            true
        }
        Err(e) => {
            tracing::warn!(product_id, url = %record.url, error = %e, "save failed, skipping");
            totals.failed += 1;
            false
        }
    }
}

/// Fetches and extracts one product page. Returns `Ok(None)` for pages that
/// were missing or could not be processed; those are counted in `totals`.
async fn scrape_one(
    client: &PageClient,
    config: &AppConfig,
    product_id: u64,
    totals: &mut ScrapeTotals,
) -> anyhow::Result<Option<ProductRecord>> {
    let url = product_page_url(&config.catalog_base_url, product_id)?;

    let html = match client.fetch_page(&url).await {
        Ok(Some(html)) => html,
        Ok(None) => {
            tracing::info!(product_id, url = %url, "page missing, skipping");
            totals.missing += 1;
            return Ok(None);
        }
        Err(e) => {
            tracing::warn!(product_id, url = %url, error = %e, "fetch failed, skipping");
            totals.failed += 1;
            return Ok(None);
        }
    };

    let extraction = match extract_product_from_html(&html, &url) {
        Ok(extraction) => extraction,
        Err(e) => {
            tracing::warn!(product_id, url = %url, error = %e, "extraction failed, skipping");
            totals.failed += 1;
            return Ok(None);
        }
    };

    for warning in &extraction.warnings {
        tracing::warn!(product_id, url = %url, %warning, "data quality warning");
    }
    tracing::debug!(product_id, name = %extraction.record.name, "extracted product");
    totals.extracted += 1;

    Ok(Some(extraction.record.stamped(Utc::now())))
}
