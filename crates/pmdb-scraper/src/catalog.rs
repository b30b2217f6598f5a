//! Catalog product page addressing.
//!
//! Product detail pages are numbered: `{base}/{id}`, e.g.
//! `https://www.penguinmagic.com/p/10016`.

use crate::error::ScraperError;

/// Builds the detail page URL for `product_id` under `base_url`.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidUrl`] if `base_url` is not an absolute
/// http(s) URL.
pub fn product_page_url(base_url: &str, product_id: u64) -> Result<String, ScraperError> {
    let base = base_url.trim().trim_end_matches('/');
    let parsed = reqwest::Url::parse(base).map_err(|e| ScraperError::InvalidUrl {
        url: base_url.to_owned(),
        reason: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ScraperError::InvalidUrl {
            url: base_url.to_owned(),
            reason: format!("unsupported scheme \"{}\"", parsed.scheme()),
        });
    }
    Ok(format!("{base}/{product_id}"))
}
