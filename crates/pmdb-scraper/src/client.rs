//! HTTP client for catalog product pages.

use std::time::Duration;

use reqwest::{Client, StatusCode};

use crate::error::ScraperError;
use crate::rate_limit::retry_with_delay;

/// Statuses the catalog uses for product ids that do not exist or were
/// removed. These are reported as a missing page rather than an error.
const MISSING_PAGE_STATUSES: [StatusCode; 3] = [
    StatusCode::NOT_FOUND,
    StatusCode::GONE,
    StatusCode::INTERNAL_SERVER_ERROR,
];

/// Fetches catalog product pages as HTML text.
///
/// Transient errors (429, 5xx other than 500, network failures) are retried
/// with a fixed delay up to `max_retries` additional attempts.
pub struct PageClient {
    client: Client,
    max_retries: u32,
    retry_delay_secs: u64,
}

impl PageClient {
    /// Creates a `PageClient` with configured timeout, `User-Agent`, and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        retry_delay_secs: u64,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            retry_delay_secs,
        })
    }

    /// Fetches one product page.
    ///
    /// Returns `Ok(None)` when the catalog answers 404, 410 or 500, which it
    /// does for unknown or deleted product ids.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidUrl`]: `url` is not an absolute http(s) URL.
    /// - [`ScraperError::RateLimited`]: HTTP 429 after all retries.
    /// - [`ScraperError::UnexpectedStatus`]: any other non-2xx status.
    /// - [`ScraperError::Http`]: network or body read failure after all retries.
    pub async fn fetch_page(&self, url: &str) -> Result<Option<String>, ScraperError> {
        let parsed = validate_page_url(url)?;

        retry_with_delay(self.max_retries, self.retry_delay_secs, || {
            let parsed = parsed.clone();
            async move {
                let response = self
                    .client
                    .get(parsed.clone())
                    .header(
                        reqwest::header::ACCEPT,
                        "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
                    )
                    .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.5")
                    .send()
                    .await?;
                let status = response.status();

                if status == StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);
                    return Err(ScraperError::RateLimited {
                        url: parsed.to_string(),
                        retry_after_secs,
                    });
                }

                if MISSING_PAGE_STATUSES.contains(&status) {
                    return Ok(None);
                }

                if !status.is_success() {
                    return Err(ScraperError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: parsed.to_string(),
                    });
                }

                let body = response.text().await?;
                Ok(Some(body))
            }
        })
        .await
    }
}

/// Parses `url` and rejects anything that is not an absolute http(s) URL.
fn validate_page_url(url: &str) -> Result<reqwest::Url, ScraperError> {
    let parsed = reqwest::Url::parse(url).map_err(|e| ScraperError::InvalidUrl {
        url: url.to_owned(),
        reason: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ScraperError::InvalidUrl {
            url: url.to_owned(),
            reason: format!("unsupported scheme \"{}\"", parsed.scheme()),
        });
    }
    Ok(parsed)
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
