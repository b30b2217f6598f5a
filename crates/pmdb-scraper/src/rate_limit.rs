//! Fixed-delay retry for catalog page fetches.
//!
//! Transient failures (rate limiting, network errors, 5xx responses) are
//! retried after a constant pause. Anything else is returned immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

/// Returns `true` if `err` is worth another attempt.
///
/// Retriable:
/// - [`ScraperError::RateLimited`]: HTTP 429.
/// - [`ScraperError::Http`]: connection reset, timeout, TLS hiccup.
/// - [`ScraperError::UnexpectedStatus`] with a 5xx status.
///
/// 4xx statuses and invalid URLs will fail the same way on every attempt.
fn is_retriable(err: &ScraperError) -> bool {
    match err {
        ScraperError::RateLimited { .. } | ScraperError::Http(_) => true,
        ScraperError::UnexpectedStatus { status, .. } => *status >= 500,
        ScraperError::InvalidUrl { .. } => false,
    }
}

/// Seconds to wait before the next attempt. A server-provided `Retry-After`
/// wins when it asks for longer than the configured delay.
fn delay_for(err: &ScraperError, delay_secs: u64) -> u64 {
    match err {
        ScraperError::RateLimited {
            retry_after_secs, ..
        } => delay_secs.max(*retry_after_secs),
        _ => delay_secs,
    }
}

/// Executes `operation`, retrying up to `max_retries` additional times on
/// transient errors with a fixed `delay_secs` pause between attempts.
///
/// With `max_retries = 3` the operation runs at most 4 times. The last error
/// is returned once retries are exhausted.
pub(crate) async fn retry_with_delay<T, F, Fut>(
    max_retries: u32,
    delay_secs: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !is_retriable(&err) || attempt >= max_retries {
            return Err(err);
        }

        attempt += 1;
        let wait_secs = delay_for(&err, delay_secs);
        tracing::warn!(
            attempt,
            max_retries,
            wait_secs,
            error = %err,
            "transient fetch error, retrying"
        );
        tokio::time::sleep(Duration::from_secs(wait_secs)).await;
    }
}
