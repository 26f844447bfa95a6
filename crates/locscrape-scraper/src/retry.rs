//! Retry with exponential backoff for page fetches.
//!
//! Transient failures (network errors, HTTP 429, HTTP 5xx) are retried.
//! Everything else is returned immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::FetchError;

/// Returns `true` if `err` is worth another attempt after a delay.
///
/// Retriable:
/// - [`FetchError::Http`]: connection reset, timeout, TLS hiccup.
/// - [`FetchError::RateLimited`]: HTTP 429.
/// - [`FetchError::UnexpectedStatus`] with a 5xx status.
///
/// 4xx statuses, short bodies, bad URLs and browser failures are final.
fn is_retriable(err: &FetchError) -> bool {
    match err {
        FetchError::Http(_) | FetchError::RateLimited { .. } => true,
        FetchError::UnexpectedStatus { status, .. } => *status >= 500,
        _ => false,
    }
}

/// Executes `operation`, retrying transient errors with exponential backoff.
///
/// The wait before the n-th retry is `backoff_base_ms * 2^(n-1)` milliseconds.
/// With `max_retries = 2` the operation runs at most 3 times. Non-retriable
/// errors are returned without sleeping.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
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

        // Cap the shift so extreme configs saturate instead of overflowing.
        let delay_ms = backoff_base_ms.saturating_mul(1u64 << attempt.min(62));
        tracing::warn!(
            attempt,
            max_retries,
            delay_ms,
            error = %err,
            "transient fetch error, retrying after backoff"
        );
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        attempt += 1;
    }
}
