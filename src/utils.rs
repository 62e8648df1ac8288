//! Retry and text helpers.

use anyhow::Result;
use std::time::Duration;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::Retry;
use tracing::warn;
use unicode_segmentation::UnicodeSegmentation;

/// Retries a Telegram API operation with exponential backoff and jitter.
///
/// Backoff parameters come from [`crate::config`]. The last error is
/// returned once the attempt budget is exhausted.
///
/// # Errors
///
/// Returns the final error after all retries fail.
pub async fn retry_telegram_operation<F, Fut, T>(operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    use crate::config::{
        TELEGRAM_API_INITIAL_BACKOFF_MS, TELEGRAM_API_MAX_BACKOFF_MS, TELEGRAM_API_MAX_RETRIES,
    };

    let retry_strategy = ExponentialBackoff::from_millis(TELEGRAM_API_INITIAL_BACKOFF_MS)
        .max_delay(Duration::from_millis(TELEGRAM_API_MAX_BACKOFF_MS))
        .map(jitter) // Jitter to prevent thundering herd
        .take(TELEGRAM_API_MAX_RETRIES);

    Retry::spawn(retry_strategy, operation).await.map_err(|e| {
        warn!(
            "Telegram API operation failed after {} attempts: {}",
            TELEGRAM_API_MAX_RETRIES, e
        );
        e
    })
}

/// Truncates a string to at most `limit` grapheme clusters, never
/// splitting inside a cluster.
#[must_use]
pub fn truncate_str(s: &str, limit: usize) -> &str {
    match s.grapheme_indices(true).nth(limit) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
