//! Content fetching seam.
//!
//! The scheduler only sees the `ContentFetcher` trait; the concrete TikTok
//! implementation lives in [`tiktok`]. `FetchError` carries enough shape for
//! the failure classifier to pick a retry strategy without string matching
//! at the call site.

pub mod tiktok;

use crate::models::Item;
use thiserror::Error;

/// Errors raised by a fetch attempt.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request or page load exceeded its deadline. Retryable in place.
    #[error("fetch timed out: {0}")]
    Timeout(String),

    /// The page loaded but the expected content was not there (no Reposts
    /// tab, empty page, layout change). Retryable in place.
    #[error("expected content missing: {0}")]
    MissingContent(String),

    /// The underlying session handle is stale or the connection dropped
    /// mid-operation. Short-circuits retries toward a restart.
    #[error("session connection lost: {0}")]
    ConnectionLost(String),

    /// Anything else. Treated as retryable on the generic budget rather
    /// than escalated immediately.
    #[error("fetch failed: {0}")]
    Other(String),
}

/// Retrieves the current collection of repost items.
///
/// Must be safe to call repeatedly on the same open session; the scheduler
/// reuses one session across cycles and only tears it down on restart.
pub trait ContentFetcher {
    fn fetch(&mut self) -> Result<Vec<Item>, FetchError>;
}
