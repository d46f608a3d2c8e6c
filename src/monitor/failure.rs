//! Failure classification and backoff curves for the retry controller.

use std::time::Duration;

use crate::fetcher::FetchError;

/// How a failed fetch attempt should be handled.
///
/// - `ConnectionLost` short-circuits retries toward a full restart
/// - `Transient` retries in place on the generic budget
/// - `Unknown` is treated conservatively as retryable on the generic budget,
///   never escalated before that budget is exhausted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transient,
    ConnectionLost,
    Unknown,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            FailureKind::Transient => "transient",
            FailureKind::ConnectionLost => "connection-lost",
            FailureKind::Unknown => "unknown",
        };
        write!(f, "{label}")
    }
}

/// Classify a fetch error. Total: every error maps to exactly one kind.
pub fn classify(error: &FetchError) -> FailureKind {
    match error {
        FetchError::ConnectionLost(_) => FailureKind::ConnectionLost,
        FetchError::Timeout(_) | FetchError::MissingContent(_) => FailureKind::Transient,
        FetchError::Other(_) => FailureKind::Unknown,
    }
}

/// Exponential backoff for generic failures: `base * 2^(attempt-1)`.
///
/// With base=5s: attempt 1 → 5s, attempt 2 → 10s, attempt 3 → 20s.
pub fn transient_backoff(attempt: u32, base: Duration) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }
    let multiplier = 2u32.saturating_pow(attempt - 1);
    base.saturating_mul(multiplier)
}

/// Linear backoff for connection-level failures: `base * attempt`.
///
/// Connection loss escalates quickly anyway, so the wait only needs to
/// stretch linearly before the restart decision is reached.
pub fn connection_backoff(attempt: u32, base: Duration) -> Duration {
    base.saturating_mul(attempt)
}
