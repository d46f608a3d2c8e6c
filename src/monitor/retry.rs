//! Per-cycle retry state machine.
//!
//! Drives one polling attempt through bounded retries with backoff and
//! decides whether the cycle succeeded, should be written off, or must
//! escalate to a full process restart.

use std::sync::atomic::AtomicBool;
use std::time::Duration;

use crate::fetcher::FetchError;
use crate::logging::EventLog;
use crate::models::constants::{CONNECTION_FAILURE_THRESHOLD, GENERIC_FAILURE_THRESHOLD};
use crate::models::Item;
use crate::monitor::failure::{classify, connection_backoff, transient_backoff, FailureKind};
use crate::monitor::sleep_unless_stopped;

/// Result of one scheduler iteration, consumed to decide sleep-vs-restart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The cycle body completed; carries the newly detected items.
    Success(Vec<Item>),
    /// The generic retry budget ran out without hitting an escalation
    /// threshold. The scheduler treats this as a restart request too, but
    /// the distinction keeps the log stream and tests honest.
    RetryExhausted,
    /// Failure streak or connection corruption; tear down and let the
    /// supervisor relaunch the process.
    RestartRequired,
}

/// Retry limits for one cycle. Both values are validated to be >= 1 at
/// configuration load time.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

/// Wraps the cycle body in retry/backoff/escalation logic.
///
/// The consecutive-failure counter lives here and persists across cycles for
/// the lifetime of the process; it resets to zero on any successful body run
/// and is never persisted.
pub struct RetryController {
    policy: RetryPolicy,
    consecutive_failures: u32,
}

impl RetryController {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            consecutive_failures: 0,
        }
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Run one cycle, invoking `body` at most `max_attempts` times.
    ///
    /// Backoff waits poll the stop flag; a stop request abandons the cycle
    /// (the scheduler checks the flag before acting on the outcome).
    pub fn run_cycle<B>(&mut self, stop: &AtomicBool, log: &EventLog, mut body: B) -> CycleOutcome
    where
        B: FnMut() -> Result<Vec<Item>, FetchError>,
    {
        let max = self.policy.max_attempts;

        for attempt in 1..=max {
            match body() {
                Ok(items) => {
                    self.consecutive_failures = 0;
                    return CycleOutcome::Success(items);
                }
                Err(e) => {
                    let kind = classify(&e);
                    self.consecutive_failures += 1;
                    log.error(&format!(
                        "Check failed (attempt {attempt}/{max}, {kind}): {e}"
                    ));

                    let wait = match kind {
                        FailureKind::ConnectionLost => {
                            if self.consecutive_failures >= CONNECTION_FAILURE_THRESHOLD {
                                log.info(&format!(
                                    "{} consecutive connection failures - requesting restart",
                                    self.consecutive_failures
                                ));
                                return CycleOutcome::RestartRequired;
                            }
                            if attempt >= max {
                                log.info(
                                    "Connection retries exhausted - requesting restart",
                                );
                                return CycleOutcome::RestartRequired;
                            }
                            connection_backoff(attempt, self.policy.retry_delay)
                        }
                        FailureKind::Transient | FailureKind::Unknown => {
                            if self.consecutive_failures >= GENERIC_FAILURE_THRESHOLD {
                                log.info(&format!(
                                    "{} consecutive failures - requesting restart",
                                    self.consecutive_failures
                                ));
                                return CycleOutcome::RestartRequired;
                            }
                            if attempt >= max {
                                log.error("All retry attempts failed");
                                return CycleOutcome::RetryExhausted;
                            }
                            transient_backoff(attempt, self.policy.retry_delay)
                        }
                    };

                    log.info(&format!("Retrying in {}s...", wait.as_secs()));
                    if !sleep_unless_stopped(stop, wait) {
                        log.info("Stop requested during retry wait - abandoning cycle");
                        return CycleOutcome::RetryExhausted;
                    }
                }
            }
        }

        CycleOutcome::RetryExhausted
    }
}
