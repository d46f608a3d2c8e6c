//! Monitoring scheduler.
//!
//! Owns the long-running poll loop: one retry-controlled cycle per interval,
//! interruptible sleeps between cycles, and an unconditional preventive
//! restart once the process has been up too long. Nothing escapes the loop
//! except an [`ExitReason`] handed back to `main`.

pub mod failure;
pub mod retry;

use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::fetcher::{ContentFetcher, FetchError};
use crate::logging::EventLog;
use crate::models::constants::STOP_POLL_INTERVAL_SECS;
use crate::models::Item;
use crate::monitor::retry::{CycleOutcome, RetryController, RetryPolicy};
use crate::notify::Notifier;
use crate::session::SessionManager;
use crate::state::StateStore;

/// Why the scheduler returned. All variants map to exit code 0; the
/// distinction is for the log stream and for tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// External stop request (signal handler set the stop flag).
    Shutdown,
    /// Failure streak or connection corruption; the supervisor relaunches.
    RestartRequired,
    /// Generic retry budget exhausted without an escalation threshold.
    RetryExhausted,
    /// Uptime ceiling reached, independent of cycle outcomes.
    PreventiveRestart,
}

impl std::fmt::Display for ExitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ExitReason::Shutdown => "shutdown requested",
            ExitReason::RestartRequired => "restart required",
            ExitReason::RetryExhausted => "retry attempts exhausted",
            ExitReason::PreventiveRestart => "preventive restart",
        };
        write!(f, "{label}")
    }
}

/// Loop timing. Both values come from validated configuration.
#[derive(Debug, Clone, Copy)]
pub struct SchedulerConfig {
    pub check_interval: Duration,
    pub max_uptime: Duration,
}

/// Drives the outer monitoring loop.
///
/// The session resource is exclusively owned here for the lifetime of the
/// process: opened once, reused across cycles, torn down only on restart or
/// shutdown. `S` plays both the fetcher and session-manager roles so that
/// ownership stays in one place.
pub struct Scheduler<S, N>
where
    S: ContentFetcher + SessionManager,
    N: Notifier,
{
    source: S,
    notifier: N,
    store: StateStore,
    log: EventLog,
    retry: RetryController,
    config: SchedulerConfig,
    stop: Arc<AtomicBool>,
    started_at: Instant,
}

impl<S, N> Scheduler<S, N>
where
    S: ContentFetcher + SessionManager,
    N: Notifier,
{
    pub fn new(
        source: S,
        notifier: N,
        store: StateStore,
        log: EventLog,
        policy: RetryPolicy,
        config: SchedulerConfig,
        stop: Arc<AtomicBool>,
    ) -> Self {
        Self {
            source,
            notifier,
            store,
            log,
            retry: RetryController::new(policy),
            config,
            stop,
            started_at: Instant::now(),
        }
    }

    /// Run until a stop request, restart escalation, retry exhaustion, or the
    /// uptime ceiling. Always tears the session down before returning.
    pub fn run(&mut self) -> ExitReason {
        loop {
            if self.stop.load(Ordering::SeqCst) {
                return self.teardown(ExitReason::Shutdown);
            }

            // Preventive restart fires before the cycle, regardless of how
            // healthy recent cycles looked.
            let elapsed = self.started_at.elapsed();
            if elapsed >= self.config.max_uptime {
                self.log.info(&format!(
                    "Process has been up {:.1}h - triggering preventive restart",
                    elapsed.as_secs_f64() / 3600.0
                ));
                return self.teardown(ExitReason::PreventiveRestart);
            }

            self.log.info("Checking for new reposts");
            let outcome = {
                let Self {
                    source,
                    notifier,
                    store,
                    log,
                    retry,
                    stop,
                    ..
                } = self;
                retry.run_cycle(stop, log, || run_check(source, store, notifier, log))
            };

            // A stop request during retry waits abandons the cycle; honor it
            // before acting on the outcome.
            if self.stop.load(Ordering::SeqCst) {
                return self.teardown(ExitReason::Shutdown);
            }

            match outcome {
                CycleOutcome::Success(new_items) => {
                    if !new_items.is_empty() {
                        let stats = self.store.stats();
                        self.log.info(&format!(
                            "Cycle complete: {} new, {} logged in total",
                            new_items.len(),
                            stats.total_logged
                        ));
                    }
                }
                CycleOutcome::RetryExhausted => {
                    // Exhausted cycles still count as completed for last_check.
                    if let Err(e) = self.store.update_last_check(Utc::now()) {
                        self.log.error(&format!("Persistence failed, continuing: {e}"));
                    }
                    return self.teardown(ExitReason::RetryExhausted);
                }
                CycleOutcome::RestartRequired => {
                    return self.teardown(ExitReason::RestartRequired);
                }
            }

            if !sleep_unless_stopped(&self.stop, self.config.check_interval) {
                return self.teardown(ExitReason::Shutdown);
            }
        }
    }

    fn teardown(&mut self, reason: ExitReason) -> ExitReason {
        self.log.info(&format!("Stopping monitor: {reason}"));
        self.source.close();
        self.log.info("Cleanup complete");
        reason
    }
}

/// One cycle body: open the session if needed, fetch, diff against the seen
/// set, record and log new items, update `last_check`, notify.
///
/// Persistence failures are logged and never abort the cycle; notification
/// delivery is fire-and-forget inside the notifier.
pub fn run_check<S, N>(
    source: &mut S,
    store: &mut StateStore,
    notifier: &N,
    log: &EventLog,
) -> Result<Vec<Item>, FetchError>
where
    S: ContentFetcher + SessionManager,
    N: Notifier,
{
    if !source.is_open() {
        source
            .open()
            .map_err(|e| FetchError::ConnectionLost(e.to_string()))?;
    }

    let current = source.fetch()?;
    let new_items: Vec<Item> = current
        .into_iter()
        .filter(|item| !store.contains(&item.id))
        .collect();

    if new_items.is_empty() {
        log.info("No new reposts detected");
    } else {
        log.info(&format!("Found {} new repost(s)", new_items.len()));
        for item in &new_items {
            log.record(item);
            if let Err(e) = store.record(&item.id) {
                log.error(&format!("Persistence failed, continuing: {e}"));
            }
        }
        notifier.notify(&new_items);
    }

    if let Err(e) = store.update_last_check(Utc::now()) {
        log.error(&format!("Persistence failed, continuing: {e}"));
    }

    Ok(new_items)
}

/// Sleep for `duration`, polling the stop flag at one-second granularity.
/// Returns `false` if a stop was requested before the full duration elapsed.
pub fn sleep_unless_stopped(stop: &AtomicBool, duration: Duration) -> bool {
    let tick = Duration::from_secs(STOP_POLL_INTERVAL_SECS);
    let deadline = Instant::now() + duration;

    loop {
        if stop.load(Ordering::SeqCst) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        std::thread::sleep(tick.min(deadline - now));
    }
}
