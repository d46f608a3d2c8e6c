//! Scenario tests for the cycle body and the scheduler, using scripted
//! fetchers and a recording notifier.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tempfile::TempDir;
use vigil::fetcher::{ContentFetcher, FetchError};
use vigil::logging::EventLog;
use vigil::models::Item;
use vigil::monitor::retry::RetryPolicy;
use vigil::monitor::{run_check, ExitReason, Scheduler, SchedulerConfig};
use vigil::notify::Notifier;
use vigil::session::{SessionError, SessionManager};
use vigil::state::StateStore;

/// Fetcher/session double driven by a queue of scripted fetch results.
/// Once the script runs out, further fetches return an empty page result.
struct ScriptedSource {
    script: Mutex<VecDeque<Result<Vec<Item>, FetchError>>>,
    fetch_calls: Arc<AtomicUsize>,
    closed: Arc<AtomicBool>,
    open: bool,
    /// Optional stop flag raised as a side effect of fetching, to wind the
    /// scheduler loop down from inside a cycle.
    stop_after_fetch: Option<Arc<AtomicBool>>,
}

impl ScriptedSource {
    fn new(script: Vec<Result<Vec<Item>, FetchError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fetch_calls: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicBool::new(false)),
            open: false,
            stop_after_fetch: None,
        }
    }

    fn fetch_counter(&self) -> Arc<AtomicUsize> {
        self.fetch_calls.clone()
    }

    fn closed_flag(&self) -> Arc<AtomicBool> {
        self.closed.clone()
    }
}

impl SessionManager for ScriptedSource {
    fn open(&mut self) -> Result<(), SessionError> {
        self.open = true;
        Ok(())
    }

    fn close(&mut self) {
        self.open = false;
        self.closed.store(true, Ordering::SeqCst);
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

impl ContentFetcher for ScriptedSource {
    fn fetch(&mut self) -> Result<Vec<Item>, FetchError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(stop) = &self.stop_after_fetch {
            stop.store(true, Ordering::SeqCst);
        }
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(vec![]))
    }
}

#[derive(Clone, Default)]
struct RecordingNotifier {
    batches: Arc<Mutex<Vec<Vec<Item>>>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, items: &[Item]) {
        self.batches.lock().unwrap().push(items.to_vec());
    }
}

fn item(id: &str) -> Item {
    Item::new(id, format!("https://www.tiktok.com/@u/video/{id}"))
}

fn test_log(temp: &TempDir) -> EventLog {
    EventLog::new(temp.path().join("events.log"))
}

fn test_store(temp: &TempDir) -> StateStore {
    StateStore::load(temp.path().join("state.json"))
}

fn quick_policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        retry_delay: Duration::from_millis(1),
    }
}

fn quick_config() -> SchedulerConfig {
    SchedulerConfig {
        check_interval: Duration::from_millis(5),
        max_uptime: Duration::from_secs(3600),
    }
}

#[test]
fn new_items_are_recorded_and_notified() {
    let temp = TempDir::new().unwrap();
    let log = test_log(&temp);
    let mut store = test_store(&temp);
    let notifier = RecordingNotifier::default();
    let mut source = ScriptedSource::new(vec![Ok(vec![item("A"), item("B")])]);

    let new_items = run_check(&mut source, &mut store, &notifier, &log).unwrap();

    assert_eq!(new_items, vec![item("A"), item("B")]);
    assert_eq!(store.stats().total_logged, 2);
    assert!(store.contains("A"));
    assert!(store.contains("B"));

    let batches = notifier.batches.lock().unwrap();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0], vec![item("A"), item("B")]);
}

#[test]
fn already_seen_items_are_not_renotified() {
    let temp = TempDir::new().unwrap();
    let log = test_log(&temp);
    let mut store = test_store(&temp);
    store.record("A").unwrap();
    let logged_before = store.stats().total_logged;

    let notifier = RecordingNotifier::default();
    let mut source = ScriptedSource::new(vec![Ok(vec![item("A")])]);

    let new_items = run_check(&mut source, &mut store, &notifier, &log).unwrap();

    assert!(new_items.is_empty());
    assert_eq!(store.stats().total_logged, logged_before);
    assert!(notifier.batches.lock().unwrap().is_empty());
    // The cycle still completed, so last_check moves.
    assert!(store.stats().last_check.is_some());
}

#[test]
fn check_opens_session_when_closed() {
    let temp = TempDir::new().unwrap();
    let log = test_log(&temp);
    let mut store = test_store(&temp);
    let notifier = RecordingNotifier::default();
    let mut source = ScriptedSource::new(vec![Ok(vec![])]);
    assert!(!source.is_open());

    run_check(&mut source, &mut store, &notifier, &log).unwrap();
    assert!(source.is_open());
}

#[test]
fn scheduler_restarts_after_two_connection_failures() {
    let temp = TempDir::new().unwrap();
    let source = ScriptedSource::new(vec![
        Err(FetchError::ConnectionLost("dropped".into())),
        Err(FetchError::ConnectionLost("still down".into())),
    ]);
    let fetches = source.fetch_counter();
    let closed = source.closed_flag();

    let mut scheduler = Scheduler::new(
        source,
        RecordingNotifier::default(),
        test_store(&temp),
        test_log(&temp),
        quick_policy(),
        quick_config(),
        Arc::new(AtomicBool::new(false)),
    );

    assert_eq!(scheduler.run(), ExitReason::RestartRequired);
    assert_eq!(fetches.load(Ordering::SeqCst), 2);
    assert!(closed.load(Ordering::SeqCst), "teardown must close the session");
}

#[test]
fn scheduler_exhausts_generic_retries_and_exits() {
    let temp = TempDir::new().unwrap();
    let source = ScriptedSource::new(vec![
        Err(FetchError::Timeout("slow".into())),
        Err(FetchError::Timeout("slow".into())),
    ]);
    let fetches = source.fetch_counter();
    let closed = source.closed_flag();

    let policy = RetryPolicy {
        max_attempts: 2,
        retry_delay: Duration::from_millis(1),
    };
    let state_path = temp.path().join("state.json");
    let mut scheduler = Scheduler::new(
        source,
        RecordingNotifier::default(),
        StateStore::load(&state_path),
        test_log(&temp),
        policy,
        quick_config(),
        Arc::new(AtomicBool::new(false)),
    );

    assert_eq!(scheduler.run(), ExitReason::RetryExhausted);
    assert_eq!(fetches.load(Ordering::SeqCst), 2);
    assert!(closed.load(Ordering::SeqCst));

    // Exhausted cycles count as completed: last_check was persisted.
    let store = StateStore::load(&state_path);
    assert!(store.stats().last_check.is_some());
}

#[test]
fn scheduler_preventive_restart_skips_the_cycle() {
    let temp = TempDir::new().unwrap();
    let source = ScriptedSource::new(vec![Ok(vec![item("A")])]);
    let fetches = source.fetch_counter();
    let closed = source.closed_flag();

    let config = SchedulerConfig {
        check_interval: Duration::from_millis(5),
        // Ceiling already reached when the loop starts.
        max_uptime: Duration::ZERO,
    };
    let mut scheduler = Scheduler::new(
        source,
        RecordingNotifier::default(),
        test_store(&temp),
        test_log(&temp),
        quick_policy(),
        config,
        Arc::new(AtomicBool::new(false)),
    );

    assert_eq!(scheduler.run(), ExitReason::PreventiveRestart);
    assert_eq!(
        fetches.load(Ordering::SeqCst),
        0,
        "controller must not run once the uptime ceiling is hit"
    );
    assert!(closed.load(Ordering::SeqCst));
}

#[test]
fn scheduler_honors_stop_requested_mid_cycle() {
    let temp = TempDir::new().unwrap();
    let stop = Arc::new(AtomicBool::new(false));

    let mut source = ScriptedSource::new(vec![Ok(vec![item("A")])]);
    source.stop_after_fetch = Some(stop.clone());
    let fetches = source.fetch_counter();

    let mut scheduler = Scheduler::new(
        source,
        RecordingNotifier::default(),
        test_store(&temp),
        test_log(&temp),
        quick_policy(),
        // Long interval: the test only passes if the stop short-circuits it.
        SchedulerConfig {
            check_interval: Duration::from_secs(300),
            max_uptime: Duration::from_secs(3600),
        },
        stop,
    );

    assert_eq!(scheduler.run(), ExitReason::Shutdown);
    assert_eq!(fetches.load(Ordering::SeqCst), 1);
}

#[test]
fn scheduler_stops_immediately_when_flag_preset() {
    let temp = TempDir::new().unwrap();
    let source = ScriptedSource::new(vec![]);
    let fetches = source.fetch_counter();

    let mut scheduler = Scheduler::new(
        source,
        RecordingNotifier::default(),
        test_store(&temp),
        test_log(&temp),
        quick_policy(),
        quick_config(),
        Arc::new(AtomicBool::new(true)),
    );

    assert_eq!(scheduler.run(), ExitReason::Shutdown);
    assert_eq!(fetches.load(Ordering::SeqCst), 0);
}
