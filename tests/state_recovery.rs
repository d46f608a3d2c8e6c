//! Crash-safety tests for the persisted dedup state.

use tempfile::TempDir;
use vigil::state::StateStore;

#[test]
fn dedup_survives_restart() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("state.json");

    {
        let mut store = StateStore::load(&path);
        assert!(store.record("7421").unwrap());
    }

    // Fresh load simulates the process coming back after a restart.
    let mut store = StateStore::load(&path);
    assert!(store.contains("7421"));
    assert!(!store.record("7421").unwrap(), "id must not be re-recorded");
    assert_eq!(store.stats().total_logged, 1);
}

#[test]
fn corrupt_state_file_degrades_to_empty() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("state.json");
    std::fs::write(&path, "\"seen_repost_ids\": oops").unwrap();

    let store = StateStore::load(&path);
    let stats = store.stats();
    assert_eq!(stats.total_seen, 0);
    assert_eq!(stats.total_logged, 0);
    assert!(stats.last_check.is_none());
}

#[test]
fn recording_over_corrupt_file_replaces_it() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("state.json");
    std::fs::write(&path, "not json at all").unwrap();

    let mut store = StateStore::load(&path);
    store.record("1").unwrap();

    let reloaded = StateStore::load(&path);
    assert!(reloaded.contains("1"));
    assert_eq!(reloaded.stats().total_logged, 1);
}

#[test]
fn state_file_uses_original_field_names() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("state.json");

    let mut store = StateStore::load(&path);
    store.record("99").unwrap();
    store.update_last_check(chrono::Utc::now()).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert!(value["seen_repost_ids"].is_array());
    assert!(value["last_check"].is_string());
    assert_eq!(value["total_reposts_logged"], 1);
}
