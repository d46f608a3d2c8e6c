//! Persistent dedup state for logged repost ids.
//!
//! Backs the at-most-once logging guarantee: an id that made it into the
//! state file is never logged again across restarts. Writes go through a
//! temp-file-then-rename so a kill mid-write cannot leave a half-written
//! state file behind.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Persistence failure. Callers log it and continue; the in-memory state is
/// already updated when this is returned, so duplicate suppression degrades
/// to best-effort over a crash window rather than aborting the cycle.
#[derive(Debug, Error)]
#[error("failed to persist state to {}: {source}", path.display())]
pub struct StateError {
    pub path: PathBuf,
    #[source]
    pub source: anyhow::Error,
}

/// Counters and timestamps persisted alongside the seen set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleStats {
    /// Number of distinct ids ever seen (size of the seen set).
    pub total_seen: u64,
    /// Monotone count of newly recorded ids; +1 per first-time `record`.
    pub total_logged: u64,
    /// End time of the most recently completed cycle.
    pub last_check: Option<DateTime<Utc>>,
}

/// On-disk representation. The seen set serializes as a sorted array so the
/// file diffs stably between writes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PersistedState {
    #[serde(default)]
    seen_repost_ids: BTreeSet<String>,
    #[serde(default)]
    last_check: Option<DateTime<Utc>>,
    #[serde(default)]
    total_reposts_logged: u64,
}

/// Durable mapping of known repost ids plus counters.
///
/// Owned exclusively by the polling flow; no concurrent writers are assumed,
/// so there is no file locking, only atomic replacement of the file itself.
pub struct StateStore {
    path: PathBuf,
    state: PersistedState,
}

impl StateStore {
    /// Load state from `path`. A missing or unparseable file yields an empty
    /// state with a warning on stderr; loading never fails the caller.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<PersistedState>(&content) {
                Ok(state) => state,
                Err(e) => {
                    eprintln!(
                        "Warning: state file {} is corrupt, starting fresh: {e}",
                        path.display()
                    );
                    PersistedState::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => PersistedState::default(),
            Err(e) => {
                eprintln!(
                    "Warning: could not read state file {}, starting fresh: {e}",
                    path.display()
                );
                PersistedState::default()
            }
        };

        Self { path, state }
    }

    /// Whether `id` has already been logged.
    pub fn contains(&self, id: &str) -> bool {
        self.state.seen_repost_ids.contains(id)
    }

    /// Record `id` as logged. Idempotent: an already-present id is a no-op
    /// returning `Ok(false)` with no stats change. A new id updates the
    /// in-memory set and counter first, then persists synchronously.
    pub fn record(&mut self, id: &str) -> Result<bool, StateError> {
        if !self.state.seen_repost_ids.insert(id.to_string()) {
            return Ok(false);
        }
        self.state.total_reposts_logged += 1;
        self.persist()?;
        Ok(true)
    }

    /// Persist the timestamp of the most recently completed cycle.
    pub fn update_last_check(&mut self, timestamp: DateTime<Utc>) -> Result<(), StateError> {
        self.state.last_check = Some(timestamp);
        self.persist()
    }

    /// Current counters, read from the in-memory mirror.
    pub fn stats(&self) -> CycleStats {
        CycleStats {
            total_seen: self.state.seen_repost_ids.len() as u64,
            total_logged: self.state.total_reposts_logged,
            last_check: self.state.last_check,
        }
    }

    /// Write the full state to disk via temp-file-then-rename in the state
    /// file's own directory, so the rename stays on one filesystem.
    fn persist(&self) -> Result<(), StateError> {
        self.write_atomically().map_err(|source| StateError {
            path: self.path.clone(),
            source,
        })
    }

    fn write_atomically(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.state)
            .context("Failed to serialize state to JSON")?;

        let tmp_path = self.path.with_extension("json.tmp");
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create state directory: {}", parent.display())
                })?;
            }
        }

        fs::write(&tmp_path, json)
            .with_context(|| format!("Failed to write temp state file: {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path).with_context(|| {
            format!("Failed to replace state file: {}", self.path.display())
        })?;

        Ok(())
    }

    /// Path of the backing state file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
