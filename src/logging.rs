//! Append-only event log.
//!
//! Every entry is appended to the log file and echoed to the console so the
//! failure sequence can be reconstructed from either stream. A log file that
//! cannot be written falls back to stderr; logging never propagates errors.

use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use crate::models::Item;

pub struct EventLog {
    path: PathBuf,
}

impl EventLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Log an informational message.
    pub fn info(&self, message: &str) {
        self.append(&format!("INFO: {message}"));
    }

    /// Log an error message.
    pub fn error(&self, message: &str) {
        self.append(&format!("ERROR: {message}"));
    }

    /// Log a newly detected repost.
    pub fn record(&self, item: &Item) {
        self.append(&format!("New repost detected: {} (ID: {})", item.url, item.id));
    }

    fn append(&self, message: &str) {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let line = format!("[{timestamp}] {message}");
        println!("{line}");

        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| writeln!(file, "{line}"));

        if let Err(e) = result {
            eprintln!("Error: could not write to log file {}: {e}", self.path.display());
        }
    }
}
