pub mod constants;

use serde::{Deserialize, Serialize};

/// One unit of monitored content, produced transiently by the fetcher each
/// cycle. Only the `id` is ever persisted; `url` is handed to the event log
/// and notifier for the current cycle only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Stable opaque identifier; non-empty, identical across repeated
    /// fetches of the same underlying content.
    pub id: String,

    /// Human-facing URL for logs and notifications.
    pub url: String,
}

impl Item {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
        }
    }
}
