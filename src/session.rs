//! Session lifecycle seam.
//!
//! Owns acquisition and teardown of whatever expensive resource the fetcher
//! needs. The scheduler opens the session once at startup, reuses it across
//! cycles, and closes it on restart or shutdown.

use thiserror::Error;

/// Session acquisition failure. Fatal at startup (non-zero exit); during the
/// monitoring loop it is treated as a connection-level failure.
#[derive(Debug, Error)]
#[error("failed to open session: {0}")]
pub struct SessionError(pub String);

pub trait SessionManager {
    /// Acquire the underlying resource. Calling `open` on an already-open
    /// session is a no-op.
    fn open(&mut self) -> Result<(), SessionError>;

    /// Tear the resource down. Idempotent.
    fn close(&mut self);

    fn is_open(&self) -> bool;
}
