//! Error types for the collaborators around the simulation
//!
//! The simulation step itself never fails; these only surface from storage and
//! the remote leaderboard, and callers degrade to defaults when they do.

use thiserror::Error;

/// Errors from the key/value storage backend.
#[derive(Error, Debug)]
pub enum StorageError {
    /// No storage is reachable (private mode, denied permission, no window).
    #[error("storage unavailable")]
    Unavailable,

    /// The backend refused a write (quota exceeded, denied).
    #[error("failed to write key {key}: {reason}")]
    Write {
        /// Key being written.
        key: String,
        /// Backend-provided reason.
        reason: String,
    },

    /// Stored value could not be encoded or decoded.
    #[error("malformed value: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Errors from the remote leaderboard.
#[derive(Error, Debug)]
pub enum LeaderboardError {
    /// No endpoint configured; the local leaderboard is authoritative.
    #[error("no remote leaderboard endpoint configured")]
    NotConfigured,

    /// The request did not complete within the timeout.
    #[error("request timed out after {0} ms")]
    Timeout(u32),

    /// The request could not be sent or the connection failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("server returned status {0}")]
    Status(u16),

    /// The body was not the expected JSON shape.
    #[error("malformed response: {0}")]
    Malformed(String),
}
