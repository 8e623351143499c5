//! Start-time error taxonomy.
//!
//! Only `start` can fail hard. Per-tick failures (price lookup, order
//! submission) are recovered locally and surface as log records instead.

use thiserror::Error;

/// Why a session failed to start.
#[derive(Debug, Error)]
pub enum StartError {
    /// Empty watch list or non-positive coefficient
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A session is already running; stop it first
    #[error("a session is already active")]
    SessionActive,

    /// Breakout-level computation failed for an instrument; no partial
    /// session is retained
    #[error("breakout level computation failed for {code}")]
    LevelComputation {
        code: String,
        #[source]
        source: anyhow::Error,
    },
}
