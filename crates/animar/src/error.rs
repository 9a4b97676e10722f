//! Result and error types for Animar.

use thiserror::Error;

/// Result type for Animar operations
pub type AnimarResult<T> = Result<T, AnimarError>;

/// Errors that can occur in Animar
///
/// Only the deterministic hosts produce errors. The animation and throttling
/// utilities themselves degrade gracefully on odd inputs and never fail.
#[derive(Debug, Error)]
pub enum AnimarError {
    /// Frame timestamps must be strictly increasing across paint cycles
    #[error("Non-monotonic frame timestamp: {next_ms}ms delivered after {last_ms}ms")]
    NonMonotonicTimestamp {
        /// Timestamp of the previously delivered frame
        last_ms: f64,
        /// Rejected timestamp
        next_ms: f64,
    },

    /// A paint cycle was started from inside a frame callback
    #[error("Re-entrant frame delivery: step called while a frame is being delivered")]
    ReentrantStep,
}
