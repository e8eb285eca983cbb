//! Error types for semantic escalation

use thiserror::Error;

/// Error type for a single rater call. Always recovered locally: a failed
/// rater degrades one pair's tier resolution, never the episode.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EscalationError {
    #[error("rater '{rater}' timed out after {timeout_secs}s")]
    Timeout { rater: String, timeout_secs: u64 },

    #[error("rater '{rater}' failed: {message}")]
    RaterFailed { rater: String, message: String },
}
