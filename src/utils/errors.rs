// src/utils/errors.rs
//! Crate-wide error taxonomy
//!
//! Every failure in this crate is scoped to a single requested operation or
//! recording session; nothing here is fatal to the process.

use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, EngineError>;

/// Engine errors
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// Unknown or expired cache key, unknown recording id, or unknown
    /// snapshot index. Always recoverable.
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed request (missing action field, bad line range). Surfaced
    /// before any side effect is performed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The one-shot triggering action of a recording failed. The session
    /// stops with reason `error`.
    #[error("action failed: {0}")]
    ActionFailed(String),

    /// A mid-recording snapshot attempt failed. Only ever crosses the host
    /// boundary; the capture loop logs it and skips the tick.
    #[error("capture failed: {0}")]
    CaptureFailed(String),

    /// Unexpected internal condition
    #[error("internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Shorthand for a `NotFound` over a typed identifier
    pub fn not_found(what: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{} {}", what, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = EngineError::NotFound("cache key k_123".to_string());
        assert_eq!(err.to_string(), "not found: cache key k_123");

        let err = EngineError::InvalidArgument("missing url".to_string());
        assert_eq!(err.to_string(), "invalid argument: missing url");
    }

    #[test]
    fn test_not_found_helper() {
        let err = EngineError::not_found("recording", "rec_abc");
        assert_eq!(err.to_string(), "not found: recording rec_abc");
    }
}
