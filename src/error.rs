//! Error types for batch background removal operations

use thiserror::Error;

/// Result type alias for batch background removal operations
pub type Result<T> = std::result::Result<T, BgDropError>;

/// Fallback message used when an external failure carries no message of its own
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

/// Error types for batch background removal operations
#[derive(Error, Debug)]
pub enum BgDropError {
    /// The external removal capability failed for an item
    #[error("Processing error: {0}")]
    Processing(String),

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Operation rejected because a pipeline run is in progress
    #[error("Pipeline busy: {0}")]
    Busy(String),
}

impl BgDropError {
    /// Create a new processing error
    pub fn processing<S: Into<String>>(msg: S) -> Self {
        Self::Processing(msg.into())
    }

    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new busy error
    pub fn busy<S: Into<String>>(msg: S) -> Self {
        Self::Busy(msg.into())
    }
}

/// Extract a human-readable message from an external failure.
///
/// The removal capability may surface arbitrary errors, including ones whose
/// display form is empty. Those are coerced to [`UNKNOWN_ERROR_MESSAGE`] so the
/// UI never renders a blank error.
pub(crate) fn failure_message(err: &(dyn std::error::Error + 'static)) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        UNKNOWN_ERROR_MESSAGE.to_string()
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Silent;

    impl fmt::Display for Silent {
        fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
            Ok(())
        }
    }

    impl std::error::Error for Silent {}

    #[test]
    fn test_error_creation() {
        let err = BgDropError::invalid_config("test config error");
        assert!(matches!(err, BgDropError::InvalidConfig(_)));

        let err = BgDropError::busy("run in progress");
        assert!(matches!(err, BgDropError::Busy(_)));
    }

    #[test]
    fn test_error_display() {
        let err = BgDropError::processing("removal backend crashed");
        assert_eq!(err.to_string(), "Processing error: removal backend crashed");
    }

    #[test]
    fn test_failure_message_passthrough() {
        let err = BgDropError::processing("out of memory");
        assert_eq!(failure_message(&err), "Processing error: out of memory");
    }

    #[test]
    fn test_failure_message_fallback() {
        assert_eq!(failure_message(&Silent), UNKNOWN_ERROR_MESSAGE);
    }
}
