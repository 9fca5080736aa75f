//! Result and error types for termprobe.

use thiserror::Error;

/// Result type for termprobe operations
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Errors that can occur while driving a virtual terminal session
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The application loop did not hand control back before the deadline
    #[error("Session timed out after {ms}ms")]
    SessionTimeout {
        /// Configured deadline in milliseconds
        ms: u64,
    },

    /// A session was requested while another one is active on this thread
    #[error("A virtual terminal session is already active; sessions do not nest")]
    SessionReentry,

    /// A session operation was attempted with no active session
    #[error("No active virtual terminal session")]
    NoActiveSession,

    /// Shorthand token could not be expanded into an event
    #[error("Invalid event shorthand: {token:?}")]
    InvalidShorthand {
        /// The offending token
        token: String,
    },

    /// Snapshot content or style diverges from its baseline
    #[error("Snapshot mismatch: {name}\n{detail}")]
    SnapshotMismatch {
        /// Snapshot name
        name: String,
        /// First mismatching row/run with expected and actual values
        detail: String,
    },

    /// Snapshot asserted in a session with no test name
    #[error(
        "Snapshot {name:?} has no test name to live under; \
         set one with SessionConfig::with_test_name"
    )]
    MissingTestName {
        /// Snapshot name
        name: String,
    },

    /// Snapshot file could not be (de)serialized
    #[error("Snapshot serialization failed: {message}")]
    SnapshotSerialization {
        /// Error message
        message: String,
    },

    /// Predicate was called with malformed arguments
    #[error("{predicate}: argument type mismatch: {message}")]
    AssertionTypeError {
        /// Predicate name
        predicate: String,
        /// What was wrong with the arguments
        message: String,
    },

    /// Predicate found a different value than expected
    #[error("{predicate} failed at ({col}, {row}): expected {expected}, got {actual}")]
    AssertionValueMismatch {
        /// Predicate name
        predicate: String,
        /// Column
        col: u16,
        /// Row
        row: u16,
        /// Expected value
        expected: String,
        /// Actual value
        actual: String,
    },

    /// Coordinate outside the buffer
    #[error("Coordinate ({col}, {row}) is outside the {width}x{height} buffer")]
    OutOfRange {
        /// Column
        col: i128,
        /// Row
        row: i128,
        /// Buffer width
        width: u16,
        /// Buffer height
        height: u16,
    },

    /// Frame text assertion failed
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// Terminal backend failure
    #[error("Terminal error: {message}")]
    TerminalError {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HarnessError {
    /// Whether this error is an assertion failure (as opposed to a setup,
    /// type, range or timeout error)
    #[must_use]
    pub const fn is_assertion_failure(&self) -> bool {
        matches!(
            self,
            Self::AssertionValueMismatch { .. }
                | Self::SnapshotMismatch { .. }
                | Self::AssertionFailed { .. }
        )
    }

    /// Whether this error is a deadline expiry
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::SessionTimeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_is_not_assertion_failure() {
        let err = HarnessError::SessionTimeout { ms: 50 };
        assert!(err.is_timeout());
        assert!(!err.is_assertion_failure());
        assert_eq!(err.to_string(), "Session timed out after 50ms");
    }

    #[test]
    fn test_type_error_is_not_value_mismatch() {
        let err = HarnessError::AssertionTypeError {
            predicate: "assert_fg".to_string(),
            message: "expected a color".to_string(),
        };
        assert!(!err.is_assertion_failure());

        let err = HarnessError::AssertionValueMismatch {
            predicate: "assert_fg".to_string(),
            col: 1,
            row: 2,
            expected: "red".to_string(),
            actual: "blue".to_string(),
        };
        assert!(err.is_assertion_failure());
        assert!(err.to_string().contains("(1, 2)"));
    }

    #[test]
    fn test_missing_test_name_message() {
        let err = HarnessError::MissingTestName {
            name: "home".to_string(),
        };
        assert!(!err.is_assertion_failure());
        assert!(err.to_string().contains("\"home\""));
        assert!(err.to_string().contains("with_test_name"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: HarnessError = io.into();
        assert!(matches!(err, HarnessError::Io(_)));
    }
}
