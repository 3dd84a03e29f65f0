//! Error types and recovery strategies for AudioReader
//!
//! Errors are classified into three severity tiers:
//! - **Recoverable**: the session continues and the operation may succeed later
//!   (a blocked playback start, a failed write to local storage)
//! - **Degraded**: the session continues with a feature switched off
//!   (persistence falls back to in-memory operation)
//! - **Fatal**: the operation that raised it is aborted (opening a book)
//!
//! The crate-level error enums of the other crates map onto these tiers through
//! their own `severity()` methods.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Recovery actions that can be taken when an error occurs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Retry on the next user-initiated action (e.g. pressing play again)
    RetryOnUserAction,
    /// Fall back to defaults or in-memory state for the rest of the session
    FallBackToDefaults,
    /// Abort the open and keep whatever book was open before
    AbortOpen,
    /// No automatic recovery - user intervention required
    UserIntervention,
}

impl fmt::Display for RecoveryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RetryOnUserAction => write!(f, "Retrying on next user action"),
            Self::FallBackToDefaults => write!(f, "Falling back to defaults"),
            Self::AbortOpen => write!(f, "Aborting open"),
            Self::UserIntervention => write!(f, "User intervention required"),
        }
    }
}

/// Error severity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Error can be recovered from without user involvement
    Recoverable,
    /// Feature degraded but playback can continue
    Degraded,
    /// The operation is aborted
    Fatal,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recoverable => write!(f, "Recoverable"),
            Self::Degraded => write!(f, "Degraded"),
            Self::Fatal => write!(f, "Fatal"),
        }
    }
}

/// Failure to obtain a usable alignment file for a book
///
/// Always fatal to the open that raised it. There is no automatic retry.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The alignment file does not exist
    #[error("Alignment file not found: {path}")]
    NotFound { path: PathBuf },

    /// The alignment file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The alignment file is not valid JSON for the expected schema
    #[error("Malformed alignment data: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The alignment data parsed but violates a timeline invariant
    #[error("Invalid alignment data: {field}: {reason}")]
    Invalid { field: String, reason: String },

    /// The transport delivering the alignment failed
    #[error("Transport error: {0}")]
    Transport(String),

    /// The book id cannot name a book
    #[error("Invalid book id '{0}'")]
    InvalidBookId(String),
}

impl LoadError {
    /// Creates an invariant violation error
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Load errors always abort the open
    pub fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    /// Returns the recommended recovery action for this error
    pub fn recovery_action(&self) -> RecoveryAction {
        match self {
            Self::NotFound { .. } | Self::InvalidBookId(_) => RecoveryAction::UserIntervention,
            _ => RecoveryAction::AbortOpen,
        }
    }

    /// Returns a user-friendly message suitable for display
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound { .. } => {
                "This book has not been processed yet. Run the alignment pipeline first."
                    .to_string()
            }
            Self::Io { .. } | Self::Transport(_) => {
                "The book data could not be read. Please try again.".to_string()
            }
            Self::Malformed(_) | Self::Invalid { .. } => {
                "The book's alignment data is damaged and cannot be used.".to_string()
            }
            Self::InvalidBookId(id) => format!("'{}' is not a valid book id.", id),
        }
    }
}

/// Result alias for alignment loading
pub type LoadResult<T> = std::result::Result<T, LoadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_errors_are_fatal() {
        let err = LoadError::invalid("words", "not sorted");
        assert_eq!(err.severity(), ErrorSeverity::Fatal);
        assert_eq!(err.recovery_action(), RecoveryAction::AbortOpen);
    }

    #[test]
    fn test_not_found_requires_user() {
        let err = LoadError::NotFound {
            path: PathBuf::from("books/x/alignment_compact.json"),
        };
        assert_eq!(err.recovery_action(), RecoveryAction::UserIntervention);
        assert!(err.to_string().contains("alignment_compact.json"));
    }

    #[test]
    fn test_invalid_display() {
        let err = LoadError::invalid("parts[1].offset", "gap of 3.000s");
        assert_eq!(
            err.to_string(),
            "Invalid alignment data: parts[1].offset: gap of 3.000s"
        );
    }

    #[test]
    fn test_severity_ordering() {
        assert!(ErrorSeverity::Recoverable < ErrorSeverity::Degraded);
        assert!(ErrorSeverity::Degraded < ErrorSeverity::Fatal);
    }

    #[test]
    fn test_user_message_mentions_book_id() {
        let err = LoadError::InvalidBookId("../etc".to_string());
        assert!(err.user_message().contains("../etc"));
    }
}
