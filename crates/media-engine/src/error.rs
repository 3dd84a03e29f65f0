// FILE: crates/media-engine/src/error.rs

use audioreader_core::{ErrorSeverity, LoadError};
use std::path::PathBuf;
use thiserror::Error;

/// Failure to obtain or prepare a segment's media handle
#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Media not found: {0}")]
    NotFound(PathBuf),

    #[error("Unsupported media: {0}")]
    Unsupported(String),

    #[error("Media never became ready: {0}")]
    NotReady(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The host refused to start playback (autoplay policy, device busy, ...)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Playback start rejected: {reason}")]
pub struct PlaybackRejected {
    pub reason: String,
}

impl PlaybackRejected {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("Failed to acquire segment {index} ({source_ref}): {source}")]
    SegmentAcquisition {
        index: usize,
        source_ref: String,
        #[source]
        source: MediaError,
    },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Invalid speed: {0}")]
    InvalidSpeed(f32),

    #[error("Invalid volume: {0}")]
    InvalidVolume(f32),

    #[error("Invalid seek target: {0}")]
    InvalidSeekTarget(f64),

    #[error("No book is open")]
    NoBookOpen,

    #[error("This book has no chapters")]
    NoChapters,

    #[error("Chapter {0} does not exist")]
    ChapterOutOfRange(i64),

    #[error("Bookmark not found: {0}")]
    BookmarkNotFound(String),
}

impl EngineError {
    /// Opening failures abort the open; everything else leaves the session as it was
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Load(_) | Self::SegmentAcquisition { .. } => ErrorSeverity::Fatal,
            _ => ErrorSeverity::Recoverable,
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquisition_error_is_fatal() {
        let err = EngineError::SegmentAcquisition {
            index: 2,
            source_ref: "books/x/3.m4b".to_string(),
            source: MediaError::NotFound(PathBuf::from("books/x/3.m4b")),
        };
        assert_eq!(err.severity(), ErrorSeverity::Fatal);
        assert!(err.to_string().contains("segment 2"));
    }

    #[test]
    fn test_load_error_passes_through() {
        let err: EngineError = LoadError::invalid("parts", "empty").into();
        assert_eq!(err.to_string(), "Invalid alignment data: parts: empty");
        assert_eq!(err.severity(), ErrorSeverity::Fatal);
    }

    #[test]
    fn test_command_errors_are_recoverable() {
        assert_eq!(
            EngineError::InvalidSpeed(5.0).severity(),
            ErrorSeverity::Recoverable
        );
        assert!(EngineError::InvalidSpeed(5.0).to_string().contains('5'));
    }
}
