//! Domain types shared by every AudioReader crate.
//!
//! - `types`: words, audio segments, chapters, bookmarks, settings
//! - `alignment`: the alignment file produced by the transcription pipeline
//! - `error`: load errors and the severity taxonomy used across the workspace

pub mod alignment;
pub mod error;
pub mod types;

pub use alignment::{Alignment, ALIGNMENT_FILE_NAME, TIME_TOLERANCE};
pub use error::{ErrorSeverity, LoadError, LoadResult, RecoveryAction};
pub use types::{
    format_clock, AudioSegment, BookId, BookSummary, Bookmark, BookmarkId, Chapter, ColorScheme,
    PlaybackSpeed, Settings, Timestamp, Validator, Volume, Word,
};
