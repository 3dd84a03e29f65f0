//! Domain types for AudioReader
//!
//! This module contains all domain models organized by responsibility:
//! - `book`: book identity, library summaries and chapters
//! - `word`: transcribed words with their audio timestamps
//! - `segment`: audio segments forming the book's virtual timeline
//! - `bookmark`: user bookmarks with captured reading context
//! - `playback`: validated speed and volume values
//! - `settings`: global display and playback settings
//! - `common`: shared traits and utilities

mod book;
mod bookmark;
mod common;
mod playback;
mod segment;
mod settings;
mod word;

// Re-export all public types
pub use book::{BookId, BookSummary, Chapter};
pub use bookmark::{Bookmark, BookmarkId};
pub use common::{format_clock, Timestamp, Validator};
pub use playback::{PlaybackSpeed, Volume};
pub use segment::AudioSegment;
pub use settings::{ColorScheme, Settings};
pub use word::Word;
