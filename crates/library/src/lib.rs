//! AudioReader Library
//!
//! The books directory: one subdirectory per processed book, each holding an
//! `alignment_compact.json`, an optional `meta.json` and the audio parts.

pub mod error;
pub mod scanner;
pub mod source;

pub use error::{LibraryError, LibraryResult};
pub use scanner::{scan_books, summarize, META_FILE_NAME};
pub use source::DirectoryBookSource;
