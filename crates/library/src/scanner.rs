// FILE: crates/library/src/scanner.rs

//! Books directory listing
//!
//! Every immediate subdirectory holding an alignment file is a book. Its
//! summary comes from `meta.json` when present, otherwise from the alignment
//! header. Unreadable metadata never hides a book; it keeps the defaults.

use crate::error::{LibraryError, LibraryResult};
use audioreader_core::{BookSummary, ALIGNMENT_FILE_NAME};
use log::{debug, info, warn};
use serde::de::IgnoredAny;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use walkdir::WalkDir;

/// Optional metadata file written next to the alignment
pub const META_FILE_NAME: &str = "meta.json";

/// Fields of `meta.json`; each one present overrides the default
#[derive(Debug, Default, Deserialize)]
struct BookMeta {
    title: Option<String>,
    author: Option<String>,
    total_duration: Option<f64>,
    word_count: Option<usize>,
    has_chapters: Option<bool>,
}

/// The summary-relevant part of an alignment file; word data is skipped
#[derive(Debug, Deserialize)]
struct AlignmentHeader {
    title: Option<String>,
    author: Option<String>,
    total_duration: Option<f64>,
    word_count: Option<usize>,
    #[serde(default)]
    words: Option<Vec<IgnoredAny>>,
    #[serde(default)]
    chapters: Option<Vec<IgnoredAny>>,
}

/// Lists the books under `root`, sorted by directory name
///
/// A missing root is an empty library.
pub fn scan_books(root: &Path) -> LibraryResult<Vec<BookSummary>> {
    if !root.exists() {
        warn!("Books directory does not exist: {}", root.display());
        return Ok(Vec::new());
    }
    if !root.is_dir() {
        return Err(LibraryError::NotADirectory(root.to_path_buf()));
    }

    let mut books = Vec::new();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("Error walking books directory: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_dir() {
            continue;
        }
        let dir = entry.path();
        if !dir.join(ALIGNMENT_FILE_NAME).is_file() {
            debug!("Skipping {} (no alignment)", dir.display());
            continue;
        }

        let slug = entry.file_name().to_string_lossy().into_owned();
        books.push(summarize(dir, slug));
    }

    info!("Found {} books in {}", books.len(), root.display());
    Ok(books)
}

/// Builds the summary for one book directory
pub fn summarize(dir: &Path, slug: String) -> BookSummary {
    let mut summary = BookSummary::from_slug(slug);

    let meta_path = dir.join(META_FILE_NAME);
    if meta_path.is_file() {
        match read_json::<BookMeta>(&meta_path) {
            Ok(meta) => apply_meta(&mut summary, meta),
            Err(e) => warn!("Ignoring {}: {}", meta_path.display(), e),
        }
        return summary;
    }

    let alignment_path = dir.join(ALIGNMENT_FILE_NAME);
    match read_json::<AlignmentHeader>(&alignment_path) {
        Ok(header) => apply_header(&mut summary, header),
        Err(e) => warn!("Could not read header of {}: {}", alignment_path.display(), e),
    }
    summary
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, Box<dyn std::error::Error>> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

fn apply_meta(summary: &mut BookSummary, meta: BookMeta) {
    if let Some(title) = meta.title {
        summary.title = title;
    }
    if let Some(author) = meta.author {
        summary.author = author;
    }
    if let Some(total_duration) = meta.total_duration {
        summary.total_duration = total_duration;
    }
    if let Some(word_count) = meta.word_count {
        summary.word_count = word_count;
    }
    if let Some(has_chapters) = meta.has_chapters {
        summary.has_chapters = has_chapters;
    }
}

fn apply_header(summary: &mut BookSummary, header: AlignmentHeader) {
    if let Some(title) = header.title {
        summary.title = title;
    }
    if let Some(author) = header.author {
        summary.author = author;
    }
    if let Some(total_duration) = header.total_duration {
        summary.total_duration = total_duration;
    }
    summary.word_count = header
        .word_count
        .or(header.words.map(|words| words.len()))
        .unwrap_or(0);
    summary.has_chapters = header.chapters.is_some_and(|chapters| !chapters.is_empty());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_header_counts_words_without_word_count() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(ALIGNMENT_FILE_NAME),
            r#"{"title":"T","total_duration":3.0,"words":[["a",0,1],["b",1,2]],"parts":[]}"#,
        )
        .unwrap();

        let summary = summarize(temp_dir.path(), "t".to_string());
        assert_eq!(summary.word_count, 2);
        assert!(!summary.has_chapters);
        assert_eq!(summary.author, "Unknown Author");
    }

    #[test]
    fn test_unreadable_meta_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(META_FILE_NAME), "{oops").unwrap();

        let summary = summarize(temp_dir.path(), "the_long-walk".to_string());
        assert_eq!(summary.title, "The Long Walk");
        assert_eq!(summary.total_duration, 0.0);
    }
}
