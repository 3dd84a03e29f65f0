// FILE: crates/library/src/source.rs

//! Loads alignments from the books directory
//!
//! Part `file` entries are written relative to the directory holding the
//! books root. When that path does not exist the file name is looked up in
//! the book's own directory instead, so a book folder can be moved around.

use audioreader_core::{Alignment, BookId, LoadError, LoadResult, ALIGNMENT_FILE_NAME};
use media_engine::BookSource;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct DirectoryBookSource {
    root: PathBuf,
}

impl DirectoryBookSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn book_dir(&self, book_id: &BookId) -> PathBuf {
        self.root.join(book_id.as_str())
    }

    /// Path a part's `file` entry refers to
    pub fn resolve_part(&self, book_id: &BookId, file: &str) -> PathBuf {
        let base = self.root.parent().unwrap_or(Path::new(""));
        let primary = base.join(file);
        if primary.is_file() {
            return primary;
        }

        let book_dir = self.book_dir(book_id);
        match Path::new(file).file_name() {
            Some(name) if book_dir.join(name).is_file() => book_dir.join(name),
            _ => primary,
        }
    }
}

impl BookSource for DirectoryBookSource {
    async fn load(&self, book_id: &BookId) -> LoadResult<Alignment> {
        let path = self.book_dir(book_id).join(ALIGNMENT_FILE_NAME);
        let json = match tokio::fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(LoadError::NotFound { path });
            }
            Err(source) => return Err(LoadError::Io { path, source }),
        };

        let mut alignment = Alignment::from_json(&json)?;
        for segment in &mut alignment.segments {
            let resolved = self.resolve_part(book_id, &segment.source_ref);
            segment.source_ref = resolved.to_string_lossy().into_owned();
        }

        log::debug!(
            "Loaded '{}' from {} ({} parts)",
            book_id,
            path.display(),
            alignment.segments.len()
        );
        Ok(alignment)
    }
}
