// FILE: crates/library/src/error.rs

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("Books directory is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Book not found: {0}")]
    BookNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type LibraryResult<T> = std::result::Result<T, LibraryError>;
