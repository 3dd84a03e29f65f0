//! Book identity, library summaries and chapters

use serde::{Deserialize, Serialize};

/// Identifier for a book: the slug naming its directory in the library
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(String);

impl BookId {
    /// Parses a book id, rejecting empty ids and ids that would escape the
    /// books directory
    pub fn parse(s: &str) -> Result<Self, String> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("Book id must not be empty".to_string());
        }
        if trimmed.contains(['/', '\\']) || trimmed == "." || trimmed == ".." {
            return Err(format!("Book id '{}' must be a single directory name", s));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entry in the library listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSummary {
    pub slug: String,
    pub title: String,
    pub author: String,
    pub total_duration: f64,
    pub word_count: usize,
    pub has_chapters: bool,
}

impl BookSummary {
    /// Creates a summary with defaults derived from the directory name
    pub fn from_slug(slug: impl Into<String>) -> Self {
        let slug = slug.into();
        Self {
            title: title_from_slug(&slug),
            slug,
            author: "Unknown Author".to_string(),
            total_duration: 0.0,
            word_count: 0,
            has_chapters: false,
        }
    }
}

/// Turns `consider-phlebas` into `Consider Phlebas`
fn title_from_slug(slug: &str) -> String {
    slug.replace(['-', '_'], " ")
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(|c| c.to_lowercase()))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// A chapter mapped onto the audio timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub title: String,
    /// Start time in seconds
    pub start_time: f64,
    /// End time in seconds (exclusive)
    pub end_time: f64,
    pub start_word_index: usize,
    /// Exclusive; equals the word count for the last chapter
    pub end_word_index: usize,
}

impl Chapter {
    /// Returns the chapter duration in seconds
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Checks if a given position falls within this chapter
    pub fn contains(&self, position: f64) -> bool {
        position >= self.start_time && position < self.end_time
    }
}
