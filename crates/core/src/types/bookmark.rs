//! Bookmark domain model

use crate::types::{Timestamp, Validator};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a bookmark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookmarkId(Uuid);

impl BookmarkId {
    /// Creates a new random BookmarkId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a BookmarkId from a UUID string
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    /// Returns the BookmarkId as a string
    pub fn as_string(&self) -> String {
        self.0.to_string()
    }
}

impl Default for BookmarkId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BookmarkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user bookmark, carrying the reading context captured when it was made
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: BookmarkId,
    /// Global timeline position in seconds
    pub position: f64,
    pub label: String,
    pub word_at_position: String,
    pub context_snippet: String,
    pub chapter_title: Option<String>,
    pub created_at: Timestamp,
}

impl Bookmark {
    /// Creates a bookmark at `position` with a fresh id
    pub fn new(position: f64, label: impl Into<String>) -> Self {
        Self {
            id: BookmarkId::new(),
            position,
            label: label.into(),
            word_at_position: String::new(),
            context_snippet: String::new(),
            chapter_title: None,
            created_at: Timestamp::now(),
        }
    }

    /// Attaches the word and surrounding context active at the position
    pub fn with_context(
        mut self,
        word: impl Into<String>,
        snippet: impl Into<String>,
        chapter_title: Option<String>,
    ) -> Self {
        self.word_at_position = word.into();
        self.context_snippet = snippet.into();
        self.chapter_title = chapter_title;
        self
    }

    /// Renames the bookmark
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }
}

impl Validator for Bookmark {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if !self.position.is_finite() || self.position < 0.0 {
            errors.push("Bookmark position must be a non-negative number".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
