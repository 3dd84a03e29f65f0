// FILE: crates/media-engine/src/chapters.rs
//! Chapter navigation

use audioreader_core::Chapter;

/// A chapter to jump to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChapterTarget {
    /// Absolute, 0-based chapter index
    Index(usize),
    /// Offset from the current chapter (`1` is next, `-1` previous)
    Relative(i64),
}

/// Chapters of the open book, with the chapter currently being played
#[derive(Debug, Clone, Default)]
pub struct ChapterList {
    chapters: Vec<Chapter>,
    current_index: Option<usize>,
}

impl ChapterList {
    /// Creates a chapter list; chapters must be sorted by start time
    pub fn new(chapters: Vec<Chapter>) -> Self {
        Self {
            chapters,
            current_index: None,
        }
    }

    /// Returns the total number of chapters
    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    /// Returns true if there are chapters
    pub fn has_chapters(&self) -> bool {
        !self.chapters.is_empty()
    }

    /// Gets a chapter by index
    pub fn get_chapter(&self, index: usize) -> Option<&Chapter> {
        self.chapters.get(index)
    }

    /// Gets the current chapter
    pub fn current_chapter(&self) -> Option<&Chapter> {
        self.current_index.and_then(|idx| self.chapters.get(idx))
    }

    /// Gets the current chapter index
    pub fn current_chapter_index(&self) -> Option<usize> {
        self.current_index
    }

    /// Index of the last chapter starting at or before `t`
    ///
    /// `None` when there are no chapters or `t` precedes the first one.
    pub fn chapter_index_at(&self, t: f64) -> Option<usize> {
        self.chapters.iter().rposition(|ch| ch.start_time <= t)
    }

    /// Updates the current chapter for a position
    ///
    /// Returns the new index when the position entered a different chapter.
    pub fn update_position(&mut self, t: f64) -> Option<usize> {
        let index = self.chapter_index_at(t);
        if index == self.current_index {
            return None;
        }
        self.current_index = index;
        index
    }

    /// Resolves a target to a chapter index, relative to the current chapter
    ///
    /// Before the first chapter, `Relative(1)` resolves to chapter 0.
    pub fn resolve(&self, target: ChapterTarget) -> Option<usize> {
        let index = match target {
            ChapterTarget::Index(index) => index as i64,
            ChapterTarget::Relative(delta) => {
                let base = self.current_index.map_or(-1, |idx| idx as i64);
                base.saturating_add(delta)
            }
        };

        if index >= 0 && (index as usize) < self.chapters.len() {
            Some(index as usize)
        } else {
            None
        }
    }

    /// Returns all chapters
    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    /// Returns formatted chapter info (e.g., "3/15")
    pub fn chapter_progress(&self) -> String {
        match (self.current_index, self.chapter_count()) {
            (Some(idx), count) if count > 0 => format!("{}/{}", idx + 1, count),
            (None, count) if count > 0 => format!("-/{}", count),
            _ => "No chapters".to_string(),
        }
    }
}
