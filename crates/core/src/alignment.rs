//! Alignment data produced by the transcription pipeline
//!
//! The file is read once when a book is opened. Everything downstream relies on
//! the sequences being sorted and on the segments tiling the timeline, so those
//! invariants are checked here and a violation rejects the whole file.

use crate::error::{LoadError, LoadResult};
use crate::types::{AudioSegment, Chapter, Word};
use serde::{Deserialize, Serialize};

/// Name of the alignment file inside a book directory
pub const ALIGNMENT_FILE_NAME: &str = "alignment_compact.json";

/// Slack allowed when comparing timestamps from independent sources, in seconds
pub const TIME_TOLERANCE: f64 = 0.05;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alignment {
    pub title: String,
    #[serde(default = "unknown_author")]
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub total_duration: f64,
    #[serde(default)]
    pub words: Vec<Word>,
    #[serde(rename = "parts")]
    pub segments: Vec<AudioSegment>,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
}

fn unknown_author() -> String {
    "Unknown Author".to_string()
}

impl Alignment {
    /// Parses and validates alignment JSON
    pub fn from_json(json: &str) -> LoadResult<Self> {
        let alignment: Alignment = serde_json::from_str(json)?;
        alignment.validate()?;
        Ok(alignment)
    }

    /// Checks every load-time invariant
    pub fn validate(&self) -> LoadResult<()> {
        if !self.total_duration.is_finite() || self.total_duration <= 0.0 {
            return Err(LoadError::invalid(
                "total_duration",
                format!("must be positive, got {}", self.total_duration),
            ));
        }

        self.validate_segments()?;
        self.validate_words()?;
        self.validate_chapters()
    }

    fn validate_segments(&self) -> LoadResult<()> {
        let first = self
            .segments
            .first()
            .ok_or_else(|| LoadError::invalid("parts", "book has no audio segments"))?;

        if first.offset.abs() > TIME_TOLERANCE {
            return Err(LoadError::invalid(
                "parts[0].offset",
                format!("first segment must start at 0, got {:.3}", first.offset),
            ));
        }

        for (i, seg) in self.segments.iter().enumerate() {
            if !seg.duration.is_finite() || seg.duration <= 0.0 {
                return Err(LoadError::invalid(
                    format!("parts[{}].duration", i),
                    format!("must be positive, got {}", seg.duration),
                ));
            }
        }

        for (i, pair) in self.segments.windows(2).enumerate() {
            let gap = pair[1].offset - pair[0].end();
            if gap.abs() > TIME_TOLERANCE {
                return Err(LoadError::invalid(
                    format!("parts[{}].offset", i + 1),
                    format!("segments are not contiguous (gap of {:.3}s)", gap),
                ));
            }
        }

        // first() succeeded above, so last() is present
        if let Some(last) = self.segments.last() {
            let drift = last.end() - self.total_duration;
            if drift.abs() > TIME_TOLERANCE {
                return Err(LoadError::invalid(
                    "total_duration",
                    format!(
                        "segments end at {:.3}s but total_duration is {:.3}s",
                        last.end(),
                        self.total_duration
                    ),
                ));
            }
        }

        Ok(())
    }

    fn validate_words(&self) -> LoadResult<()> {
        for (i, word) in self.words.iter().enumerate() {
            if !word.start.is_finite() || !word.end.is_finite() || word.start < 0.0 {
                return Err(LoadError::invalid(
                    format!("words[{}]", i),
                    "timestamps must be non-negative numbers",
                ));
            }
            if word.end < word.start {
                return Err(LoadError::invalid(
                    format!("words[{}]", i),
                    format!("ends ({:.3}) before it starts ({:.3})", word.end, word.start),
                ));
            }
            if word.end > self.total_duration + TIME_TOLERANCE {
                return Err(LoadError::invalid(
                    format!("words[{}]", i),
                    format!("ends after the book ({:.3}s)", self.total_duration),
                ));
            }
        }

        for (i, pair) in self.words.windows(2).enumerate() {
            if pair[1].start < pair[0].start {
                return Err(LoadError::invalid(
                    format!("words[{}]", i + 1),
                    "words are not sorted by start time",
                ));
            }
            if pair[0].end > pair[1].start + TIME_TOLERANCE {
                return Err(LoadError::invalid(
                    format!("words[{}]", i + 1),
                    "overlaps the previous word",
                ));
            }
        }

        Ok(())
    }

    fn validate_chapters(&self) -> LoadResult<()> {
        let word_count = self.words.len();

        for (i, ch) in self.chapters.iter().enumerate() {
            if ch.end_time < ch.start_time {
                return Err(LoadError::invalid(
                    format!("chapters[{}]", i),
                    "ends before it starts",
                ));
            }
            if ch.start_word_index > ch.end_word_index || ch.end_word_index > word_count {
                return Err(LoadError::invalid(
                    format!("chapters[{}]", i),
                    format!(
                        "word range {}..{} is outside 0..{}",
                        ch.start_word_index, ch.end_word_index, word_count
                    ),
                ));
            }
            if ch.start_time > self.total_duration + TIME_TOLERANCE {
                return Err(LoadError::invalid(
                    format!("chapters[{}]", i),
                    "starts after the end of the book",
                ));
            }
        }

        for (i, pair) in self.chapters.windows(2).enumerate() {
            if pair[1].start_time < pair[0].start_time {
                return Err(LoadError::invalid(
                    format!("chapters[{}]", i + 1),
                    "chapters are not sorted by start time",
                ));
            }
        }

        Ok(())
    }
}
