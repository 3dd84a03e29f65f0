use serde::{Deserialize, Serialize};

/// One audio file of a multi-part book, placed on the book's timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioSegment {
    /// Where the host audio subsystem finds the media (a path for local files)
    #[serde(rename = "file")]
    pub source_ref: String,
    /// Start of this segment on the global timeline, in seconds
    pub offset: f64,
    /// Length of the segment in seconds
    pub duration: f64,
}

impl AudioSegment {
    pub fn new(source_ref: impl Into<String>, offset: f64, duration: f64) -> Self {
        Self {
            source_ref: source_ref.into(),
            offset,
            duration,
        }
    }

    /// Global time at which this segment ends (exclusive)
    pub fn end(&self) -> f64 {
        self.offset + self.duration
    }

    /// Checks if a global time falls within this segment
    pub fn contains(&self, global_time: f64) -> bool {
        global_time >= self.offset && global_time < self.end()
    }
}
