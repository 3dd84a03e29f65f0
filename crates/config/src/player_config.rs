//! Player configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Player timing and navigation behavior
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlayerConfig {
    /// Display refresh interval while playing, in milliseconds
    pub frame_interval_ms: u64,

    /// Auto-save playback position interval in seconds
    pub autosave_interval_secs: u64,

    /// Saved positions at or below this are not resumed, in seconds
    pub resume_threshold_secs: f64,

    /// How long to wait for each audio segment to become ready on open
    pub segment_ready_timeout_ms: u64,

    /// Distance of a skip forward/back, in seconds
    pub skip_step_secs: f64,

    /// Playback speed change step
    pub speed_step: f32,
}

impl PlayerConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    pub fn autosave_interval(&self) -> Duration {
        Duration::from_secs(self.autosave_interval_secs)
    }

    pub fn segment_ready_timeout(&self) -> Duration {
        Duration::from_millis(self.segment_ready_timeout_ms)
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 16,
            autosave_interval_secs: 5,
            resume_threshold_secs: 5.0,
            segment_ready_timeout_ms: 10_000,
            skip_step_secs: 10.0,
            speed_step: 0.1,
        }
    }
}

impl ConfigSection for PlayerConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Validator::collect_errors(vec![
            Validator::in_range(self.frame_interval_ms, 5, 1000, "player.frame_interval_ms"),
            Validator::in_range(
                self.autosave_interval_secs,
                1,
                300,
                "player.autosave_interval_secs",
            ),
            Validator::in_range(
                self.resume_threshold_secs,
                0.0,
                600.0,
                "player.resume_threshold_secs",
            ),
            Validator::in_range(
                self.segment_ready_timeout_ms,
                100,
                120_000,
                "player.segment_ready_timeout_ms",
            ),
            Validator::in_range(self.skip_step_secs, 1.0, 600.0, "player.skip_step_secs"),
            Validator::in_range(self.speed_step, 0.05, 0.5, "player.speed_step"),
        ])
    }

    fn merge(&mut self, other: Self) {
        self.frame_interval_ms = other.frame_interval_ms;
        self.autosave_interval_secs = other.autosave_interval_secs;
        self.resume_threshold_secs = other.resume_threshold_secs;
        self.segment_ready_timeout_ms = other.segment_ready_timeout_ms;
        self.skip_step_secs = other.skip_step_secs;
        self.speed_step = other.speed_step;
    }

    fn section_name(&self) -> &'static str {
        "player"
    }
}
