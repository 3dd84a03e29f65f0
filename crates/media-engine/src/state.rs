//! Controller state

use audioreader_core::{PlaybackSpeed, Volume};
use serde::Serialize;

/// Lifecycle of the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineState {
    /// No book open
    Idle,
    /// An open is in progress
    Loading,
    /// Book open, never started
    Ready,
    Playing,
    Paused,
    /// Played to the end of the last segment
    Finished,
    /// The last open failed and there was no book to fall back to
    Error,
}

impl EngineState {
    /// True when a book is open and commands can act on it
    pub fn has_session(&self) -> bool {
        matches!(
            self,
            Self::Ready | Self::Playing | Self::Paused | Self::Finished
        )
    }
}

impl std::fmt::Display for EngineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Finished => "finished",
            Self::Error => "error",
        };
        write!(f, "{}", name)
    }
}

/// Playback parameters of the open book
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlaybackState {
    pub active_segment_index: usize,
    pub is_playing: bool,
    pub speed: PlaybackSpeed,
    pub volume: Volume,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            active_segment_index: 0,
            is_playing: false,
            speed: PlaybackSpeed::default(),
            volume: Volume::default(),
        }
    }
}
