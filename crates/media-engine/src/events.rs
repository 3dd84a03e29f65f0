//! Notifications emitted by the controller

use crate::state::EngineState;
use audioreader_core::{Chapter, Word};
use crossbeam_channel::Sender;

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// The displayed word changed (or was re-reported after a seek)
    WordChanged { index: usize, word: Word },
    /// Playback entered a chapter
    ChapterChanged { index: usize, chapter: Chapter },
    /// Position on the global timeline, emitted every tick and on seeks
    Progress { time: f64, percent: f64 },
    /// Playback ran off the end of the last segment
    Finished,
    /// An open failed; the reason is suitable for display
    LoadError { reason: String },
    /// The host refused to start audio; the player stays in `Playing`
    PlaybackBlocked { reason: String },
    StateChanged { state: EngineState },
}

/// Sending half of the event channel
///
/// A dropped receiver is not an error: the engine keeps running headless.
#[derive(Debug, Clone)]
pub struct EventSink {
    sender: Sender<PlayerEvent>,
}

impl EventSink {
    pub fn new(sender: Sender<PlayerEvent>) -> Self {
        Self { sender }
    }

    pub fn emit(&self, event: PlayerEvent) {
        if self.sender.send(event).is_err() {
            log::trace!("Event receiver dropped");
        }
    }
}
