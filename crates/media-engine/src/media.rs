//! Seams to the host audio subsystem
//!
//! The engine never decodes audio. Each segment is played by a handle obtained
//! from a `MediaBackend`; the controller only asks it for time, rate, volume and
//! whether it has reached its end.

use crate::error::{MediaError, PlaybackRejected};
use audioreader_core::AudioSegment;

/// A playable handle for one audio segment
#[allow(async_fn_in_trait)]
pub trait MediaHandle {
    /// Resolves once the media can start playing without stalling
    async fn wait_ready(&mut self) -> Result<(), MediaError>;

    /// Requests playback start. The host may refuse.
    fn play(&mut self) -> Result<(), PlaybackRejected>;

    fn pause(&mut self);

    /// Position within the segment, in seconds
    fn current_time(&self) -> f64;

    fn set_current_time(&mut self, t: f64);

    fn set_rate(&mut self, rate: f32);

    fn set_volume(&mut self, volume: f32);

    /// True once playback has run off the end of the segment
    fn has_ended(&self) -> bool;

    fn duration(&self) -> f64;

    /// Frees the underlying resources; the handle is unusable afterwards
    fn release(&mut self);
}

/// Produces media handles for segments
pub trait MediaBackend {
    type Handle: MediaHandle;

    fn acquire(&mut self, segment: &AudioSegment) -> Result<Self::Handle, MediaError>;
}
