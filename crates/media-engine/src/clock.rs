//! Wall-clock media backend
//!
//! `ClockMedia` advances its position against the system clock at the current
//! rate. Hosts that route audio elsewhere (or render silently) use it to drive
//! the display. Acquisition checks that the segment file exists and that
//! symphonia recognises its container.

use crate::error::{MediaError, PlaybackRejected};
use crate::media::{MediaBackend, MediaHandle};
use audioreader_core::AudioSegment;
use std::path::{Path, PathBuf};
use std::time::Instant;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Probed and declared durations further apart than this are logged
const DURATION_MISMATCH_WARN_SECS: f64 = 1.0;

#[derive(Debug, Default, Clone)]
pub struct ClockBackend;

impl ClockBackend {
    pub fn new() -> Self {
        Self
    }
}

impl MediaBackend for ClockBackend {
    type Handle = ClockMedia;

    fn acquire(&mut self, segment: &AudioSegment) -> Result<ClockMedia, MediaError> {
        let path = PathBuf::from(&segment.source_ref);
        if !path.is_file() {
            return Err(MediaError::NotFound(path));
        }

        if let Some(probed) = probe_duration(&path)? {
            if (probed - segment.duration).abs() > DURATION_MISMATCH_WARN_SECS {
                log::warn!(
                    "{} is {:.1}s long but the alignment says {:.1}s",
                    path.display(),
                    probed,
                    segment.duration
                );
            }
        }

        log::debug!("Acquired {}", path.display());
        Ok(ClockMedia::new(segment.duration))
    }
}

/// Reads the container header and returns the default track's length when known
fn probe_duration(path: &Path) -> Result<Option<f64>, MediaError> {
    let file = std::fs::File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(extension);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| MediaError::Unsupported(format!("{}: {}", path.display(), e)))?;

    let track = probed
        .format
        .default_track()
        .ok_or_else(|| MediaError::Unsupported(format!("{}: no audio track", path.display())))?;

    let params = &track.codec_params;
    Ok(match (params.n_frames, params.sample_rate) {
        (Some(frames), Some(rate)) if rate > 0 => Some(frames as f64 / rate as f64),
        _ => None,
    })
}

#[derive(Debug)]
pub struct ClockMedia {
    duration: f64,
    /// Position when the clock was last (re)started or stopped
    position: f64,
    started_at: Option<Instant>,
    rate: f32,
    volume: f32,
    released: bool,
}

impl ClockMedia {
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            position: 0.0,
            started_at: None,
            rate: 1.0,
            volume: 1.0,
            released: false,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    fn time_at(&self, now: Instant) -> f64 {
        let elapsed = self
            .started_at
            .map_or(0.0, |start| now.duration_since(start).as_secs_f64());
        (self.position + elapsed * self.rate as f64).min(self.duration)
    }

    /// Folds elapsed time into `position` so rate changes apply from now on
    fn rebase(&mut self) {
        let now = Instant::now();
        self.position = self.time_at(now);
        if self.started_at.is_some() {
            self.started_at = Some(now);
        }
    }
}

impl MediaHandle for ClockMedia {
    async fn wait_ready(&mut self) -> Result<(), MediaError> {
        Ok(())
    }

    fn play(&mut self) -> Result<(), PlaybackRejected> {
        if self.released {
            return Err(PlaybackRejected::new("media has been released"));
        }
        if self.started_at.is_none() {
            self.started_at = Some(Instant::now());
        }
        Ok(())
    }

    fn pause(&mut self) {
        self.rebase();
        self.started_at = None;
    }

    fn current_time(&self) -> f64 {
        self.time_at(Instant::now())
    }

    fn set_current_time(&mut self, t: f64) {
        self.position = t.clamp(0.0, self.duration);
        if self.started_at.is_some() {
            self.started_at = Some(Instant::now());
        }
    }

    fn set_rate(&mut self, rate: f32) {
        self.rebase();
        self.rate = rate;
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    fn has_ended(&self) -> bool {
        self.current_time() >= self.duration
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn release(&mut self) {
        self.pause();
        self.released = true;
    }
}
