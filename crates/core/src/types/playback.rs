//! Validated playback values

use crate::types::Validator;
use serde::{Deserialize, Serialize};

/// Playback rate multiplier (0.25x - 3.0x)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaybackSpeed(f32);

impl PlaybackSpeed {
    pub const MIN: f32 = 0.25;
    pub const MAX: f32 = 3.0;

    /// Creates a new playback speed
    pub fn new(speed: f32) -> Result<Self, String> {
        if !(Self::MIN..=Self::MAX).contains(&speed) {
            Err(format!(
                "Speed must be between {} and {}",
                Self::MIN,
                Self::MAX
            ))
        } else {
            Ok(Self(speed))
        }
    }

    /// Creates a speed, clamping out-of-range values into range
    pub fn clamped(speed: f32) -> Self {
        if speed.is_nan() {
            return Self::default();
        }
        Self(speed.clamp(Self::MIN, Self::MAX))
    }

    /// Returns the speed value
    pub fn value(&self) -> f32 {
        self.0
    }
}

impl Default for PlaybackSpeed {
    fn default() -> Self {
        Self(1.0)
    }
}

impl Validator for PlaybackSpeed {
    fn validate(&self) -> Result<(), Vec<String>> {
        Self::new(self.0).map(|_| ()).map_err(|e| vec![e])
    }
}

/// Output volume (0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Volume(f32);

impl Volume {
    /// Creates a new volume
    pub fn new(volume: f32) -> Result<Self, String> {
        if !(0.0..=1.0).contains(&volume) {
            Err("Volume must be between 0.0 and 1.0".to_string())
        } else {
            Ok(Self(volume))
        }
    }

    /// Creates a volume, clamping out-of-range values into range
    pub fn clamped(volume: f32) -> Self {
        if volume.is_nan() {
            return Self::default();
        }
        Self(volume.clamp(0.0, 1.0))
    }

    /// Returns the volume value
    pub fn value(&self) -> f32 {
        self.0
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self(1.0)
    }
}

impl Validator for Volume {
    fn validate(&self) -> Result<(), Vec<String>> {
        Self::new(self.0).map(|_| ()).map_err(|e| vec![e])
    }
}
