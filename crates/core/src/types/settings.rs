//! Global reader settings
//!
//! One record shared by every book. Field names follow the persisted JSON
//! shape (`fontScale`, `playbackSpeed`, ...).

use crate::types::{PlaybackSpeed, Validator, Volume};
use serde::{Deserialize, Serialize};

/// Colors used by the word display, as `#rrggbb` strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorScheme {
    pub background: String,
    pub text: String,
    /// Color of the focus letter in the displayed word
    pub focus: String,
    /// Color of the surrounding context words
    pub context: String,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            background: "#111111".to_string(),
            text: "#f5f5f5".to_string(),
            focus: "#e53935".to_string(),
            context: "#777777".to_string(),
        }
    }
}

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub colors: ColorScheme,
    pub font_scale: f32,
    pub playback_speed: PlaybackSpeed,
    pub volume: Volume,
    /// Show the words around the current one
    pub show_context: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            colors: ColorScheme::default(),
            font_scale: 1.0,
            playback_speed: PlaybackSpeed::default(),
            volume: Volume::default(),
            show_context: true,
        }
    }
}

impl Validator for Settings {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        for (name, value) in [
            ("background", &self.colors.background),
            ("text", &self.colors.text),
            ("focus", &self.colors.focus),
            ("context", &self.colors.context),
        ] {
            if !is_hex_color(value) {
                errors.push(format!("Color '{}' must be #rrggbb, got '{}'", name, value));
            }
        }

        if !(0.5..=3.0).contains(&self.font_scale) {
            errors.push("Font scale must be between 0.5 and 3.0".to_string());
        }

        if let Err(e) = self.playback_speed.validate() {
            errors.extend(e);
        }

        if let Err(e) = self.volume.validate() {
            errors.extend(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
