//! AudioReader Configuration System
//!
//! Application configuration is a TOML file with one table per `ConfigSection`.
//!
//! # Architecture
//!
//! - **Trait-based**: each section is a type implementing `ConfigSection`
//! - **Graceful degradation**: invalid configs load with warnings, and callers can
//!   fall back to defaults with `ConfigManager::load_or_default`
//! - **Atomic writes**: config files are never left half-written
//! - **Overrides**: `AUDIOREADER_<SECTION>_<FIELD>` environment variables win over the file
//!
//! # Example
//!
//! ```rust,no_run
//! use audioreader_config::ConfigManager;
//!
//! let manager = ConfigManager::new().expect("Failed to initialize config");
//! let config = manager.load_or_default();
//! println!("Books live in {}", config.app.books_dir.display());
//! ```

mod error;
mod manager;
mod migration;
mod persistence;
mod validation;

// Config sections
pub mod app_config;
mod player_config;

pub use error::{ConfigError, ConfigResult, ValidationError};
pub use manager::ConfigManager;
pub use validation::{ConfigSection, Validator};

pub use app_config::{AppConfig, LogLevel};
pub use player_config::PlayerConfig;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Current config file format version for migrations
pub const CONFIG_VERSION: u32 = 1;

/// Prefix of environment variables that override file values
pub const ENV_PREFIX: &str = "AUDIOREADER";

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Config file format version
    pub version: u32,

    /// Application-level settings
    pub app: AppConfig,

    /// Player timing and navigation
    pub player: PlayerConfig,
}

impl Config {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates the entire configuration
    ///
    /// Returns all validation errors found across all sections.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(mut e) = self.app.validate() {
            errors.append(&mut e);
        }

        if let Err(mut e) = self.player.validate() {
            errors.append(&mut e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Merges this config with another, preferring values from `other`
    ///
    /// This is used for override chains: defaults < file < env vars < CLI args
    pub fn merge(&mut self, other: Config) {
        self.app.merge(other.app);
        self.player.merge(other.player);
    }

    /// Applies `AUDIOREADER_<SECTION>_<FIELD>` overrides obtained from `lookup`
    ///
    /// Values that fail to parse are logged and ignored. Returns the number of
    /// overrides applied.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> usize
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut applied = 0;
        let var = |section: &str, field: &str| {
            let name = format!("{}_{}_{}", ENV_PREFIX, section, field);
            lookup(&name).map(|value| (name, value))
        };

        if let Some((name, value)) = var("APP", "LOG_LEVEL") {
            applied += set_parsed(&name, &value, &mut self.app.log_level);
        }
        if let Some((_, value)) = var("APP", "BOOKS_DIR") {
            self.app.books_dir = PathBuf::from(value);
            applied += 1;
        }
        if let Some((_, value)) = var("APP", "DATA_DIR") {
            self.app.data_dir = Some(PathBuf::from(value));
            applied += 1;
        }

        let player = &mut self.player;
        if let Some((name, value)) = var("PLAYER", "FRAME_INTERVAL_MS") {
            applied += set_parsed(&name, &value, &mut player.frame_interval_ms);
        }
        if let Some((name, value)) = var("PLAYER", "AUTOSAVE_INTERVAL_SECS") {
            applied += set_parsed(&name, &value, &mut player.autosave_interval_secs);
        }
        if let Some((name, value)) = var("PLAYER", "RESUME_THRESHOLD_SECS") {
            applied += set_parsed(&name, &value, &mut player.resume_threshold_secs);
        }
        if let Some((name, value)) = var("PLAYER", "SEGMENT_READY_TIMEOUT_MS") {
            applied += set_parsed(&name, &value, &mut player.segment_ready_timeout_ms);
        }
        if let Some((name, value)) = var("PLAYER", "SKIP_STEP_SECS") {
            applied += set_parsed(&name, &value, &mut player.skip_step_secs);
        }
        if let Some((name, value)) = var("PLAYER", "SPEED_STEP") {
            applied += set_parsed(&name, &value, &mut player.speed_step);
        }

        applied
    }
}

fn set_parsed<T: FromStr>(name: &str, value: &str, target: &mut T) -> usize {
    match value.trim().parse::<T>() {
        Ok(parsed) => {
            *target = parsed;
            log::debug!("Applied override {}={}", name, value);
            1
        }
        Err(_) => {
            log::warn!("Ignoring {}: cannot parse '{}'", name, value);
            0
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            app: AppConfig::default(),
            player: PlayerConfig::default(),
        }
    }
}
