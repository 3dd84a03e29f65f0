//! Global reader settings

use crate::error::StorageResult;
use crate::kv::{read_json, write_json, KeyValueStore};
use audioreader_core::{Settings, Validator};

pub const SETTINGS_KEY: &str = "settings";

#[derive(Debug, Clone)]
pub struct SettingsStore<K> {
    kv: K,
}

impl<K: KeyValueStore> SettingsStore<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    /// Loads the stored settings, falling back to defaults when the record is
    /// missing, unreadable or invalid
    pub fn load(&self) -> Settings {
        match read_json::<_, Settings>(&self.kv, SETTINGS_KEY) {
            Ok(Some(settings)) => match settings.validate() {
                Ok(()) => settings,
                Err(errors) => {
                    log::warn!("Ignoring stored settings: {}", errors.join("; "));
                    Settings::default()
                }
            },
            Ok(None) => Settings::default(),
            Err(e) => {
                log::warn!("{}; using default settings", e);
                Settings::default()
            }
        }
    }

    pub fn save(&self, settings: &Settings) -> StorageResult<()> {
        write_json(&self.kv, SETTINGS_KEY, settings)
    }
}
