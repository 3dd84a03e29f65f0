//! Configuration migration
//!
//! Older files are brought up to `CONFIG_VERSION`. Fields introduced since the
//! file was written are filled from defaults by serde, so upgrading consists of
//! re-stamping the version once the file has been parsed.

use crate::{Config, CONFIG_VERSION};

/// Migrates a config from its current version to the latest version
pub fn migrate_to_latest(mut config: Config) -> Config {
    if config.version == CONFIG_VERSION {
        return config;
    }

    if config.version > CONFIG_VERSION {
        log::warn!(
            "Config version {} is newer than supported version {}. Attempting to use as-is.",
            config.version,
            CONFIG_VERSION
        );
        return config;
    }

    log::info!(
        "Migrating config from version {} to {}",
        config.version,
        CONFIG_VERSION
    );
    config.version = CONFIG_VERSION;
    config
}
