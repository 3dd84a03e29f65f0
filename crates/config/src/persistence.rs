//! Reading and writing `config.toml`
//!
//! Writes go through a temp file in the same directory followed by a rename,
//! and the previous file is kept as `config.toml.backup`.

use crate::{Config, ConfigError, ConfigResult, CONFIG_VERSION};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub(crate) struct ConfigFile {
    path: PathBuf,
}

impl ConfigFile {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn backup_path(&self) -> PathBuf {
        self.path.with_extension("toml.backup")
    }

    /// Missing file means defaults; an empty or unparseable one is an error.
    /// Files from an older version are upgraded and written back.
    pub(crate) fn read(&self) -> ConfigResult<Config> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("No config at {}, using defaults", self.path.display());
                return Ok(Config::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if text.trim().is_empty() {
            return Err(ConfigError::Read {
                path: self.path.clone(),
                source: io::Error::new(io::ErrorKind::InvalidData, "config file is empty"),
            });
        }

        let parsed: Config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        })?;

        let config = if parsed.version < CONFIG_VERSION {
            let upgraded = crate::migration::migrate_to_latest(parsed);
            self.write(&upgraded)?;
            upgraded
        } else {
            parsed
        };

        // Hand-edited files stay loadable so the user can fix them
        if let Err(errors) = config.validate() {
            for error in &errors {
                log::warn!("Config problem: {}", error);
            }
        }

        Ok(config)
    }

    /// Refuses invalid configs; otherwise backs up and replaces the file
    pub(crate) fn write(&self, config: &Config) -> ConfigResult<()> {
        if let Err(errors) = config.validate() {
            return Err(ConfigError::Invalid(errors));
        }

        let dir = self.path.parent().ok_or_else(|| ConfigError::Write {
            path: self.path.clone(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "no parent directory"),
        })?;
        if !dir.exists() {
            fs::create_dir_all(dir).map_err(|source| ConfigError::Write {
                path: dir.to_path_buf(),
                source,
            })?;
            log::info!("Created config directory {}", dir.display());
        }

        if self.exists() {
            let backup = self.backup_path();
            fs::copy(&self.path, &backup)
                .map_err(|source| ConfigError::Write { path: backup, source })?;
        }

        let text = toml::to_string_pretty(config)?;
        replace_file(dir, &self.path, &text)?;

        log::info!("Config saved to {}", self.path.display());
        Ok(())
    }
}

fn replace_file(dir: &Path, target: &Path, text: &str) -> ConfigResult<()> {
    let write_error = |source| ConfigError::Write {
        path: target.to_path_buf(),
        source,
    };
    let mut temp = NamedTempFile::new_in(dir).map_err(write_error)?;
    temp.write_all(text.as_bytes()).map_err(write_error)?;
    temp.flush().map_err(write_error)?;
    temp.persist(target).map_err(|e| write_error(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn config_file(dir: &TempDir) -> ConfigFile {
        ConfigFile::new(dir.path().join("config.toml"))
    }

    #[test]
    fn test_missing_file_reads_defaults() -> TestResult {
        let dir = TempDir::new()?;
        assert_eq!(config_file(&dir).read()?, Config::default());
        Ok(())
    }

    #[test]
    fn test_write_then_read() -> TestResult {
        let dir = TempDir::new()?;
        let file = config_file(&dir);

        let mut config = Config::default();
        config.player.skip_step_secs = 30.0;
        config.app.data_dir = Some(PathBuf::from("/tmp/audioreader-data"));
        file.write(&config)?;

        let loaded = file.read()?;
        assert_eq!(loaded.player.skip_step_secs, 30.0);
        assert_eq!(loaded.app.data_dir, config.app.data_dir);
        Ok(())
    }

    #[test]
    fn test_write_creates_directory() -> TestResult {
        let dir = TempDir::new()?;
        let file = ConfigFile::new(dir.path().join("nested").join("config.toml"));
        file.write(&Config::default())?;
        assert!(file.exists());
        Ok(())
    }

    #[test]
    fn test_overwrite_keeps_backup() -> TestResult {
        let dir = TempDir::new()?;
        let file = config_file(&dir);
        file.write(&Config::default())?;
        file.write(&Config::default())?;
        assert!(file.backup_path().is_file());
        Ok(())
    }

    #[test]
    fn test_unparseable_file() -> TestResult {
        let dir = TempDir::new()?;
        let file = config_file(&dir);
        fs::write(file.path(), "this is not valid TOML {{{")?;
        assert!(matches!(file.read(), Err(ConfigError::Parse { .. })));
        Ok(())
    }

    #[test]
    fn test_invalid_config_not_written() -> TestResult {
        let dir = TempDir::new()?;
        let file = config_file(&dir);

        let mut config = Config::default();
        config.player.frame_interval_ms = 0;
        assert!(matches!(
            file.write(&config),
            Err(ConfigError::Invalid(_))
        ));
        assert!(!file.exists());
        Ok(())
    }

    #[test]
    fn test_blank_file_is_an_error() -> TestResult {
        let dir = TempDir::new()?;
        let file = config_file(&dir);
        fs::write(file.path(), "   \n")?;
        assert!(matches!(file.read(), Err(ConfigError::Read { .. })));
        Ok(())
    }

    #[test]
    fn test_old_version_upgraded_on_disk() -> TestResult {
        let dir = TempDir::new()?;
        let file = config_file(&dir);
        fs::write(file.path(), "version = 0\n[player]\nskip_step_secs = 20.0\n")?;

        let config = file.read()?;
        assert_eq!(config.version, CONFIG_VERSION);
        assert_eq!(config.player.skip_step_secs, 20.0);

        let on_disk = fs::read_to_string(file.path())?;
        assert!(on_disk.contains(&format!("version = {}", CONFIG_VERSION)));
        Ok(())
    }
}
