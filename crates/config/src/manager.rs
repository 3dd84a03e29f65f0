//! Configuration manager

use crate::persistence::ConfigFile;
use crate::{Config, ConfigError, ConfigResult};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "audioreader";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Entry point for loading and saving `config.toml`
///
/// The default location is the platform config directory
/// (`~/.config/audioreader/` on Linux).
pub struct ConfigManager {
    config_dir: PathBuf,
    file: ConfigFile,
}

impl ConfigManager {
    pub fn new() -> ConfigResult<Self> {
        let dirs = project_dirs()?;
        Self::with_directory(dirs.config_dir().to_path_buf())
    }

    /// Uses `config_dir` instead of the platform directory
    pub fn with_directory(config_dir: PathBuf) -> ConfigResult<Self> {
        let file = ConfigFile::new(config_dir.join(CONFIG_FILE_NAME));
        Ok(Self { config_dir, file })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_path(&self) -> PathBuf {
        self.file.path().to_path_buf()
    }

    /// Defaults when the file is missing, an error when it is unreadable
    pub fn load(&self) -> ConfigResult<Config> {
        self.file.read()
    }

    /// Never fails; problems are logged and defaults returned
    pub fn load_or_default(&self) -> Config {
        self.load().unwrap_or_else(|e| {
            log::warn!("Failed to load config: {}, using defaults", e);
            Config::default()
        })
    }

    /// Validates, then writes atomically
    pub fn save(&self, config: &Config) -> ConfigResult<()> {
        self.file.write(config)
    }

    /// Load, modify, save
    ///
    /// ```rust,no_run
    /// # use audioreader_config::ConfigManager;
    /// # let manager = ConfigManager::new().unwrap();
    /// manager.update(|config| {
    ///     config.player.skip_step_secs = 15.0;
    /// }).expect("Failed to update config");
    /// ```
    pub fn update<F>(&self, update_fn: F) -> ConfigResult<()>
    where
        F: FnOnce(&mut Config),
    {
        let mut config = self.load()?;
        update_fn(&mut config);
        self.save(&config)
    }

    /// Writes a default file unless one exists. Returns whether it wrote.
    pub fn initialize(&self) -> ConfigResult<bool> {
        if self.file.exists() {
            return Ok(false);
        }
        self.save(&Config::default())?;
        Ok(true)
    }

    pub fn reset(&self) -> ConfigResult<()> {
        self.save(&Config::default())
    }

    /// Problems in the file on disk, as display strings
    pub fn validate(&self) -> ConfigResult<Vec<String>> {
        let config = self.load()?;
        Ok(config
            .validate()
            .err()
            .unwrap_or_default()
            .iter()
            .map(|e| e.to_string())
            .collect())
    }

    /// Loads the file, then applies `AUDIOREADER_<SECTION>_<FIELD>` variables
    pub fn load_with_env_overrides(&self) -> ConfigResult<Config> {
        let mut config = self.load()?;

        let applied = config.apply_overrides(|name| std::env::var(name).ok());
        if applied > 0 {
            log::info!("Applied {} environment override(s)", applied);
            if let Err(errors) = config.validate() {
                log::warn!("Config has problems after overrides: {:?}", errors);
            }
        }

        Ok(config)
    }

    /// Where reader state lives: `app.data_dir`, else the platform data
    /// directory, else `data/` next to the config file
    pub fn data_dir(&self, config: &Config) -> PathBuf {
        if let Some(dir) = &config.app.data_dir {
            return dir.clone();
        }

        project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|_| self.config_dir.join("data"))
    }
}

fn project_dirs() -> ConfigResult<ProjectDirs> {
    ProjectDirs::from("", "", APP_NAME).ok_or(ConfigError::NoConfigDir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn manager() -> Result<(TempDir, ConfigManager), Box<dyn std::error::Error>> {
        let dir = TempDir::new()?;
        let manager = ConfigManager::with_directory(dir.path().to_path_buf())?;
        Ok((dir, manager))
    }

    #[test]
    fn test_missing_file_gives_defaults() -> TestResult {
        let (_dir, manager) = manager()?;
        assert_eq!(manager.load_or_default(), Config::default());
        Ok(())
    }

    #[test]
    fn test_update_persists() -> TestResult {
        let (_dir, manager) = manager()?;
        manager.update(|config| config.player.speed_step = 0.25)?;
        assert_eq!(manager.load()?.player.speed_step, 0.25);
        Ok(())
    }

    #[test]
    fn test_initialize_only_once() -> TestResult {
        let (_dir, manager) = manager()?;
        assert!(manager.initialize()?);
        assert!(manager.config_path().exists());
        assert!(!manager.initialize()?);
        Ok(())
    }

    #[test]
    fn test_reset_restores_defaults() -> TestResult {
        let (_dir, manager) = manager()?;
        let mut config = Config::default();
        config.player.autosave_interval_secs = 60;
        manager.save(&config)?;

        manager.reset()?;
        assert_eq!(manager.load()?, Config::default());
        Ok(())
    }

    #[test]
    fn test_validate_reports_nothing_for_defaults() -> TestResult {
        let (_dir, manager) = manager()?;
        manager.initialize()?;
        assert!(manager.validate()?.is_empty());
        Ok(())
    }

    #[test]
    fn test_invalid_config_rejected_on_save() -> TestResult {
        let (_dir, manager) = manager()?;
        let mut config = Config::default();
        config.player.autosave_interval_secs = 0;
        assert!(manager.save(&config).is_err());
        Ok(())
    }

    #[test]
    fn test_data_dir_prefers_config_value() -> TestResult {
        let (_dir, manager) = manager()?;
        let mut config = Config::default();
        config.app.data_dir = Some(PathBuf::from("/srv/audioreader"));
        assert_eq!(manager.data_dir(&config), PathBuf::from("/srv/audioreader"));
        Ok(())
    }

    #[test]
    fn test_data_dir_falls_back() -> TestResult {
        let (_dir, manager) = manager()?;
        assert!(!manager.data_dir(&Config::default()).as_os_str().is_empty());
        Ok(())
    }
}
