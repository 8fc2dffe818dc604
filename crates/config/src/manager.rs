//! Entry point for loading and saving Libris settings

use crate::persistence::SettingsFile;
use crate::{Config, ConfigError, ConfigResult, ValidationError, CONFIG_FILE_NAME};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Environment variable naming the library data file
pub const ENV_DATA_FILE: &str = "LIBRIS_DATA_FILE";
/// Environment variable overriding `[app] log_level`
pub const ENV_LOG_LEVEL: &str = "LIBRIS_LOG_LEVEL";
/// Environment variable overriding `[storage] autosave`
pub const ENV_AUTOSAVE: &str = "LIBRIS_AUTOSAVE";

/// Owns the location of `config.toml` and every operation on it
pub struct ConfigManager {
    config_dir: PathBuf,
    file: SettingsFile,
}

impl ConfigManager {
    /// Uses the platform config directory (`~/.config/libris` on Linux)
    pub fn new() -> ConfigResult<Self> {
        let dirs = ProjectDirs::from("", "", "libris").ok_or(ConfigError::NoConfigDir)?;
        Ok(Self::with_directory(dirs.config_dir().to_path_buf()))
    }

    /// Uses `config_dir` instead of the platform directory
    pub fn with_directory(config_dir: PathBuf) -> Self {
        let file = SettingsFile::new(config_dir.join(CONFIG_FILE_NAME));
        Self { config_dir, file }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_path(&self) -> &Path {
        self.file.path()
    }

    /// Path of the copy kept from the previous save
    pub fn backup_path(&self) -> PathBuf {
        self.file.backup_path()
    }

    pub fn load(&self) -> ConfigResult<Config> {
        self.file.read()
    }

    pub fn load_or_default(&self) -> Config {
        self.load().unwrap_or_else(|e| {
            log::warn!("{}, using default settings", e);
            Config::default()
        })
    }

    pub fn save(&self, config: &Config) -> ConfigResult<()> {
        self.file.write(config)
    }

    /// Load, modify, save
    pub fn update(&self, change: impl FnOnce(&mut Config)) -> ConfigResult<()> {
        let mut config = self.load()?;
        change(&mut config);
        self.save(&config)
    }

    /// Writes default settings unless a file already exists.
    ///
    /// Returns whether a file was created.
    pub fn initialize(&self) -> ConfigResult<bool> {
        if self.config_path().exists() {
            return Ok(false);
        }
        self.save(&Config::default())?;
        Ok(true)
    }

    pub fn reset(&self) -> ConfigResult<()> {
        self.save(&Config::default())
    }

    /// Problems in the file as it is on disk
    pub fn validate(&self) -> ConfigResult<Vec<ValidationError>> {
        Ok(self.load()?.validate().err().unwrap_or_default())
    }

    /// Loads the file, then applies `LIBRIS_DATA_FILE`, `LIBRIS_LOG_LEVEL`
    /// and `LIBRIS_AUTOSAVE` from the process environment
    pub fn load_with_env_overrides(&self) -> ConfigResult<Config> {
        let mut config = self.load()?;
        apply_overrides(&mut config, |name| std::env::var(name).ok());
        Ok(config)
    }
}

/// Applies environment-style overrides looked up through `lookup`.
///
/// Unusable values are logged and skipped.
pub fn apply_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(path) = lookup(ENV_DATA_FILE).filter(|p| !p.trim().is_empty()) {
        config.storage.data_file = Some(PathBuf::from(path));
    }

    if let Some(level) = lookup(ENV_LOG_LEVEL) {
        match level.parse() {
            Ok(level) => config.app.log_level = level,
            Err(e) => log::warn!("Ignoring {}: {}", ENV_LOG_LEVEL, e),
        }
    }

    if let Some(autosave) = lookup(ENV_AUTOSAVE) {
        match autosave.trim().parse() {
            Ok(value) => config.storage.autosave = value,
            Err(_) => log::warn!("Ignoring {}: expected true or false", ENV_AUTOSAVE),
        }
    }
}
