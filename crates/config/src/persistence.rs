//! Reading and writing `config.toml`
//!
//! The previous file is copied to `config.toml.backup` before each write, and
//! the new contents replace the old through a temporary file in the same
//! directory.

use crate::{Config, ConfigError, ConfigResult};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub(crate) struct SettingsFile {
    path: PathBuf,
}

impl SettingsFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self) -> PathBuf {
        self.path.with_extension("toml.backup")
    }

    /// Reads the settings; a missing file means defaults.
    ///
    /// Values that parse but fail validation are only logged, so a stale
    /// clock override never stops the library from opening.
    pub fn read(&self) -> ConfigResult<Config> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("No settings at {}, using defaults", self.path.display());
                return Ok(Config::default());
            }
            Err(e) => return Err(ConfigError::io(&self.path, e)),
        };

        if text.trim().is_empty() {
            return Err(ConfigError::EmptyFile(self.path.clone()));
        }

        let config: Config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        })?;

        if let Err(errors) = config.validate() {
            for error in &errors {
                log::warn!("{}: {}", self.path.display(), error);
            }
        }

        Ok(config)
    }

    /// Validates `config`, backs up the current file and replaces it
    pub fn write(&self, config: &Config) -> ConfigResult<()> {
        config.validate().map_err(ConfigError::Invalid)?;
        let text = toml::to_string_pretty(config)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| ConfigError::io(dir, e))?;

        if self.path.exists() {
            let backup = self.backup_path();
            fs::copy(&self.path, &backup).map_err(|e| ConfigError::io(&backup, e))?;
            log::debug!("Previous settings kept at {}", backup.display());
        }

        let mut temp_file = NamedTempFile::new_in(dir).map_err(|e| ConfigError::io(dir, e))?;
        temp_file
            .write_all(text.as_bytes())
            .map_err(|e| ConfigError::io(&self.path, e))?;
        temp_file
            .flush()
            .map_err(|e| ConfigError::io(&self.path, e))?;
        temp_file
            .persist(&self.path)
            .map_err(|e| ConfigError::io(&self.path, e.error))?;

        log::info!("Settings saved to {}", self.path.display());
        Ok(())
    }
}
