//! Libris settings store
//!
//! Settings live in a TOML file, `config.toml`, in the platform config
//! directory. Each table is a type implementing [`ConfigSection`]:
//!
//! - `[system]`: the simulated clock override (`UseCustomTime`, `CustomDate`)
//! - `[storage]`: data file location and autosave
//! - `[app]`: log level and terminal colors
//!
//! A missing file yields defaults. Saves are validated and atomic.
//!
//! # Example
//!
//! ```rust,no_run
//! use libris_config::ConfigManager;
//!
//! # fn main() -> Result<(), libris_config::ConfigError> {
//! let manager = ConfigManager::new()?;
//! let config = manager.load_with_env_overrides()?;
//! if let Some(date) = config.system.clock_override() {
//!     println!("Library clock fixed at {}", date);
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod manager;
mod persistence;
mod validation;

pub mod app_config;
pub mod storage_config;
pub mod system_config;

pub use error::{ConfigError, ConfigResult};
pub use manager::{apply_overrides, ConfigManager, ENV_AUTOSAVE, ENV_DATA_FILE, ENV_LOG_LEVEL};
pub use validation::{ConfigSection, Findings, ValidationError};

pub use app_config::{AppConfig, LogLevel};
pub use storage_config::StorageConfig;
pub use system_config::SystemConfig;

use serde::{Deserialize, Serialize};

/// Name of the settings file inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Simulated clock
    pub system: SystemConfig,

    /// Data file location
    pub storage: StorageConfig,

    /// Logging and colors
    pub app: AppConfig,
}

impl Config {
    /// Every problem across all tables, in file order
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut findings = Findings::default();
        findings.check_section(&self.system);
        findings.check_section(&self.storage);
        findings.check_section(&self.app);
        findings.finish()
    }

    /// Layers `other` on top, table by table
    pub fn merge(&mut self, other: Config) {
        self.system.merge(other.system);
        self.storage.merge(other.storage);
        self.app.merge(other.app);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_install_settings_pass() {
        assert_eq!(Config::default().validate(), Ok(()));
    }

    #[test]
    fn test_merge_layers_each_table() {
        let mut base = Config::default();
        let mut layer = Config::default();
        layer.app.log_level = LogLevel::Trace;
        layer.storage.autosave = false;

        base.merge(layer);
        assert_eq!(base.app.log_level, LogLevel::Trace);
        assert!(!base.storage.autosave);
        assert!(!base.system.use_custom_time);
    }

    #[test]
    fn test_validate_reports_every_section() {
        let mut config = Config::default();
        config.system.use_custom_time = true;
        config.storage.data_file = Some(std::path::PathBuf::new());

        let errors = config.validate().unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["system.CustomDate", "storage.data_file"]);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str("[storage]\nautosave = false\n").unwrap();
        assert!(!config.storage.autosave);
        assert_eq!(config.system, SystemConfig::default());
        assert_eq!(config.app, AppConfig::default());
    }
}
