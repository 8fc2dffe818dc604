//! Data file settings

use crate::validation::{ConfigSection, Findings};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where the library data file lives and when it is written
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StorageConfig {
    /// Overrides the platform default data file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,

    /// Save the data file after every mutating command
    pub autosave: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_file: None,
            autosave: true,
        }
    }
}

impl StorageConfig {
    /// The configured data file, or `default` when none is set
    pub fn data_file_or(&self, default: &Path) -> PathBuf {
        self.data_file
            .clone()
            .unwrap_or_else(|| default.to_path_buf())
    }
}

impl ConfigSection for StorageConfig {
    const TABLE: &'static str = "storage";

    fn check(&self, findings: &mut Findings) {
        let Some(path) = &self.data_file else {
            return;
        };
        if path.as_os_str().is_empty() {
            findings.push("data_file", "must not be empty");
        } else if path.is_dir() {
            findings.push_value("data_file", "must be a file, not a directory", path.display());
        }
    }

    fn merge(&mut self, other: Self) {
        if other.data_file.is_some() {
            self.data_file = other.data_file;
        }
        self.autosave = other.autosave;
    }
}
