//! Settings store errors

use crate::validation::ValidationError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading, writing or backing up `config.toml`, or creating its directory
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Settings file {0} is empty")]
    EmptyFile(PathBuf),

    #[error("Cannot parse settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Cannot encode settings: {0}")]
    Encode(#[from] toml::ser::Error),

    /// Saving was refused; nothing was written
    #[error("Invalid settings: {}", join_errors(.0))]
    Invalid(Vec<ValidationError>),

    #[error("Could not determine the settings directory")]
    NoConfigDir,
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// The problems that made a save fail, empty for every other error
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            Self::Invalid(errors) => errors,
            _ => &[],
        }
    }
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
