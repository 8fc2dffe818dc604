//! `[app]`: logging and terminal output

use crate::validation::{ConfigSection, Findings, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default filter handed to `env_logger`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    const ALL: [LogLevel; 5] = [
        LogLevel::Error,
        LogLevel::Warn,
        LogLevel::Info,
        LogLevel::Debug,
        LogLevel::Trace,
    ];

    /// Spelling used in `config.toml`, `LIBRIS_LOG_LEVEL` and `RUST_LOG`
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = ValidationError;

    /// Case-insensitive; `warning` is accepted for `warn`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        if wanted == "warning" {
            return Ok(LogLevel::Warn);
        }
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == wanted)
            .ok_or_else(|| {
                ValidationError::new(
                    "app.log_level",
                    "must be one of: error, warn, info, debug, trace",
                )
                .with_value(s)
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// `RUST_LOG` still wins when set
    pub log_level: LogLevel,
    pub color_output: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            log_level: LogLevel::Warn,
            color_output: true,
        }
    }
}

impl ConfigSection for AppConfig {
    const TABLE: &'static str = "app";

    // Every value serde accepts is usable
    fn check(&self, _findings: &mut Findings) {}

    fn merge(&mut self, other: Self) {
        *self = other;
    }
}
