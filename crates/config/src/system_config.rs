//! Simulated clock settings
//!
//! Stored under `[system]` with the `UseCustomTime` and `CustomDate` keys.

use crate::validation::{ConfigSection, Findings};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Clock override persisted between runs
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SystemConfig {
    #[serde(rename = "UseCustomTime")]
    pub use_custom_time: bool,

    /// Kept when the override is switched off, so it can be re-enabled
    #[serde(rename = "CustomDate", skip_serializing_if = "Option::is_none")]
    pub custom_date: Option<NaiveDate>,
}

impl SystemConfig {
    /// The date the library clock should use, if overridden
    pub fn clock_override(&self) -> Option<NaiveDate> {
        if self.use_custom_time {
            self.custom_date
        } else {
            None
        }
    }

    /// Records the library clock state
    pub fn set_clock_override(&mut self, date: Option<NaiveDate>) {
        match date {
            Some(date) => {
                self.use_custom_time = true;
                self.custom_date = Some(date);
            }
            None => self.use_custom_time = false,
        }
    }
}

impl ConfigSection for SystemConfig {
    const TABLE: &'static str = "system";

    fn check(&self, findings: &mut Findings) {
        if self.use_custom_time && self.custom_date.is_none() {
            findings.push("CustomDate", "is required when UseCustomTime is set");
        }
    }

    fn merge(&mut self, other: Self) {
        self.use_custom_time = other.use_custom_time;
        if other.custom_date.is_some() {
            self.custom_date = other.custom_date;
        }
    }
}
