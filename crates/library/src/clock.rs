//! Date source for the library engine
//!
//! Every due-date and overdue computation asks the clock for "today". The clock
//! reads the local calendar date unless an override date has been set, which
//! makes the borrowing protocol deterministic for tests and scenario replay.

use chrono::{Local, NaiveDate};

/// Real local date with an optional override
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulatedClock {
    override_date: Option<NaiveDate>,
}

impl SimulatedClock {
    /// A clock that follows the real date
    pub fn real() -> Self {
        Self::default()
    }

    /// A clock pinned to `date`
    pub fn fixed(date: NaiveDate) -> Self {
        Self {
            override_date: Some(date),
        }
    }

    /// Returns the override when set, else the local calendar date
    pub fn today(&self) -> NaiveDate {
        self.override_date
            .unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn set(&mut self, date: NaiveDate) {
        self.override_date = Some(date);
    }

    pub fn reset(&mut self) {
        self.override_date = None;
    }

    pub fn is_overridden(&self) -> bool {
        self.override_date.is_some()
    }

    pub fn override_date(&self) -> Option<NaiveDate> {
        self.override_date
    }
}
