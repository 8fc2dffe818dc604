//! One command-line invocation: load, run, persist

use anyhow::{Context, Result};
use libris_config::{Config, ConfigManager};
use libris_library::{LibraryEvent, LibraryState, LoggingObserver};
use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;

/// Library state plus the settings it was opened with
pub struct Session {
    pub state: LibraryState,
    data_path: PathBuf,
    config: Config,
    changed: Rc<Cell<bool>>,
}

impl Session {
    /// Loads `data_path`, or starts an empty library on the configured clock
    pub fn open(data_path: PathBuf, config: Config) -> Result<Self> {
        let mut state = LibraryState::new();

        if data_path.exists() {
            state
                .load_from_file(&data_path)
                .with_context(|| format!("Failed to load {}", data_path.display()))?;
        } else {
            log::info!("No data file at {}, starting empty", data_path.display());
            if let Some(date) = config.system.clock_override() {
                state.set_current_date(date);
            }
        }

        let changed = Rc::new(Cell::new(false));
        let flag = Rc::clone(&changed);
        state.subscribe(move |event: &LibraryEvent| {
            if *event == LibraryEvent::DataChanged {
                flag.set(true);
            }
        });
        state.subscribe(LoggingObserver);

        Ok(Self {
            state,
            data_path,
            config,
            changed,
        })
    }

    /// True once any command has mutated the library
    pub fn is_changed(&self) -> bool {
        self.changed.get()
    }

    /// Writes the data file now, creating its directory if needed
    pub fn save(&self) -> Result<()> {
        if let Some(dir) = self.data_path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create {}", dir.display()))?;
            }
        }
        self.state
            .save_to_file(&self.data_path)
            .with_context(|| format!("Failed to save {}", self.data_path.display()))
    }

    /// Saves the data file when needed and writes the clock back to settings
    pub fn finish(self, manager: &ConfigManager) -> Result<()> {
        if self.is_changed() {
            if self.config.storage.autosave {
                self.save()?;
            } else {
                log::warn!("Autosave is off; changes were not written");
            }
        }

        let clock = self.state.custom_date();
        if self.config.system.clock_override() != clock {
            manager
                .update(|config| config.system.set_clock_override(clock))
                .context("Failed to save clock settings")?;
        }

        Ok(())
    }
}
