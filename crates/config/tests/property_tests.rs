//! Property-style tests for the settings store

use chrono::{Days, NaiveDate};
use libris_config::{Config, ConfigManager};
use tempfile::TempDir;

#[test]
fn property_toml_text_reproduces_settings() -> Result<(), Box<dyn std::error::Error>> {
    let start = NaiveDate::from_ymd_opt(2000, 1, 1).ok_or("bad date")?;

    for offset in [0u64, 59, 365, 4_000, 20_000] {
        let mut config = Config::default();
        let date = start.checked_add_days(Days::new(offset)).ok_or("overflow")?;
        config.system.set_clock_override(Some(date));

        let text = toml::to_string(&config)?;
        let deserialized: Config = toml::from_str(&text)?;
        assert_eq!(config, deserialized);
    }
    Ok(())
}

#[test]
fn property_defaults_pass_checks() {
    assert!(Config::default().validate().is_ok());
}

#[test]
fn property_resave_is_stable() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let manager = ConfigManager::with_directory(temp_dir.path().to_path_buf());

    let mut config = Config::default();
    config.system.set_clock_override(NaiveDate::from_ymd_opt(2024, 2, 29));
    manager.save(&config)?;
    let loaded = manager.load()?;
    manager.save(&loaded)?;
    let loaded2 = manager.load()?;
    assert_eq!(loaded, loaded2);
    assert_eq!(loaded, config);
    Ok(())
}

#[test]
fn property_clearing_override_keeps_config_valid() {
    let mut config = Config::default();
    for day in 1..=28 {
        config.system.set_clock_override(NaiveDate::from_ymd_opt(2024, 2, day));
        assert!(config.validate().is_ok());
        config.system.set_clock_override(None);
        assert!(config.validate().is_ok());
    }
}

#[test]
fn property_checks_repeat_identically() {
    let mut config = Config::default();
    config.system.use_custom_time = true;

    let first = config.validate();
    let second = config.validate();

    assert_eq!(first, second);
}
