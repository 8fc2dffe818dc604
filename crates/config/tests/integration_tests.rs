//! Integration tests for the settings store

use chrono::NaiveDate;
use libris_config::{
    AppConfig, Config, ConfigManager, ConfigSection, LogLevel, StorageConfig, SystemConfig,
};
use std::path::PathBuf;
use tempfile::TempDir;

fn temp_manager() -> Result<(TempDir, ConfigManager), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let manager = ConfigManager::with_directory(temp_dir.path().to_path_buf());
    Ok((temp_dir, manager))
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_settings_lifecycle() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = temp_manager()?;

    assert!(manager.initialize()?);

    let config = manager.load()?;
    assert_eq!(config, Config::default());

    let mut modified = config.clone();
    modified.system.set_clock_override(Some(date(2024, 9, 1)));
    modified.storage.data_file = Some(PathBuf::from("/srv/libris/library_data.lib"));
    modified.app.log_level = LogLevel::Debug;
    manager.save(&modified)?;

    let reloaded = manager.load()?;
    assert_eq!(reloaded, modified);

    manager.reset()?;
    assert_eq!(manager.load()?, Config::default());

    Ok(())
}

#[test]
fn test_clock_override_survives_restart() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;

    {
        let manager = ConfigManager::with_directory(temp_dir.path().to_path_buf());
        manager.update(|config| config.system.set_clock_override(Some(date(2030, 12, 24))))?;
    }

    let manager = ConfigManager::with_directory(temp_dir.path().to_path_buf());
    let config = manager.load()?;
    assert!(config.system.use_custom_time);
    assert_eq!(config.system.clock_override(), Some(date(2030, 12, 24)));

    manager.update(|config| config.system.set_clock_override(None))?;
    assert_eq!(manager.load()?.system.clock_override(), None);

    Ok(())
}

#[test]
fn test_settings_key_names_are_written() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = temp_manager()?;
    manager.update(|config| config.system.set_clock_override(Some(date(2024, 1, 2))))?;

    let text = std::fs::read_to_string(manager.config_path())?;
    assert!(text.contains("[system]"));
    assert!(text.contains("UseCustomTime = true"));
    assert!(text.contains("CustomDate = \"2024-01-02\""));

    Ok(())
}

#[test]
fn test_save_refuses_invalid_clock() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = temp_manager()?;

    manager.save(&Config::default())?;
    assert!(manager.validate()?.is_empty());

    let mut invalid = Config::default();
    invalid.system.use_custom_time = true;
    assert!(manager.save(&invalid).is_err());

    // The previous file is still intact
    assert_eq!(manager.load()?, Config::default());

    Ok(())
}

#[test]
fn test_atomic_save_keeps_backup() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = temp_manager()?;

    let config = Config::default();
    manager.save(&config)?;
    assert!(manager.config_path().exists());

    manager.save(&config)?;

    let backup_path = manager.backup_path();
    assert!(backup_path.exists());

    Ok(())
}

#[test]
fn test_fresh_sections_pass_checks() {
    assert!(AppConfig::default().validate().is_ok());
    assert!(SystemConfig::default().validate().is_ok());
    assert!(StorageConfig::default().validate().is_ok());
    assert!(Config::default().validate().is_ok());
}

#[test]
fn test_merge_layers_tables() {
    let mut base = Config::default();
    let mut layer = Config::default();

    layer.storage.autosave = false;
    layer.app.color_output = false;
    layer.system.set_clock_override(Some(date(2024, 3, 3)));

    base.merge(layer);

    assert!(!base.storage.autosave);
    assert!(!base.app.color_output);
    assert_eq!(base.system.clock_override(), Some(date(2024, 3, 3)));
}

#[test]
fn test_graceful_degradation_on_load_error() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = temp_manager()?;
    std::fs::write(manager.config_path(), "this is not valid TOML {{{")?;

    assert!(manager.load().is_err());
    assert_eq!(manager.load_or_default(), Config::default());

    Ok(())
}

#[test]
fn test_environment_beats_file() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = temp_manager()?;
    manager.initialize()?;

    std::env::set_var("LIBRIS_DATA_FILE", "/tmp/override.lib");
    std::env::set_var("LIBRIS_LOG_LEVEL", "trace");
    std::env::set_var("LIBRIS_AUTOSAVE", "false");

    let config = manager.load_with_env_overrides()?;

    std::env::remove_var("LIBRIS_DATA_FILE");
    std::env::remove_var("LIBRIS_LOG_LEVEL");
    std::env::remove_var("LIBRIS_AUTOSAVE");

    assert_eq!(config.storage.data_file, Some(PathBuf::from("/tmp/override.lib")));
    assert_eq!(config.app.log_level, LogLevel::Trace);
    assert!(!config.storage.autosave);

    Ok(())
}
