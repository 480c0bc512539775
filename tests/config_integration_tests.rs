//! Integration tests for ConfigManager and settings file handling
//!
//! These tests verify:
//! - Settings loading and saving
//! - Default settings when the file is missing or partial
//! - `DIGISMOD_*` environment overrides layered over the file
//! - Directory creation for a loaded configuration

use camino::Utf8PathBuf;
use config::Environment;
use digismod::config::{ENV_PREFIX, SETTINGS_FILE};
use digismod::{ConfigManager, UserConfig};
use std::fs;
use tempfile::TempDir;

fn create_test_config_dir() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let config_path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    (temp_dir, config_path)
}

fn env_with(vars: &[(&str, &str)]) -> Environment {
    let map: config::Map<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Environment::with_prefix(ENV_PREFIX).source(Some(map))
}

#[test]
fn test_create_config_manager() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    assert_eq!(manager.config_dir(), &config_path);
    assert_eq!(manager.user_config_path(), config_path.join(SETTINGS_FILE));
}

#[test]
fn test_create_config_manager_creates_missing_dir() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let nested = config_path.join("Documents").join("DigiSModEditor");

    ConfigManager::new(&nested).unwrap();
    assert!(nested.is_dir());
}

#[test]
fn test_load_default_user_config() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    let user_config = manager.load_user_config_with(env_with(&[])).unwrap();

    assert!(user_config.database_dir.is_none());
    assert_eq!(user_config.rescan_cooldown_secs, 120);
    assert_eq!(user_config.queue_poll_interval_ms, 50);
    assert!(user_config.replace_existing);
    assert!(!user_config.debug_mode);
}

#[test]
fn test_save_and_reload_user_config() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    let mut config = UserConfig::with_app_dir(&config_path);
    config.database_dir = Some(config_path.join("dsdb"));
    config.replace_existing = false;
    config.debug_mode = true;

    manager.save_user_config(&config).unwrap();
    assert!(manager.user_config_path().exists());

    let loaded = manager.load_user_config_with(env_with(&[])).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_partial_settings_file_uses_defaults() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    fs::write(
        manager.user_config_path(),
        "database_dir: /games/dsdb\nqueue_poll_interval_ms: 10\n",
    )
    .unwrap();

    let loaded = manager.load_user_config_with(env_with(&[])).unwrap();
    assert_eq!(loaded.database_dir, Some(Utf8PathBuf::from("/games/dsdb")));
    assert_eq!(loaded.queue_poll_interval_ms, 10);
    assert_eq!(loaded.rescan_cooldown_secs, 120);
}

#[test]
fn test_environment_overrides_file() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    fs::write(
        manager.user_config_path(),
        "rescan_cooldown_secs: 30\ndebug_mode: false\n",
    )
    .unwrap();

    let loaded = manager
        .load_user_config_with(env_with(&[
            ("DIGISMOD_DEBUG_MODE", "true"),
            ("DIGISMOD_RESCAN_COOLDOWN_SECS", "5"),
        ]))
        .unwrap();

    assert!(loaded.debug_mode);
    assert_eq!(loaded.rescan_cooldown_secs, 5);
}

#[test]
fn test_unrelated_environment_is_ignored() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    let loaded = manager
        .load_user_config_with(env_with(&[("OTHERAPP_DEBUG_MODE", "true")]))
        .unwrap();

    assert!(!loaded.debug_mode);
}

#[test]
fn test_invalid_yaml_is_an_error() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    fs::write(manager.user_config_path(), "rescan_cooldown_secs: [unclosed\n").unwrap();

    assert!(manager.load_user_config_with(env_with(&[])).is_err());
}

#[test]
fn test_ensure_directories_for_loaded_config() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    let config = UserConfig::with_app_dir(&config_path.join("app"));
    manager.save_user_config(&config).unwrap();

    let loaded = manager.load_user_config_with(env_with(&[])).unwrap();
    manager.ensure_directories(&loaded).unwrap();

    assert!(config_path.join("app").join("ProjectMods").is_dir());
    assert!(config_path.join("app").join("PackedMods").is_dir());
    assert!(config_path.join("app").join("Logs").is_dir());
}
