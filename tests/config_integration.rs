//! Config files on disk

use fleetvis_rs::config::{self, DashboardConfig};
use fleetvis_rs::DashboardError;
use serial_test::serial;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_save_and_load_from_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut config = DashboardConfig::default();
    config.server.url = "wss://fleet.example.org/ws/device_control/".to_string();
    config.server.auto_connect = false;
    config.logs.capacity = 50;
    config.ui.window_size = [1600.0, 900.0];
    config.save_to(&path).unwrap();

    let loaded = DashboardConfig::load_from(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_load_rejects_invalid_file() {
    let dir = TempDir::new().unwrap();

    let bad_toml = dir.path().join("broken.toml");
    fs::write(&bad_toml, "[server\nurl = ").unwrap();
    assert!(matches!(
        DashboardConfig::load_from(&bad_toml),
        Err(DashboardError::Config(_))
    ));

    let bad_value = dir.path().join("zero.toml");
    fs::write(&bad_value, "[logs]\ncapacity = 0\n").unwrap();
    assert!(DashboardConfig::load_from(&bad_value).is_err());

    assert!(DashboardConfig::load_from(dir.path().join("missing.toml")).is_err());
}

#[cfg(target_os = "linux")]
mod data_dir {
    use super::*;

    /// Point the platform data directory at a temp dir for the test
    fn with_data_home<F: FnOnce()>(f: F) {
        let dir = TempDir::new().unwrap();
        let previous = std::env::var_os("XDG_DATA_HOME");
        std::env::set_var("XDG_DATA_HOME", dir.path());
        f();
        match previous {
            Some(v) => std::env::set_var("XDG_DATA_HOME", v),
            None => std::env::remove_var("XDG_DATA_HOME"),
        }
    }

    #[test]
    #[serial]
    fn test_missing_default_file_yields_defaults() {
        with_data_home(|| {
            assert_eq!(DashboardConfig::load().unwrap(), DashboardConfig::default());
            assert!(!config::config_path().unwrap().exists());
        });
    }

    #[test]
    #[serial]
    fn test_save_lands_in_app_dir() {
        with_data_home(|| {
            let mut config = DashboardConfig::default();
            config.charts.default_rounds = 25;
            config.save().unwrap();

            let path = config::config_path().unwrap();
            assert!(path.ends_with("dev.hxyulin.fleetvis-rs/config.toml"));
            assert_eq!(DashboardConfig::load_or_default(), config);
            assert!(config::log_dir().unwrap().starts_with(path.parent().unwrap()));
        });
    }

    #[test]
    #[serial]
    fn test_corrupt_default_file_falls_back() {
        with_data_home(|| {
            let path = config::config_path().unwrap();
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, "not = [valid").unwrap();
            assert_eq!(DashboardConfig::load_or_default(), DashboardConfig::default());
        });
    }
}
