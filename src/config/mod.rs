//! Configuration module for FleetVis-RS
//!
//! This module handles the dashboard configuration: where the backend
//! lives, how aggressively to reconnect, and the tunables of the heatmap
//! and the operator log.
//!
//! # App Data Location
//!
//! Application data is stored in the platform-appropriate location:
//! - **Linux**: `~/.local/share/dev.hxyulin.fleetvis-rs/`
//! - **macOS**: `~/Library/Application Support/dev.hxyulin.fleetvis-rs/`
//! - **Windows**: `%APPDATA%\dev.hxyulin.fleetvis-rs\`
//!
//! # Files
//!
//! - `config.toml` - Dashboard configuration
//! - `logs/` - Rolling tracing output
//!
//! # Example
//!
//! ```ignore
//! use fleetvis_rs::config::DashboardConfig;
//!
//! let mut config = DashboardConfig::load_or_default();
//! config.server.url = "ws://10.0.0.5:8000/ws/device_control/".into();
//! config.save()?;
//! ```

pub mod settings;

pub use settings::*;

use crate::error::{DashboardError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for data directories
pub const APP_ID: &str = "dev.hxyulin.fleetvis-rs";

/// Config filename
pub const CONFIG_FILE: &str = "config.toml";

/// Directory (under the app data dir) for rolling log files
pub const LOG_DIR: &str = "logs";

// ==================== App Data Directory ====================

/// Get the application data directory path
pub fn app_data_dir() -> Option<PathBuf> {
    dirs_next::data_dir().map(|p| p.join(APP_ID))
}

/// Ensure the app data directory exists
pub fn ensure_app_data_dir() -> Result<PathBuf> {
    let dir = app_data_dir().ok_or_else(|| {
        DashboardError::Config("Could not determine app data directory".to_string())
    })?;

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| {
            DashboardError::Config(format!("Failed to create app data directory: {}", e))
        })?;
    }

    Ok(dir)
}

/// Get the path to the default config file
pub fn config_path() -> Option<PathBuf> {
    app_data_dir().map(|p| p.join(CONFIG_FILE))
}

/// Get the directory for rolling log files
pub fn log_dir() -> Option<PathBuf> {
    app_data_dir().map(|p| p.join(LOG_DIR))
}

// ==================== Dashboard Config ====================

/// Complete dashboard configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DashboardConfig {
    /// Backend channel settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Operator log settings
    #[serde(default)]
    pub logs: LogConfig,

    /// Heatmap layout tunables
    #[serde(default)]
    pub matrix: MatrixConfig,

    /// Aggregate chart settings
    #[serde(default)]
    pub charts: ChartConfig,

    /// Window and theme preferences
    #[serde(default)]
    pub ui: UiConfig,
}

impl DashboardConfig {
    /// Load config from the default location
    ///
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        let path = config_path().ok_or_else(|| {
            DashboardError::Config("Could not determine config path".to_string())
        })?;

        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load config from an explicit path
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DashboardError::Config(format!("Failed to read config {:?}: {}", path, e))
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| {
            DashboardError::Config(format!("Failed to parse config {:?}: {}", path, e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load config, returning defaults on any error
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        let dir = ensure_app_data_dir()?;
        self.save_to(dir.join(CONFIG_FILE))
    }

    /// Save config to an explicit path
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    DashboardError::Config(format!("Failed to create config directory: {}", e))
                })?;
            }
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| DashboardError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content).map_err(|e| {
            DashboardError::Config(format!("Failed to write config {:?}: {}", path, e))
        })
    }

    /// Check the config for values the dashboard cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.server.url.trim().is_empty() {
            return Err(DashboardError::Config("server.url must not be empty".into()));
        }
        url::Url::parse(&self.server.url)?;

        if self.server.reconnect_delay_ms == 0 {
            return Err(DashboardError::Config(
                "server.reconnect_delay_ms must be positive".into(),
            ));
        }
        if self.logs.capacity == 0 {
            return Err(DashboardError::Config("logs.capacity must be positive".into()));
        }
        if self.matrix.min_labels == 0 || self.matrix.min_labels > self.matrix.max_labels {
            return Err(DashboardError::Config(format!(
                "matrix.min_labels ({}) must be in 1..=max_labels ({})",
                self.matrix.min_labels, self.matrix.max_labels
            )));
        }
        if !(self.matrix.min_cell > 0.0) || !(self.matrix.label_spacing > 0.0) {
            return Err(DashboardError::Config(
                "matrix.min_cell and matrix.label_spacing must be positive".into(),
            ));
        }
        if self.charts.traffic_classes == 0 {
            return Err(DashboardError::Config(
                "charts.traffic_classes must be positive".into(),
            ));
        }
        Ok(())
    }
}

// ==================== Tests ====================
