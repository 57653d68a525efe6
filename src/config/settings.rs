//! Configuration sections
//!
//! Each section has its own defaults so a partial `config.toml` only needs
//! to mention what it overrides.
//!
//! # Main Types
//!
//! - [`ServerConfig`] - Backend URL, reconnect delay, subscribe request
//! - [`LogConfig`] - Operator log capacity
//! - [`MatrixConfig`] - Heatmap cell floor, label decimation, contrast
//! - [`ChartConfig`] - Traffic class count
//! - [`UiConfig`] - Window size and theme

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default websocket endpoint of the dashboard backend
pub const DEFAULT_SERVER_URL: &str = "ws://127.0.0.1:8000/ws/device_control/";

/// Default delay before a dropped channel is reopened
pub const DEFAULT_RECONNECT_DELAY_MS: u64 = 2000;

/// Default number of operator log lines kept
pub const DEFAULT_LOG_CAPACITY: usize = 200;

/// Default number of traffic classes reported by the classifiers
pub const DEFAULT_TRAFFIC_CLASSES: usize = 12;

/// Backend channel settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Websocket URL
    pub url: String,
    /// Fixed delay before reconnecting after the channel closes
    pub reconnect_delay_ms: u64,
    /// `type` of the subscribe/sync request sent when the channel opens
    pub subscribe_type: String,
    /// Connect on startup instead of waiting for the operator
    pub auto_connect: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SERVER_URL.to_string(),
            reconnect_delay_ms: DEFAULT_RECONNECT_DELAY_MS,
            subscribe_type: "ui_subscribe".to_string(),
            auto_connect: true,
        }
    }
}

impl ServerConfig {
    /// Reconnect delay as a [`Duration`]
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

/// Operator log settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Maximum number of lines kept; the oldest line is evicted first
    pub capacity: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_LOG_CAPACITY,
        }
    }
}

/// Heatmap layout tunables, all in logical units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatrixConfig {
    /// Cells never shrink below this edge length
    pub min_cell: f32,
    /// Lower bound on the number of axis labels targeted per axis
    pub min_labels: usize,
    /// Upper bound on the number of axis labels drawn per axis
    pub max_labels: usize,
    /// Horizontal room one axis label needs
    pub label_spacing: f32,
    /// Normalized value above which cell text switches to the light color
    pub contrast_threshold: f32,
    /// Numeric labels are hidden when cells are smaller than this
    pub value_label_min_cell: f32,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            min_cell: 24.0,
            min_labels: 6,
            max_labels: 12,
            label_spacing: 48.0,
            contrast_threshold: 0.5,
            value_label_min_cell: 18.0,
        }
    }
}

/// Aggregate chart settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Number of traffic classification buckets
    pub traffic_classes: usize,
    /// Rounds shown on the training charts before any run starts
    pub default_rounds: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            traffic_classes: DEFAULT_TRAFFIC_CLASSES,
            default_rounds: 10,
        }
    }
}

/// Window and theme preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Enable dark mode
    pub dark_mode: bool,
    /// Initial window size in logical points
    pub window_size: [f32; 2],
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            dark_mode: true,
            window_size: [1280.0, 800.0],
        }
    }
}
