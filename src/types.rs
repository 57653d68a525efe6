//! Core data types for FleetVis-RS
//!
//! This module contains the small value types shared by the store, the
//! transport layer and the frontend.
//!
//! # Main Types
//!
//! - [`DeviceId`] - Stable identity of a remote device
//! - [`DeviceStatus`] - Liveness of a device (online, offline, warning)
//! - [`ChannelState`] - State of the logical channel to the backend
//! - [`Severity`] - Severity of an operator log line

use serde::{Deserialize, Serialize};

/// Stable identity of a remote device as assigned by the backend
pub type DeviceId = u64;

/// Liveness of a device as last reported over the channel
///
/// Transitions to [`DeviceStatus::Offline`] are always explicit; a device
/// that simply stops reporting keeps its last status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    /// Device is connected and reporting
    Online,
    /// Device announced its disconnect (or was never seen online)
    #[default]
    Offline,
    /// Device is online but its traffic was classified as dangerous
    Warning,
}

impl DeviceStatus {
    /// Lowercase name as used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceStatus::Online => "online",
            DeviceStatus::Offline => "offline",
            DeviceStatus::Warning => "warning",
        }
    }

    /// Whether the device counts as live
    pub fn is_live(&self) -> bool {
        !matches!(self, DeviceStatus::Offline)
    }
}

impl std::fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of the logical channel to the dashboard backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelState {
    /// No connection has been attempted yet
    #[default]
    Idle,
    /// A connection attempt is in flight
    Connecting,
    /// Connected and subscribed
    Open,
    /// Connection dropped; a reconnect is scheduled
    Closed,
}

impl std::fmt::Display for ChannelState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelState::Idle => write!(f, "idle"),
            ChannelState::Connecting => write!(f, "connecting"),
            ChannelState::Open => write!(f, "open"),
            ChannelState::Closed => write!(f, "closed"),
        }
    }
}

/// Severity of an operator-facing log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warn => write!(f, "warn"),
            Severity::Error => write!(f, "error"),
        }
    }
}
