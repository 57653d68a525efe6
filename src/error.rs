//! Error handling for the FleetVis-RS dashboard
//!
//! This module defines the crate-wide error type and a Result alias.
//! Most of these errors are recoverable: the dashboard logs them and keeps
//! running rather than tearing down the session.

use thiserror::Error;

/// Main error type for FleetVis-RS operations
#[derive(Error, Debug)]
pub enum DashboardError {
    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// An inbound payload could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Errors raised by the websocket worker
    #[error("Transport error: {0}")]
    Transport(String),

    /// Outbound message attempted while the channel is not open
    #[error("Channel not ready ({state})")]
    NotReady { state: String },

    /// Device command attempted with nothing selected
    #[error("No device selected")]
    NoDeviceSelected,

    /// Server URL could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Errors related to channel communication between threads
    #[error("Channel error: {0}")]
    Channel(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<DashboardError>,
    },
}

impl DashboardError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        DashboardError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Whether the dashboard can keep running after this error
    pub fn is_recoverable(&self) -> bool {
        match self {
            DashboardError::Config(_) | DashboardError::InvalidUrl(_) => false,
            DashboardError::WithContext { source, .. } => source.is_recoverable(),
            _ => true,
        }
    }
}

impl From<serde_json::Error> for DashboardError {
    fn from(err: serde_json::Error) -> Self {
        DashboardError::Decode(err.to_string())
    }
}

/// Result type alias for FleetVis-RS operations
pub type Result<T> = std::result::Result<T, DashboardError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}
