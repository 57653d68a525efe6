//! # FleetVis-RS: Fleet Telemetry Dashboard
//!
//! A desktop dashboard for a fleet of edge devices and the federated training
//! runs they take part in. A single websocket channel to the backend carries
//! device announcements, status, traffic classifications and training
//! progress. The dashboard mirrors that stream into local state and renders
//! it as device lists, aggregate charts, training curves and a confusion
//! matrix heatmap.
//!
//! ## Architecture
//!
//! - **Transport**: A tokio worker thread owns the websocket; a session state
//!   machine on the UI thread owns reconnects and decoding
//! - **State**: [`Dashboard`] applies decoded messages to the device store,
//!   training progress, heatmap and operator log
//! - **Frontend**: Renders the UI using eframe/egui with egui_plot for charts
//! - **Communication**: Crossbeam channels between the worker and the UI
//!
//! ## Configuration
//!
//! Settings are read from `config.toml` in the platform-appropriate data
//! directory under `dev.hxyulin.fleetvis-rs`:
//!
//! - **Linux**: `~/.local/share/dev.hxyulin.fleetvis-rs/`
//! - **macOS**: `~/Library/Application Support/dev.hxyulin.fleetvis-rs/`
//! - **Windows**: `%APPDATA%\dev.hxyulin.fleetvis-rs\`
//!
//! ## Example
//!
//! ```ignore
//! use fleetvis_rs::{
//!     config::DashboardConfig,
//!     protocol::OutboundMessage,
//!     transport::{SessionManager, WsTransport},
//!     Dashboard, FleetVisApp,
//! };
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = DashboardConfig::load_or_default();
//!     let transport = WsTransport::spawn(&config.server.url, config.server.reconnect_delay())?;
//!     let session = SessionManager::new(
//!         transport,
//!         config.server.reconnect_delay(),
//!         OutboundMessage::subscribe(config.server.subscribe_type.clone()),
//!     );
//!     let dashboard = Dashboard::new(&config);
//!
//!     eframe::run_native(
//!         "FleetVis",
//!         eframe::NativeOptions::default(),
//!         Box::new(|cc| Ok(Box::new(FleetVisApp::new(cc, session, dashboard, config)))),
//!     )?;
//!     Ok(())
//! }
//! ```

pub mod charts;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod frontend;
pub mod log_buffer;
pub mod matrix;
pub mod protocol;
pub mod store;
pub mod training;
pub mod transport;
pub mod types;

// Re-export commonly used types
pub use config::DashboardConfig;
pub use dashboard::Dashboard;
pub use error::{DashboardError, Result};
pub use frontend::FleetVisApp;
pub use matrix::HeatmapEngine;
pub use protocol::{InboundMessage, OutboundMessage};
pub use store::DeviceStore;
pub use transport::{SessionManager, Transport, WsTransport};
