//! FleetVis - Main Entry Point
//!
//! Usage: `fleetvis-rs [config.toml]`. Without an argument the config is read
//! from the app data directory, falling back to defaults.

use anyhow::Context;
use fleetvis_rs::{
    charts::ChartBindings,
    config::{self, DashboardConfig},
    protocol::OutboundMessage,
    transport::{SessionManager, WsTransport},
    Dashboard, FleetVisApp,
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Console logging, plus a daily log file when the data directory is known
fn init_logging() -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,fleetvis_rs=debug"));

    let (file_layer, guard) = match config::log_dir() {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "fleetvis.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    guard
}

fn load_config() -> anyhow::Result<DashboardConfig> {
    let config = match std::env::args_os().nth(1) {
        Some(path) => DashboardConfig::load_from(&path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => DashboardConfig::load_or_default(),
    };
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    // Flushes the log file on exit
    let _guard = init_logging();

    tracing::info!("Starting FleetVis");

    let config = load_config()?;
    tracing::info!("Backend: {}", config.server.url);

    let transport = WsTransport::spawn(&config.server.url, config.server.reconnect_delay())
        .context("Failed to start the channel worker")?;
    let session = SessionManager::new(
        transport,
        config.server.reconnect_delay(),
        OutboundMessage::subscribe(config.server.subscribe_type.clone()),
    );
    let dashboard = Dashboard::new(&config).with_charts(ChartBindings::with_plot_charts());

    let [width, height] = config.ui.window_size;
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([width, height])
            .with_min_inner_size([800.0, 600.0])
            .with_title("FleetVis"),
        ..Default::default()
    };

    eframe::run_native(
        "FleetVis",
        native_options,
        Box::new(|cc| Ok(Box::new(FleetVisApp::new(cc, session, dashboard, config)))),
    )
    .map_err(|e| anyhow::anyhow!("UI terminated with an error: {}", e))?;

    tracing::info!("Shutting down...");
    Ok(())
}
