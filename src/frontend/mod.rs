//! Frontend module for egui UI
//!
//! This module provides the desktop dashboard using eframe/egui. Every frame
//! the app pumps the channel session on the UI thread, which applies any
//! pending messages to the [`Dashboard`], then renders the current page.
//!
//! # Main Types
//!
//! - [`FleetVisApp`] - Main application state implementing [`eframe::App`]
//! - [`EguiSurface`] - Painter-backed surface for the heatmap engine
//!
//! # Submodules
//!
//! - `panes` - One pane per page (devices, overview, training, logs)
//! - `state` - Shared pane state and [`AppAction`]
//! - `status_bar` - Bottom bar with channel and fleet status
//! - `widgets` - Custom UI widgets (status indicators, value rows)

pub mod panes;
pub mod state;
mod status_bar;
pub mod surface;
pub mod widgets;

pub use state::{AppAction, ChannelInfo, SharedState, Tab};
pub use surface::EguiSurface;
pub use widgets::*;

use crate::config::DashboardConfig;
use crate::dashboard::Dashboard;
use crate::transport::{SessionManager, Transport};
use crate::types::ChannelState;
use panes::Pane;
use status_bar::{render_status_bar, StatusBarContext};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Upper bound between repaints while nothing else wakes the UI
const IDLE_REPAINT: Duration = Duration::from_millis(100);

/// Main application state
pub struct FleetVisApp<T: Transport> {
    session: SessionManager<T>,
    dashboard: Dashboard,
    config: DashboardConfig,
    tab: Tab,
    panes: Vec<Box<dyn Pane>>,
}

impl<T: Transport> FleetVisApp<T> {
    /// Create the app from an eframe creation context
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        session: SessionManager<T>,
        dashboard: Dashboard,
        config: DashboardConfig,
    ) -> Self {
        if config.ui.dark_mode {
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
        } else {
            cc.egui_ctx.set_visuals(egui::Visuals::light());
        }
        Self::from_parts(session, dashboard, config)
    }

    /// Create the app without a window; starts the session if configured to
    pub fn from_parts(
        mut session: SessionManager<T>,
        dashboard: Dashboard,
        config: DashboardConfig,
    ) -> Self {
        if config.server.auto_connect {
            session.start();
        }
        Self {
            session,
            dashboard,
            panes: panes::default_panes(config.charts.default_rounds),
            config,
            tab: Tab::default(),
        }
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn session(&self) -> &SessionManager<T> {
        &self.session
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    /// Drain the channel and apply everything it delivered
    pub fn tick(&mut self, now: Instant) -> usize {
        self.session.pump(now, &mut self.dashboard)
    }

    fn channel_info(&self, now: Instant) -> ChannelInfo {
        ChannelInfo {
            state: self.session.state(),
            attempts: self.session.attempts(),
            retry_in: self.session.timer().remaining(now),
        }
    }

    /// Apply one action emitted by a pane
    pub fn handle_action(&mut self, action: AppAction) {
        debug!("Action: {:?}", action);
        match action {
            AppAction::SelectDevice(id) => {
                self.dashboard.select_device(id);
            }
            AppAction::SendCommand { command, params } => {
                // Rejections are already in the operator log
                let _ = self
                    .dashboard
                    .send_command(&mut self.session, &command, params);
            }
            AppAction::StartTraining { model, rounds } => {
                let _ = self
                    .dashboard
                    .start_training(&mut self.session, &model, rounds);
            }
            AppAction::SetRounds(rounds) => self.dashboard.set_rounds(rounds),
            AppAction::ClearLog => self.dashboard.clear_log(),
            AppAction::SwitchTab(tab) => self.tab = tab,
        }
    }

    fn render_top_bar(&mut self, ui: &mut egui::Ui) -> Vec<AppAction> {
        let mut actions = Vec::new();
        ui.horizontal(|ui| {
            ui.strong("FleetVis");
            ui.separator();
            for tab in Tab::ALL {
                if ui.selectable_label(self.tab == tab, tab.title()).clicked() {
                    actions.push(AppAction::SwitchTab(tab));
                }
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if self.session.state() == ChannelState::Idle && ui.button("Connect").clicked() {
                    info!("Connecting on operator request");
                    self.session.start();
                }
                ui.label(egui::RichText::new(&self.config.server.url).small().weak());
            });
        });
        actions
    }
}

impl<T: Transport> eframe::App for FleetVisApp<T> {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        if self.tick(now) > 0 {
            ctx.request_repaint();
        }

        let mut actions = Vec::new();

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            actions.extend(self.render_top_bar(ui));
        });

        let channel = self.channel_info(now);
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            render_status_bar(
                ui,
                &StatusBarContext {
                    channel,
                    dashboard: &self.dashboard,
                    server_url: &self.config.server.url,
                },
            );
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let mut shared = SharedState {
                dashboard: &mut self.dashboard,
                channel,
            };
            for pane in self.panes.iter_mut().filter(|p| p.tab() == self.tab) {
                actions.extend(pane.render(&mut shared, ui));
            }
        });

        for action in actions {
            self.handle_action(action);
        }

        // Wake up for the reconnect timer even if no input arrives
        let wake = channel
            .retry_in
            .map_or(IDLE_REPAINT, |d| d.min(IDLE_REPAINT));
        ctx.request_repaint_after(wake);
    }
}
