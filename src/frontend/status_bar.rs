//! Status bar panel - bottom bar showing channel and fleet info.

use egui::{Color32, RichText, Ui};

use super::state::ChannelInfo;
use super::widgets::StatusIndicator;
use crate::dashboard::Dashboard;
use crate::types::DeviceStatus;

/// Context needed to render the status bar.
pub struct StatusBarContext<'a> {
    pub channel: ChannelInfo,
    pub dashboard: &'a Dashboard,
    pub server_url: &'a str,
}

/// Render the status bar.
pub fn render_status_bar(ui: &mut Ui, ctx: &StatusBarContext<'_>) {
    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        // === Channel state ===
        ui.add(StatusIndicator::channel(ctx.channel.state).with_tooltip(ctx.server_url));
        if let Some(retry) = ctx.channel.retry_in {
            ui.label(RichText::new(format!("retry in {:.1}s", retry.as_secs_f32())).small());
        }
        if ctx.channel.attempts > 1 {
            ui.label(RichText::new(format!("attempt {}", ctx.channel.attempts)).small());
        }

        ui.separator();

        // === Fleet counts ===
        let store = ctx.dashboard.store();
        ui.label(RichText::new(format!("Devices: {}", store.len())).small());
        ui.colored_label(
            Color32::from_rgb(46, 204, 113),
            RichText::new(format!("Online: {}", store.count_by_status(DeviceStatus::Online))).small(),
        );
        let warnings = store.count_by_status(DeviceStatus::Warning);
        let warn_color = if warnings > 0 {
            Color32::from_rgb(241, 196, 15)
        } else {
            Color32::GRAY
        };
        ui.colored_label(warn_color, RichText::new(format!("Warning: {}", warnings)).small());

        ui.separator();

        // === Selection ===
        let selected = store
            .selected_record()
            .map(|r| r.display_name.as_str())
            .unwrap_or("none");
        ui.label(RichText::new(format!("Selected: {}", selected)).small());

        // === Last log line (right-aligned) ===
        if let Some(entry) = ctx.dashboard.log().last() {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.colored_label(
                    super::widgets::severity_color(entry.severity),
                    RichText::new(&entry.text).small(),
                );
            });
        }
    });
}
