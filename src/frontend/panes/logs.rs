//! Logs pane - operator log trail

use egui::{RichText, Ui};

use crate::frontend::state::{AppAction, SharedState};
use crate::frontend::widgets::severity_color;
use crate::types::Severity;

/// State for the Logs pane
#[derive(Debug)]
pub struct LogsPaneState {
    /// Keep the newest line in view
    pub auto_scroll: bool,
    /// Hide lines below this severity
    pub min_severity: Severity,
}

impl Default for LogsPaneState {
    fn default() -> Self {
        Self {
            auto_scroll: true,
            min_severity: Severity::Info,
        }
    }
}

fn rank(severity: Severity) -> u8 {
    match severity {
        Severity::Info => 0,
        Severity::Warn => 1,
        Severity::Error => 2,
    }
}

/// Render the logs pane
pub fn render(
    state: &mut LogsPaneState,
    shared: &mut SharedState<'_>,
    ui: &mut Ui,
) -> Vec<AppAction> {
    let mut actions = Vec::new();
    let log = shared.dashboard.log();

    ui.horizontal(|ui| {
        ui.heading("Logs");
        ui.separator();
        ui.checkbox(&mut state.auto_scroll, "Auto-scroll");
        egui::ComboBox::from_id_salt("log_severity")
            .selected_text(format!("{:?}", state.min_severity))
            .show_ui(ui, |ui| {
                for severity in [Severity::Info, Severity::Warn, Severity::Error] {
                    ui.selectable_value(&mut state.min_severity, severity, format!("{:?}", severity));
                }
            });
        if ui.button("Clear").clicked() {
            actions.push(AppAction::ClearLog);
        }
        ui.label(RichText::new(format!("{} / {}", log.len(), log.capacity())).small().weak());
    });
    ui.separator();

    let min = rank(state.min_severity);
    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .stick_to_bottom(state.auto_scroll)
        .show(ui, |ui| {
            for entry in log.iter().filter(|e| rank(e.severity) >= min) {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(entry.time_label()).monospace().weak());
                    ui.colored_label(severity_color(entry.severity), &entry.text);
                });
            }
        });

    actions
}
