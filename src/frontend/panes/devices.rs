//! Devices pane - fleet list, selected device detail and commands

use egui::{Color32, RichText, Ui};

use crate::frontend::state::{AppAction, SharedState};
use crate::frontend::widgets::{device_status_color, StatusIndicator, ValueDisplay};
use crate::store::DeviceRecord;

/// Command buttons: label, command name, optional `mode` parameter
const COMMANDS: [(&str, &str, Option<&str>); 4] = [
    ("Run (stream)", "run", Some("stream")),
    ("Run (batch)", "run", Some("batch")),
    ("Stop", "stop", None),
    ("Request status", "status", None),
];

/// State for the Devices pane
#[derive(Debug, Default)]
pub struct DevicesPaneState {
    /// Case-insensitive name filter
    pub filter: String,
}

fn matches_filter(record: &DeviceRecord, filter: &str) -> bool {
    filter.is_empty()
        || record
            .display_name
            .to_lowercase()
            .contains(&filter.to_lowercase())
        || record.id.to_string() == filter
}

/// Render the devices pane
pub fn render(
    state: &mut DevicesPaneState,
    shared: &mut SharedState<'_>,
    ui: &mut Ui,
) -> Vec<AppAction> {
    let mut actions = Vec::new();
    let store = shared.dashboard.store();

    ui.horizontal(|ui| {
        ui.heading("Devices");
        ui.separator();
        ui.label("Filter:");
        ui.text_edit_singleline(&mut state.filter);
    });
    ui.separator();

    if store.is_empty() {
        ui.colored_label(Color32::GRAY, "No devices reported yet");
        return actions;
    }

    let selected = store.selected();
    egui::SidePanel::left("device_list")
        .resizable(true)
        .default_width(240.0)
        .show_inside(ui, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    for record in store
                        .sorted_by_name()
                        .into_iter()
                        .filter(|r| matches_filter(r, &state.filter))
                    {
                        let text = RichText::new(format!("● {}", record.display_name))
                            .color(device_status_color(record.status));
                        let response = ui.selectable_label(selected == Some(record.id), text);
                        if response.clicked() {
                            actions.push(AppAction::SelectDevice(record.id));
                        }
                        response.on_hover_text(format!("#{} · {}", record.id, record.mode));
                    }
                });
        });

    egui::CentralPanel::default().show_inside(ui, |ui| {
        let Some(record) = store.selected_record() else {
            ui.colored_label(Color32::GRAY, "Select a device");
            return;
        };

        ui.horizontal(|ui| {
            ui.heading(&record.display_name);
            ui.add(StatusIndicator::device(record.status));
        });
        ui.add(ValueDisplay::new("Id", record.id.to_string()));
        ui.add(ValueDisplay::new("Mode", &record.mode));
        ui.add(ValueDisplay::new("Country", &record.country));
        if let Some(label) = &record.traffic_label {
            let confidence = record
                .confidence
                .map(|c| format!(" ({:.1}%)", c * 100.0))
                .unwrap_or_default();
            ui.add(
                ValueDisplay::new("Traffic", format!("{}{}", label, confidence))
                    .with_color(device_status_color(record.status)),
            );
        }
        if let Some(summary) = &record.last_event_summary {
            ui.add(ValueDisplay::new("Last event", summary));
        }

        ui.separator();
        ui.add_enabled_ui(shared.channel.is_open(), |ui| {
            ui.horizontal_wrapped(|ui| {
                for (label, command, mode) in COMMANDS {
                    if ui.button(label).clicked() {
                        let mut action = AppAction::command(command);
                        if let (AppAction::SendCommand { params, .. }, Some(mode)) = (&mut action, mode) {
                            params.insert("mode".to_string(), mode.into());
                        }
                        actions.push(action);
                    }
                }
            });
        });

        ui.separator();
        ui.label(RichText::new("Last status").strong());
        match record.pretty_status() {
            Some(json) => {
                egui::ScrollArea::vertical()
                    .id_salt("status_payload")
                    .show(ui, |ui| {
                        ui.label(RichText::new(json).monospace());
                    });
            }
            None => {
                ui.colored_label(Color32::GRAY, "No status received");
            }
        }
    });

    actions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_by_name_or_id() {
        let mut record = DeviceRecord::new(12);
        record.display_name = "Edge Gateway".into();
        assert!(matches_filter(&record, ""));
        assert!(matches_filter(&record, "gate"));
        assert!(matches_filter(&record, "12"));
        assert!(!matches_filter(&record, "sensor"));
    }
}
