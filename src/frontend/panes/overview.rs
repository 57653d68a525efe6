//! Overview pane - traffic and region aggregates

use egui::{Color32, Ui};

use crate::charts::ChartSlot;
use crate::frontend::state::{AppAction, SharedState};
use crate::store::traffic_class_label;

/// State for the Overview pane
#[derive(Debug)]
pub struct OverviewPaneState {
    /// Show the per-class table under the charts
    pub show_tables: bool,
}

impl Default for OverviewPaneState {
    fn default() -> Self {
        Self { show_tables: true }
    }
}

/// Render the overview pane
pub fn render(
    state: &mut OverviewPaneState,
    shared: &mut SharedState<'_>,
    ui: &mut Ui,
) -> Vec<AppAction> {
    let dashboard = &*shared.dashboard;

    ui.horizontal(|ui| {
        ui.heading("Overview");
        ui.separator();
        ui.checkbox(&mut state.show_tables, "Tables");
    });
    ui.separator();

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            let charts = dashboard.charts();
            ui.columns(2, |cols| {
                for (col, slot) in cols.iter_mut().zip([ChartSlot::TrafficBar, ChartSlot::TrafficRadar]) {
                    match charts.chart(slot) {
                        Some(chart) => chart.show(col),
                        None => {
                            col.colored_label(Color32::GRAY, "Chart not available");
                        }
                    }
                }
            });

            ui.separator();
            let regions = dashboard.country_counts();
            ui.columns(2, |cols| {
                if let Some(chart) = charts.chart(ChartSlot::Regions) {
                    chart.show(&mut cols[0]);
                }
                egui::Grid::new("country_table")
                    .num_columns(2)
                    .striped(true)
                    .show(&mut cols[1], |ui| {
                        ui.strong("Country");
                        ui.strong("Devices");
                        ui.end_row();
                        for (country, count) in &regions {
                            ui.label(country);
                            ui.monospace(count.to_string());
                            ui.end_row();
                        }
                    });
            });

            if state.show_tables {
                ui.separator();
                egui::Grid::new("traffic_table")
                    .num_columns(2)
                    .striped(true)
                    .show(ui, |ui| {
                        ui.strong("Traffic class");
                        ui.strong("Devices");
                        ui.end_row();
                        for (class, count) in dashboard.traffic_counts().iter().enumerate() {
                            ui.label(traffic_class_label(class));
                            ui.monospace(count.to_string());
                            ui.end_row();
                        }
                    });
            }
        });

    Vec::new()
}
