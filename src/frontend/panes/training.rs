//! Training pane - run controls, progress charts and the confusion heatmap

use egui::{Color32, RichText, Ui};

use crate::charts::ChartSlot;
use crate::frontend::state::{AppAction, SharedState};
use crate::frontend::surface::EguiSurface;
use crate::matrix::{format_table_value, MatrixState};

/// State for the Training pane
#[derive(Debug)]
pub struct TrainingPaneState {
    pub model: String,
    pub rounds: u32,
    /// Show the numeric table beside the heatmap
    pub show_table: bool,
}

impl TrainingPaneState {
    pub fn new(rounds: u32) -> Self {
        Self {
            model: "cnn".to_string(),
            rounds: rounds.max(1),
            show_table: true,
        }
    }
}

/// Render the training pane
pub fn render(
    state: &mut TrainingPaneState,
    shared: &mut SharedState<'_>,
    ui: &mut Ui,
) -> Vec<AppAction> {
    let mut actions = Vec::new();
    let running = shared.dashboard.training().is_running();

    ui.horizontal(|ui| {
        ui.heading("Training");
        ui.separator();
        ui.label("Model:");
        ui.add(egui::TextEdit::singleline(&mut state.model).desired_width(100.0));
        ui.label("Rounds:");
        if ui.add(egui::Slider::new(&mut state.rounds, 1..=100)).changed() {
            actions.push(AppAction::SetRounds(state.rounds));
        }
        let can_start = shared.channel.is_open() && !running && !state.model.trim().is_empty();
        if ui.add_enabled(can_start, egui::Button::new("Start")).clicked() {
            actions.push(AppAction::StartTraining {
                model: state.model.trim().to_string(),
                rounds: state.rounds,
            });
        }
        ui.checkbox(&mut state.show_table, "Table");
    });

    let progress = shared.dashboard.training();
    ui.horizontal(|ui| {
        let status = if progress.is_running() {
            format!("Running ({})", progress.model().unwrap_or("-"))
        } else if progress.is_complete() {
            "Complete".to_string()
        } else {
            "Idle".to_string()
        };
        ui.label(RichText::new(status).strong());
        ui.add(
            egui::ProgressBar::new(progress.fraction_done())
                .desired_width(200.0)
                .text(format!(
                    "round {} / {}",
                    progress.last_round().unwrap_or(0),
                    progress.rounds()
                )),
        );
        if let Some(acc) = progress.final_accuracy().or_else(|| progress.latest_accuracy()) {
            ui.label(format!("accuracy {:.3}", acc));
        }
        if let Some(loss) = progress.latest_loss() {
            ui.label(format!("loss {:.4}", loss));
        }
    });
    ui.separator();

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            let charts = shared.dashboard.charts();
            ui.columns(2, |cols| {
                for (col, slot) in cols.iter_mut().zip([ChartSlot::Accuracy, ChartSlot::Loss]) {
                    if let Some(chart) = charts.chart(slot) {
                        chart.show(col);
                    }
                }
            });
            ui.separator();

            let width = ui.available_width();
            let table_width = if state.show_table { (width * 0.35).min(360.0) } else { 0.0 };
            let map_width = (width - table_width).max(200.0);
            let size = egui::vec2(map_width, (map_width * 0.8).clamp(240.0, 560.0));

            ui.horizontal_top(|ui| {
                let heatmap = shared.dashboard.heatmap_mut();
                let mut surface = EguiSurface::allocate(ui, size);
                if heatmap.is_mounted() {
                    heatmap.render(&mut surface);
                } else {
                    heatmap.init(&mut surface);
                }

                if state.show_table {
                    ui.vertical(|ui| summary_table(ui, shared.dashboard.heatmap().state()));
                }
            });
        });

    actions
}

/// Numeric confusion table with row sums and support
fn summary_table(ui: &mut Ui, state: &MatrixState) {
    if state.is_empty() {
        ui.colored_label(Color32::GRAY, "No matrix data yet");
        return;
    }
    let cols = state.cols();
    egui::ScrollArea::both()
        .id_salt("matrix_table")
        .show(ui, |ui| {
            egui::Grid::new("matrix_summary")
                .num_columns(cols + 2)
                .striped(true)
                .show(ui, |ui| {
                    ui.strong("");
                    for j in 0..cols {
                        ui.strong(state.label(j));
                    }
                    ui.strong("Σ");
                    ui.end_row();

                    for row in state.summary_rows() {
                        ui.label(row.label);
                        for v in row.values {
                            ui.monospace(format_table_value(v));
                        }
                        ui.monospace(format_table_value(row.total));
                        ui.end_row();
                    }

                    if let Some(support) = state.support() {
                        ui.strong("support");
                        for j in 0..cols {
                            let v = support.get(j).copied().unwrap_or(0.0);
                            ui.monospace(format_table_value(v));
                        }
                        ui.monospace(format_table_value(state.support_total().unwrap_or(0.0)));
                        ui.end_row();
                    }
                });
        });
}
