//! Heatmap engine
//!
//! [`HeatmapEngine`] owns a [`MatrixState`] and turns it into a [`Scene`]
//! for whatever [`Surface`] it is painted on. The scene is cached: it is
//! rebuilt only when the data or the surface metrics change, and a single
//! cell update that leaves the maximum alone is patched in place.

use super::color::{heat_color, text_color, LOW_COLOR, HIGH_COLOR};
use super::layout::{compute_layout, GridLayout, MARGINS};
use super::scene::{CellSlot, DrawOp, Scene, Surface, SurfaceMetrics};
use super::state::MatrixState;
use crate::config::MatrixConfig;
use crate::protocol::MatrixPayload;
use egui::{pos2, vec2, Align2, Color32};
use std::collections::HashSet;
use tracing::{debug, trace};

/// Text shown when there is nothing to draw
pub const EMPTY_PLACEHOLDER: &str = "No matrix data yet";

const TITLE: &str = "Confusion Matrix";
const AXIS_TEXT: Color32 = Color32::from_rgb(200, 200, 200);
const AXIS_FONT: f32 = 11.0;
const MAX_LABEL_CHARS: usize = 9;

/// Format a cell or legend value: integers without decimals
pub fn format_value(value: f64) -> String {
    if value.abs() < 0.005 {
        "0".to_string()
    } else if (value - value.round()).abs() < 1e-9 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

/// Shorten an axis label to fit the margin
fn short_label(label: &str) -> String {
    if label.chars().count() <= MAX_LABEL_CHARS {
        label.to_string()
    } else {
        let head: String = label.chars().take(MAX_LABEL_CHARS - 1).collect();
        format!("{}…", head)
    }
}

/// What the cached scene is missing
#[derive(Debug, Clone, PartialEq)]
enum Pending {
    None,
    Cells(HashSet<(usize, usize)>),
    Rebuild,
}

impl Pending {
    /// Queue a cell patch; past half of `grid_cells` a rebuild is cheaper
    fn add_cell(&mut self, row: usize, col: usize, grid_cells: usize) {
        match self {
            Pending::None => *self = Pending::Cells(HashSet::from([(row, col)])),
            Pending::Cells(cells) => {
                cells.insert((row, col));
                if cells.len() * 2 > grid_cells {
                    *self = Pending::Rebuild;
                }
            }
            Pending::Rebuild => {}
        }
    }
}

/// Renderer for a count matrix with streaming single-cell updates
#[derive(Debug, Clone)]
pub struct HeatmapEngine {
    config: MatrixConfig,
    state: MatrixState,
    scene: Option<Scene>,
    pending: Pending,
    mounted: bool,
}

impl HeatmapEngine {
    pub fn new(config: MatrixConfig) -> Self {
        Self {
            config,
            state: MatrixState::new(),
            scene: None,
            pending: Pending::Rebuild,
            mounted: false,
        }
    }

    /// Attach to a surface and paint the current state
    pub fn init(&mut self, surface: &mut dyn Surface) {
        debug!("Heatmap mounted");
        self.mounted = true;
        self.pending = Pending::Rebuild;
        self.render(surface);
    }

    /// Detach from the surface and drop the cached scene
    ///
    /// Data is kept, so a later [`init`](Self::init) shows it again.
    pub fn dispose(&mut self) {
        debug!("Heatmap disposed");
        self.mounted = false;
        self.scene = None;
        self.pending = Pending::Rebuild;
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Re-query the surface metrics and repaint
    pub fn resize(&mut self, surface: &mut dyn Surface) -> bool {
        self.pending = Pending::Rebuild;
        self.render(surface)
    }

    /// Apply a full matrix payload: labels first, then cells and support
    pub fn update(&mut self, payload: &MatrixPayload) {
        if let Some(labels) = &payload.labels {
            self.set_labels(labels.clone());
        }
        if let Some(matrix) = &payload.matrix {
            self.set_matrix(matrix.clone());
        }
        if payload.support.is_some() {
            self.state.set_support(payload.support.clone());
        }
    }

    pub fn set_labels(&mut self, labels: Vec<String>) {
        self.state.set_labels(labels);
        self.pending = Pending::Rebuild;
    }

    pub fn set_matrix(&mut self, cells: Vec<Vec<f64>>) {
        self.state.set_matrix(cells);
        trace!(
            "Matrix replaced: {}x{}, max {}",
            self.state.rows(),
            self.state.cols(),
            self.state.max_value()
        );
        self.pending = Pending::Rebuild;
    }

    pub fn set_support(&mut self, support: Option<Vec<f64>>) {
        self.state.set_support(support);
    }

    /// Overwrite one cell; returns `false` if it lies outside the grid
    pub fn update_cell(&mut self, row: usize, col: usize, value: f64) -> bool {
        match self.state.update_cell(row, col, value) {
            None => false,
            // Every colour depends on the maximum
            Some(true) => {
                self.pending = Pending::Rebuild;
                true
            }
            Some(false) => {
                let grid_cells = self.state.rows() * self.state.cols();
                self.pending.add_cell(row, col, grid_cells);
                true
            }
        }
    }

    /// Reset to the empty state
    pub fn clear(&mut self) {
        debug!("Heatmap cleared");
        self.state.clear();
        self.pending = Pending::Rebuild;
    }

    pub fn state(&self) -> &MatrixState {
        &self.state
    }

    pub fn config(&self) -> &MatrixConfig {
        &self.config
    }

    /// Last built scene
    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    /// Bring the cached scene up to date and paint it
    ///
    /// Does nothing while unmounted. Returns whether the scene was rebuilt
    /// from scratch.
    pub fn render(&mut self, surface: &mut dyn Surface) -> bool {
        if !self.mounted {
            return false;
        }
        let metrics = surface.metrics();
        if self.scene.as_ref().map(|s| s.metrics) != Some(metrics) {
            self.pending = Pending::Rebuild;
        }

        let rebuilt = match std::mem::replace(&mut self.pending, Pending::None) {
            Pending::Rebuild => {
                self.scene = Some(self.build_scene(metrics));
                true
            }
            Pending::Cells(cells) => {
                for (row, col) in cells {
                    self.patch(row, col);
                }
                false
            }
            Pending::None => false,
        };

        if let Some(scene) = &self.scene {
            surface.draw(scene);
        }
        rebuilt
    }

    fn patch(&mut self, row: usize, col: usize) {
        let value = self.state.cell(row, col);
        let t = self.state.normalized(value);
        let fill = heat_color(t);
        let ink = text_color(t, self.config.contrast_threshold);
        let patched = self
            .scene
            .as_mut()
            .map(|scene| scene.patch_cell(row, col, fill, format_value(value), ink))
            .unwrap_or(false);
        if !patched {
            // Grid shape changed under the cached scene
            if let Some(scene) = &self.scene {
                let metrics = scene.metrics;
                self.scene = Some(self.build_scene(metrics));
            }
        }
    }

    /// Lay out and colour the whole heatmap for `metrics`
    pub fn build_scene(&self, metrics: SurfaceMetrics) -> Scene {
        let mut scene = Scene::new(metrics);
        let size = metrics.logical_size;

        if self.state.is_empty() {
            scene.push(DrawOp::Text {
                pos: pos2(size.x / 2.0, size.y / 2.0),
                anchor: Align2::CENTER_CENTER,
                text: EMPTY_PLACEHOLDER.to_string(),
                size: 14.0,
                color: AXIS_TEXT,
            });
            return scene;
        }

        let state = &self.state;
        let layout = compute_layout(size, state.rows(), state.cols(), &self.config);
        let grid = layout.grid_rect();

        scene.push(DrawOp::Text {
            pos: pos2(size.x / 2.0, MARGINS.top / 2.0),
            anchor: Align2::CENTER_CENTER,
            text: TITLE.to_string(),
            size: 14.0,
            color: AXIS_TEXT,
        });

        let show_values = layout.cell_size >= self.config.value_label_min_cell;
        let value_font = (layout.cell_size * 0.35).clamp(9.0, 14.0);
        for row in 0..layout.rows {
            for col in 0..layout.cols {
                let value = state.cell(row, col);
                let t = state.normalized(value);
                let rect = layout.cell_rect(row, col).shrink(0.5);
                let fill = scene.push(DrawOp::Fill {
                    rect,
                    color: heat_color(t),
                });
                let text = show_values.then(|| {
                    scene.push(DrawOp::Text {
                        pos: rect.center(),
                        anchor: Align2::CENTER_CENTER,
                        text: format_value(value),
                        size: value_font,
                        color: text_color(t, self.config.contrast_threshold),
                    })
                });
                scene.cells.push(CellSlot { fill, text });
            }
        }

        self.push_axis_labels(&mut scene, &layout);

        // Axis captions
        scene.push(DrawOp::Text {
            pos: pos2(grid.center().x, grid.max.y + 24.0),
            anchor: Align2::CENTER_TOP,
            text: "Predicted".to_string(),
            size: AXIS_FONT,
            color: AXIS_TEXT,
        });
        scene.push(DrawOp::Text {
            pos: pos2(4.0, MARGINS.top - 4.0),
            anchor: Align2::LEFT_BOTTOM,
            text: "Actual".to_string(),
            size: AXIS_FONT,
            color: AXIS_TEXT,
        });

        // Legend
        let legend = layout.legend.translate(vec2(0.0, 24.0));
        scene.push(DrawOp::Gradient {
            rect: legend,
            from: LOW_COLOR,
            to: HIGH_COLOR,
        });
        let lo = scene.push(DrawOp::Text {
            pos: legend.left_bottom() + vec2(0.0, 2.0),
            anchor: Align2::LEFT_TOP,
            text: "0".to_string(),
            size: AXIS_FONT,
            color: AXIS_TEXT,
        });
        let hi = scene.push(DrawOp::Text {
            pos: legend.right_bottom() + vec2(0.0, 2.0),
            anchor: Align2::RIGHT_TOP,
            text: format_value(state.max_value()),
            size: AXIS_FONT,
            color: AXIS_TEXT,
        });
        scene.legend_labels = Some((lo, hi));
        scene.layout = Some(layout);
        scene
    }

    fn push_axis_labels(&self, scene: &mut Scene, layout: &GridLayout) {
        let grid = layout.grid_rect();
        let half = layout.cell_size / 2.0;
        for row in layout.label_indices(layout.rows) {
            scene.push(DrawOp::Text {
                pos: pos2(grid.min.x - 6.0, layout.origin.y + row as f32 * layout.cell_size + half),
                anchor: Align2::RIGHT_CENTER,
                text: short_label(&self.state.label(row)),
                size: AXIS_FONT,
                color: AXIS_TEXT,
            });
        }
        for col in layout.label_indices(layout.cols) {
            scene.push(DrawOp::Text {
                pos: pos2(layout.origin.x + col as f32 * layout.cell_size + half, grid.max.y + 6.0),
                anchor: Align2::CENTER_TOP,
                text: short_label(&self.state.label(col)),
                size: AXIS_FONT,
                color: AXIS_TEXT,
            });
        }
    }
}

impl Default for HeatmapEngine {
    fn default() -> Self {
        Self::new(MatrixConfig::default())
    }
}
