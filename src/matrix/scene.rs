//! Display list produced by the heatmap engine
//!
//! A [`Scene`] is a flat list of primitives in logical coordinates relative
//! to the surface's top-left corner. It keeps the position of every cell's
//! primitives so a single-cell update can be patched in place.

use super::layout::GridLayout;
use egui::{Align2, Color32, Pos2, Rect, Vec2};

/// One drawing primitive
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Filled rectangle
    Fill { rect: Rect, color: Color32 },
    /// Horizontal gradient between two colours
    Gradient { rect: Rect, from: Color32, to: Color32 },
    /// Text anchored at `pos`
    Text {
        pos: Pos2,
        anchor: Align2,
        text: String,
        size: f32,
        color: Color32,
    },
}

/// Indices into [`Scene::ops`] for one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellSlot {
    pub fill: usize,
    pub text: Option<usize>,
}

/// Size of a surface in logical points plus its pixel density
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceMetrics {
    pub logical_size: Vec2,
    pub pixels_per_point: f32,
}

impl SurfaceMetrics {
    pub fn new(logical_size: Vec2, pixels_per_point: f32) -> Self {
        let pixels_per_point = if pixels_per_point.is_finite() && pixels_per_point > 0.0 {
            pixels_per_point
        } else {
            1.0
        };
        Self {
            logical_size: logical_size.max(Vec2::ZERO),
            pixels_per_point,
        }
    }

    /// Physical pixel size of the backing buffer
    pub fn backing_size(&self) -> [u32; 2] {
        let scale = |v: f32| (v * self.pixels_per_point).round().max(0.0) as u32;
        [scale(self.logical_size.x), scale(self.logical_size.y)]
    }
}

/// A fully laid out heatmap, ready to paint
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub metrics: SurfaceMetrics,
    pub ops: Vec<DrawOp>,
    /// `None` for the empty placeholder
    pub layout: Option<GridLayout>,
    /// Row-major cell slots
    pub cells: Vec<CellSlot>,
    /// Text ops of the legend's low and high end labels
    pub legend_labels: Option<(usize, usize)>,
}

impl Scene {
    pub fn new(metrics: SurfaceMetrics) -> Self {
        Self {
            metrics,
            ops: Vec::new(),
            layout: None,
            cells: Vec::new(),
            legend_labels: None,
        }
    }

    /// Append an op and return its index
    pub fn push(&mut self, op: DrawOp) -> usize {
        self.ops.push(op);
        self.ops.len() - 1
    }

    /// Whether this is the "no data" placeholder
    pub fn is_placeholder(&self) -> bool {
        self.layout.is_none()
    }

    fn slot(&self, row: usize, col: usize) -> Option<CellSlot> {
        let layout = self.layout.as_ref()?;
        if row >= layout.rows || col >= layout.cols {
            return None;
        }
        self.cells.get(row * layout.cols + col).copied()
    }

    /// Fill colour of a cell
    pub fn cell_fill(&self, row: usize, col: usize) -> Option<Color32> {
        match self.ops.get(self.slot(row, col)?.fill)? {
            DrawOp::Fill { color, .. } => Some(*color),
            _ => None,
        }
    }

    /// Value text of a cell, if drawn
    pub fn cell_text(&self, row: usize, col: usize) -> Option<&str> {
        match self.ops.get(self.slot(row, col)?.text?)? {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        }
    }

    /// Recolour one cell and replace its value text
    pub fn patch_cell(&mut self, row: usize, col: usize, fill: Color32, text: String, text_color: Color32) -> bool {
        let Some(slot) = self.slot(row, col) else {
            return false;
        };
        if let Some(DrawOp::Fill { color, .. }) = self.ops.get_mut(slot.fill) {
            *color = fill;
        }
        if let Some(DrawOp::Text {
            text: t, color, ..
        }) = slot.text.and_then(|i| self.ops.get_mut(i))
        {
            *t = text;
            *color = text_color;
        }
        true
    }

    /// Text of the legend end labels
    pub fn legend_text(&self) -> Option<(&str, &str)> {
        let (lo, hi) = self.legend_labels?;
        match (self.ops.get(lo)?, self.ops.get(hi)?) {
            (DrawOp::Text { text: a, .. }, DrawOp::Text { text: b, .. }) => Some((a, b)),
            _ => None,
        }
    }

    /// All text in draw order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// A 2-D drawing target the heatmap can be painted on
pub trait Surface {
    /// Physical pixels per logical point
    fn pixels_per_point(&self) -> f32;

    /// Size in logical points
    fn logical_size(&self) -> Vec2;

    /// Paint a scene
    fn draw(&mut self, scene: &Scene);

    fn metrics(&self) -> SurfaceMetrics {
        SurfaceMetrics::new(self.logical_size(), self.pixels_per_point())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::vec2;

    #[test]
    fn test_backing_size_scales_with_density() {
        let metrics = SurfaceMetrics::new(vec2(400.5, 300.0), 2.0);
        assert_eq!(metrics.backing_size(), [801, 600]);
        let fallback = SurfaceMetrics::new(vec2(10.0, 10.0), 0.0);
        assert_eq!(fallback.pixels_per_point, 1.0);
    }

    #[test]
    fn test_placeholder_scene_has_no_cells() {
        let mut scene = Scene::new(SurfaceMetrics::new(vec2(10.0, 10.0), 1.0));
        scene.push(DrawOp::Text {
            pos: Pos2::ZERO,
            anchor: Align2::CENTER_CENTER,
            text: "x".into(),
            size: 12.0,
            color: Color32::WHITE,
        });
        assert!(scene.is_placeholder());
        assert_eq!(scene.cell_fill(0, 0), None);
        assert!(!scene.patch_cell(0, 0, Color32::RED, "1".into(), Color32::WHITE));
    }
}
