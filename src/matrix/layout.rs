//! Heatmap geometry
//!
//! All values are logical points. Layout is a pure function of the surface
//! size, the grid dimensions and the matrix tunables, so it can be recomputed
//! freely and compared for equality.

use crate::config::MatrixConfig;
use egui::{pos2, vec2, Pos2, Rect, Vec2};

/// Space reserved around the grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
    /// Band below the grid area holding the colour legend
    pub legend: f32,
}

pub const MARGINS: Margins = Margins {
    top: 40.0,
    right: 20.0,
    bottom: 40.0,
    left: 60.0,
    legend: 40.0,
};

/// Where everything goes for one surface size and grid shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub rows: usize,
    pub cols: usize,
    /// Side of one square cell
    pub cell_size: f32,
    /// Top-left corner of cell (0, 0)
    pub origin: Pos2,
    /// Area the grid is centred in
    pub available: Rect,
    /// Gradient bar of the legend
    pub legend: Rect,
    /// Draw every `label_stride`-th axis label
    pub label_stride: usize,
}

impl GridLayout {
    /// Rectangle of cell (`row`, `col`)
    pub fn cell_rect(&self, row: usize, col: usize) -> Rect {
        Rect::from_min_size(
            self.origin + vec2(col as f32 * self.cell_size, row as f32 * self.cell_size),
            Vec2::splat(self.cell_size),
        )
    }

    /// Bounds of the whole grid
    pub fn grid_rect(&self) -> Rect {
        Rect::from_min_size(
            self.origin,
            vec2(
                self.cols as f32 * self.cell_size,
                self.rows as f32 * self.cell_size,
            ),
        )
    }

    /// Whether the grid spills outside the available area
    pub fn overflows(&self) -> bool {
        let grid = self.grid_rect();
        grid.width() > self.available.width() + f32::EPSILON
            || grid.height() > self.available.height() + f32::EPSILON
    }

    /// Indices whose axis label is drawn, shared by rows and columns
    pub fn label_indices(&self, count: usize) -> impl Iterator<Item = usize> {
        (0..count).step_by(self.label_stride.max(1))
    }
}

/// Number of labels per axis that fit in `available_width`
pub fn label_target(available_width: f32, config: &MatrixConfig) -> usize {
    let fit = if config.label_spacing > 0.0 && available_width > 0.0 {
        (available_width / config.label_spacing).floor() as usize
    } else {
        0
    };
    fit.clamp(config.min_labels.max(1), config.max_labels.max(1))
}

/// `ceil(count / target)`, never below one
pub fn stride_for(count: usize, target: usize) -> usize {
    count.div_ceil(target.max(1)).max(1)
}

/// Compute the layout of a `rows` x `cols` grid on a surface of `size`
pub fn compute_layout(size: Vec2, rows: usize, cols: usize, config: &MatrixConfig) -> GridLayout {
    let m = MARGINS;
    let available = Rect::from_min_max(
        pos2(m.left, m.top),
        pos2(
            (size.x - m.right).max(m.left),
            (size.y - m.bottom - m.legend).max(m.top),
        ),
    );

    let fit = (available.width() / cols.max(1) as f32).min(available.height() / rows.max(1) as f32);
    let cell_size = fit.max(config.min_cell);

    let grid_w = cell_size * cols as f32;
    let grid_h = cell_size * rows as f32;
    // Centre inside the available area; an oversized grid starts at its corner
    let origin = pos2(
        available.min.x + ((available.width() - grid_w) / 2.0).max(0.0),
        available.min.y + ((available.height() - grid_h) / 2.0).max(0.0),
    );

    let legend_top = available.max.y.max(origin.y + grid_h) + 12.0;
    let legend = Rect::from_min_size(pos2(available.min.x, legend_top), vec2(available.width(), 12.0));

    let target = label_target(available.width(), config);
    GridLayout {
        rows,
        cols,
        cell_size,
        origin,
        available,
        legend,
        label_stride: stride_for(rows.max(cols), target),
    }
}
