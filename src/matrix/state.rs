//! Matrix data independent of any drawing surface

use tracing::debug;

/// Lower bound of [`MatrixState::max_value`]
pub const MAX_VALUE_EPSILON: f64 = 1e-6;

/// Clamp a cell value to a finite, non-negative number
fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Labels, cells and the running maximum of a count matrix
///
/// `max_value` is rescanned on every full replace and only ever raised by
/// [`MatrixState::update_cell`], so within one generation it never
/// decreases.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixState {
    labels: Vec<String>,
    cells: Vec<Vec<f64>>,
    support: Option<Vec<f64>>,
    max_value: f64,
    /// Bumped by every full replace or clear
    generation: u64,
    /// Bumped by every change, including single cells
    revision: u64,
}

impl Default for MatrixState {
    fn default() -> Self {
        Self {
            labels: Vec::new(),
            cells: Vec::new(),
            support: None,
            max_value: MAX_VALUE_EPSILON,
            generation: 0,
            revision: 0,
        }
    }
}

impl MatrixState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the class labels
    pub fn set_labels(&mut self, labels: Vec<String>) {
        self.labels = labels;
        self.rescan();
    }

    /// Replace every cell; negative or non-finite values become zero
    pub fn set_matrix(&mut self, cells: Vec<Vec<f64>>) {
        self.cells = cells
            .into_iter()
            .map(|row| row.into_iter().map(sanitize).collect())
            .collect();
        self.rescan();
    }

    /// Replace the per-class support totals
    pub fn set_support(&mut self, support: Option<Vec<f64>>) {
        self.support = support;
        self.revision += 1;
    }

    /// Overwrite one cell in place
    ///
    /// Returns whether `max_value` grew, or `None` if the cell lies outside
    /// the current grid (the update is then ignored).
    pub fn update_cell(&mut self, row: usize, col: usize, value: f64) -> Option<bool> {
        let cell = self.cells.get_mut(row).and_then(|r| r.get_mut(col));
        let Some(cell) = cell else {
            debug!("Ignoring update of cell ({}, {}) outside the grid", row, col);
            return None;
        };
        let value = sanitize(value);
        *cell = value;
        self.revision += 1;
        if value > self.max_value {
            self.max_value = value;
            Some(true)
        } else {
            Some(false)
        }
    }

    /// Back to the empty state
    pub fn clear(&mut self) {
        self.labels.clear();
        self.cells.clear();
        self.support = None;
        self.rescan();
    }

    fn rescan(&mut self) {
        self.max_value = self
            .cells
            .iter()
            .flatten()
            .copied()
            .fold(MAX_VALUE_EPSILON, f64::max);
        self.generation += 1;
        self.revision += 1;
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    /// Width of the widest row
    pub fn cols(&self) -> usize {
        self.cells.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// No rows or no columns
    pub fn is_empty(&self) -> bool {
        self.rows() == 0 || self.cols() == 0
    }

    pub fn max_value(&self) -> f64 {
        self.max_value
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn cells(&self) -> &[Vec<f64>] {
        &self.cells
    }

    pub fn support(&self) -> Option<&[f64]> {
        self.support.as_deref()
    }

    /// Cell value; short rows read as zero
    pub fn cell(&self, row: usize, col: usize) -> f64 {
        self.cells
            .get(row)
            .and_then(|r| r.get(col))
            .copied()
            .unwrap_or(0.0)
    }

    /// Label of class `index`, falling back to the index itself
    pub fn label(&self, index: usize) -> String {
        self.labels
            .get(index)
            .cloned()
            .unwrap_or_else(|| index.to_string())
    }

    /// `value / max_value`, clamped to `[0, 1]`
    pub fn normalized(&self, value: f64) -> f32 {
        (value / self.max_value).clamp(0.0, 1.0) as f32
    }

    /// Sum of each row
    pub fn row_sums(&self) -> Vec<f64> {
        self.cells.iter().map(|r| r.iter().sum()).collect()
    }

    /// Sum of the support totals, if any were given
    pub fn support_total(&self) -> Option<f64> {
        self.support.as_ref().map(|s| s.iter().sum())
    }

    /// Rows of the numeric summary table: label, cells, row sum
    pub fn summary_rows(&self) -> Vec<SummaryRow> {
        let cols = self.cols();
        self.cells
            .iter()
            .enumerate()
            .map(|(i, row)| SummaryRow {
                label: self.label(i),
                values: (0..cols).map(|j| row.get(j).copied().unwrap_or(0.0)).collect(),
                total: row.iter().sum(),
            })
            .collect()
    }
}

/// One line of the summary table beside the heatmap
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub label: String,
    pub values: Vec<f64>,
    pub total: f64,
}

/// Format a table value with three decimals
pub fn format_table_value(value: f64) -> String {
    format!("{:.3}", value)
}
