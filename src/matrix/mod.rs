//! Confusion matrix heatmap
//!
//! The heatmap is split so that data, geometry and painting can be tested
//! separately:
//!
//! - [`state`]: labels, cells and the running maximum
//! - [`layout`]: margins, cell size, centring and label decimation
//! - [`color`]: value to colour mapping and text contrast
//! - [`scene`]: the display list and the [`Surface`] it is painted on
//! - [`engine`]: [`HeatmapEngine`], which ties them together and caches
//!   the scene between frames
//!
//! Geometry is computed in logical points. The surface reports its pixel
//! density, which only affects the backing buffer size.

pub mod color;
pub mod engine;
pub mod layout;
pub mod scene;
pub mod state;

pub use engine::{format_value, HeatmapEngine, EMPTY_PLACEHOLDER};
pub use layout::{compute_layout, GridLayout, Margins, MARGINS};
pub use scene::{DrawOp, Scene, Surface, SurfaceMetrics};
pub use state::{format_table_value, MatrixState, SummaryRow, MAX_VALUE_EPSILON};
