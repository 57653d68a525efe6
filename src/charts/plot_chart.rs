//! egui_plot implementation of [`ChartPrimitive`]
//!
//! Bar and line charts map directly onto egui_plot items. The radar is a
//! closed polygon in polar coordinates and the doughnut is a set of ring
//! slices, both drawn on a plot with a fixed 1:1 aspect.

use super::{ChartData, ChartKind, ChartPrimitive};
use egui::Color32;
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoint, PlotPoints, PlotUi, Polygon, Text};
use std::f64::consts::{FRAC_PI_2, TAU};

/// Slice colours, cycled
const PALETTE: [Color32; 8] = [
    Color32::from_rgb(54, 162, 235),
    Color32::from_rgb(255, 99, 132),
    Color32::from_rgb(255, 206, 86),
    Color32::from_rgb(75, 192, 192),
    Color32::from_rgb(153, 102, 255),
    Color32::from_rgb(255, 159, 64),
    Color32::from_rgb(201, 203, 207),
    Color32::from_rgb(46, 204, 113),
];

/// Inner radius of the doughnut ring, as a fraction of the outer
const DOUGHNUT_HOLE: f64 = 0.55;

/// Arc segments per full turn
const ARC_STEPS: usize = 96;

/// Vertices of a radar polygon, one per value, scaled so the largest
/// value touches the unit circle; the first axis points up
pub fn radar_points(values: &[f64]) -> Vec<[f64; 2]> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }
    let max = values.iter().copied().fold(0.0, f64::max);
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let r = if max > 0.0 { (v / max).max(0.0) } else { 0.0 };
            let angle = FRAC_PI_2 - TAU * i as f64 / n as f64;
            [r * angle.cos(), r * angle.sin()]
        })
        .collect()
}

/// Ring slices of a doughnut, clockwise from the top
///
/// Returns `(index, outline)` for every value with a non-zero share.
pub fn doughnut_slices(values: &[f64]) -> Vec<(usize, Vec<[f64; 2]>)> {
    let total: f64 = values.iter().filter(|v| **v > 0.0).sum();
    if total <= 0.0 {
        return Vec::new();
    }
    let mut start = 0.0;
    let mut slices = Vec::new();
    for (i, v) in values.iter().enumerate() {
        if *v <= 0.0 {
            continue;
        }
        let sweep = TAU * v / total;
        let steps = ((ARC_STEPS as f64 * v / total).ceil() as usize).max(2);
        let at = |frac: f64, r: f64| {
            let angle = FRAC_PI_2 - (start + sweep * frac);
            [r * angle.cos(), r * angle.sin()]
        };
        let mut outline: Vec<[f64; 2]> = (0..=steps).map(|s| at(s as f64 / steps as f64, 1.0)).collect();
        outline.extend((0..=steps).rev().map(|s| at(s as f64 / steps as f64, DOUGHNUT_HOLE)));
        slices.push((i, outline));
        start += sweep;
    }
    slices
}

fn palette(i: usize) -> Color32 {
    PALETTE[i % PALETTE.len()]
}

/// A chart drawn with egui_plot
#[derive(Debug, Clone)]
pub struct PlotChart {
    kind: ChartKind,
    id: String,
    title: String,
    color: Color32,
    height: f32,
    data: ChartData,
    disposed: bool,
}

impl PlotChart {
    pub fn new(kind: ChartKind, id: impl Into<String>, title: impl Into<String>) -> Self {
        let data = match kind {
            ChartKind::Line => ChartData::Series {
                points: Vec::new(),
                x_max: 0.0,
            },
            _ => ChartData::Categories {
                labels: Vec::new(),
                values: Vec::new(),
            },
        };
        Self {
            kind,
            id: id.into(),
            title: title.into(),
            color: PALETTE[0],
            height: 220.0,
            data,
            disposed: false,
        }
    }

    pub fn color(mut self, color: Color32) -> Self {
        self.color = color;
        self
    }

    pub fn height(mut self, height: f32) -> Self {
        self.height = height;
        self
    }

    pub fn traffic_bar() -> Self {
        Self::new(ChartKind::Bar, "traffic_bar", "Traffic by class")
    }

    pub fn traffic_radar() -> Self {
        Self::new(ChartKind::Radar, "traffic_radar", "Traffic profile")
            .color(Color32::from_rgb(255, 99, 132))
    }

    pub fn regions() -> Self {
        Self::new(ChartKind::Doughnut, "regions", "Devices by country")
    }

    pub fn accuracy() -> Self {
        Self::new(ChartKind::Line, "accuracy", "Accuracy").color(Color32::from_rgb(75, 192, 192))
    }

    pub fn loss() -> Self {
        Self::new(ChartKind::Line, "loss", "Loss").color(Color32::from_rgb(255, 99, 132))
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn data(&self) -> &ChartData {
        &self.data
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn categories(&self) -> (&[String], &[f64]) {
        match &self.data {
            ChartData::Categories { labels, values } => (labels.as_slice(), values.as_slice()),
            ChartData::Series { .. } => (Default::default(), Default::default()),
        }
    }

    fn polar_plot(&self) -> Plot<'static> {
        Plot::new(self.id.clone())
            .height(self.height)
            .data_aspect(1.0)
            .show_axes(false)
            .show_grid(false)
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .include_x(-1.3)
            .include_x(1.3)
            .include_y(-1.2)
            .include_y(1.2)
    }

    fn show_bar(&self, ui: &mut egui::Ui) {
        let (labels, values) = self.categories();
        let bars: Vec<Bar> = values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let name = labels.get(i).cloned().unwrap_or_else(|| i.to_string());
                Bar::new(i as f64, *v).name(name).fill(self.color)
            })
            .collect();
        Plot::new(self.id.clone())
            .height(self.height)
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .include_y(0.0)
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(self.title.clone(), bars).color(self.color));
            });
    }

    fn show_line(&self, ui: &mut egui::Ui) {
        let ChartData::Series { points, x_max } = &self.data else {
            return;
        };
        Plot::new(self.id.clone())
            .height(self.height)
            .legend(Legend::default())
            .x_axis_label("Round")
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .include_x(1.0)
            .include_x(x_max.max(1.0))
            .include_y(0.0)
            .show(ui, |plot_ui| {
                let line = Line::new(self.title.clone(), PlotPoints::from(points.clone()))
                    .color(self.color)
                    .width(2.0);
                plot_ui.line(line);
            });
    }

    fn show_radar(&self, ui: &mut egui::Ui) {
        let (labels, values) = self.categories();
        let n = values.len();
        self.polar_plot().show(ui, |plot_ui| {
            draw_spokes(plot_ui, n);
            if n == 0 {
                return;
            }
            let fill = Color32::from_rgba_unmultiplied(self.color.r(), self.color.g(), self.color.b(), 60);
            plot_ui.polygon(
                Polygon::new(self.title.clone(), PlotPoints::from(radar_points(values)))
                    .fill_color(fill)
                    .stroke(egui::Stroke::new(1.5, self.color)),
            );
            for (i, label) in labels.iter().enumerate().take(n) {
                let angle = FRAC_PI_2 - TAU * i as f64 / n as f64;
                let pos = PlotPoint::new(1.15 * angle.cos(), 1.1 * angle.sin());
                plot_ui.text(Text::new(label.clone(), pos, label.clone()).color(Color32::GRAY));
            }
        });
    }

    fn show_doughnut(&self, ui: &mut egui::Ui) {
        let (labels, values) = self.categories();
        self.polar_plot()
            .legend(Legend::default())
            .show(ui, |plot_ui| {
                for (i, outline) in doughnut_slices(values) {
                    let name = labels.get(i).cloned().unwrap_or_else(|| i.to_string());
                    plot_ui.polygon(
                        Polygon::new(name, PlotPoints::from(outline))
                            .fill_color(palette(i))
                            .stroke(egui::Stroke::NONE),
                    );
                }
            });
    }
}

/// Unit circle rings and one spoke per axis behind a radar polygon
fn draw_spokes(plot_ui: &mut PlotUi, n: usize) {
    let guide = Color32::from_gray(80);
    for ring in [0.5, 1.0] {
        let circle: Vec<[f64; 2]> = (0..=ARC_STEPS)
            .map(|s| {
                let a = TAU * s as f64 / ARC_STEPS as f64;
                [ring * a.cos(), ring * a.sin()]
            })
            .collect();
        plot_ui.line(Line::new(format!("ring_{}", ring), PlotPoints::from(circle)).color(guide));
    }
    for i in 0..n {
        let angle = FRAC_PI_2 - TAU * i as f64 / n as f64;
        let spoke = vec![[0.0, 0.0], [angle.cos(), angle.sin()]];
        plot_ui.line(Line::new(format!("spoke_{}", i), PlotPoints::from(spoke)).color(guide));
    }
}

impl ChartPrimitive for PlotChart {
    fn kind(&self) -> ChartKind {
        self.kind
    }

    fn update(&mut self, data: ChartData) {
        if self.disposed {
            return;
        }
        self.data = data;
    }

    fn dispose(&mut self) {
        self.disposed = true;
    }

    fn show(&self, ui: &mut egui::Ui) {
        ui.label(egui::RichText::new(&self.title).strong());
        match self.kind {
            ChartKind::Bar => self.show_bar(ui),
            ChartKind::Line => self.show_line(ui),
            ChartKind::Radar => self.show_radar(ui),
            ChartKind::Doughnut => self.show_doughnut(ui),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: [f64; 2], b: [f64; 2]) -> bool {
        (a[0] - b[0]).abs() < 1e-9 && (a[1] - b[1]).abs() < 1e-9
    }

    #[test]
    fn test_radar_first_axis_points_up() {
        let pts = radar_points(&[4.0, 2.0, 0.0, 2.0]);
        assert_eq!(pts.len(), 4);
        assert!(close(pts[0], [0.0, 1.0]));
        assert!(close(pts[1], [0.5, 0.0]));
        assert!(close(pts[2], [0.0, 0.0]));
        assert!(close(pts[3], [-0.5, 0.0]));
    }

    #[test]
    fn test_radar_all_zero_collapses() {
        let pts = radar_points(&[0.0, 0.0, 0.0]);
        assert!(pts.iter().all(|p| close(*p, [0.0, 0.0])));
        assert!(radar_points(&[]).is_empty());
    }

    #[test]
    fn test_doughnut_skips_empty_shares() {
        let slices = doughnut_slices(&[1.0, 0.0, 3.0]);
        let indices: Vec<_> = slices.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![0, 2]);
        // First slice starts at the top of the outer ring
        assert!(close(slices[0].1[0], [0.0, 1.0]));
        assert!(doughnut_slices(&[0.0, 0.0]).is_empty());
    }

    #[test]
    fn test_update_after_dispose_ignored() {
        let mut chart = PlotChart::regions();
        chart.update(ChartData::Categories {
            labels: vec!["Germany".into()],
            values: vec![1.0],
        });
        chart.dispose();
        chart.update(ChartData::Categories {
            labels: vec![],
            values: vec![],
        });
        assert!(chart.is_disposed());
        assert!(matches!(chart.data(), ChartData::Categories { labels, .. } if labels.len() == 1));
        assert_eq!(chart.kind(), ChartKind::Doughnut);
    }

    #[test]
    fn test_line_starts_with_empty_series() {
        let chart = PlotChart::accuracy();
        assert_eq!(
            chart.data(),
            &ChartData::Series {
                points: vec![],
                x_max: 0.0
            }
        );
        assert_eq!(chart.title(), "Accuracy");
    }
}
