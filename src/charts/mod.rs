//! Chart binding layer
//!
//! Pushes derived aggregates into chart primitives. The state layers never
//! hold a chart; [`ChartBindings`] resolves the mounted handle when data is
//! pushed and treats a missing one as a no-op.

pub mod plot_chart;

pub use plot_chart::PlotChart;

use crate::store::traffic_class_label;
use crate::training::TrainingProgress;
use std::collections::BTreeMap;
use tracing::trace;

/// Rendering style of a chart primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    Bar,
    Radar,
    Doughnut,
    Line,
}

/// Dataset handed to a chart primitive
#[derive(Debug, Clone, PartialEq)]
pub enum ChartData {
    /// One value per named category
    Categories { labels: Vec<String>, values: Vec<f64> },
    /// `[x, y]` points with the x range to show
    Series { points: Vec<[f64; 2]>, x_max: f64 },
}

/// A chart that can be created once and then fed new datasets
#[cfg_attr(test, mockall::automock)]
pub trait ChartPrimitive {
    fn kind(&self) -> ChartKind;

    /// Replace the dataset
    fn update(&mut self, data: ChartData);

    /// Release any resources; the chart is not updated afterwards
    fn dispose(&mut self);

    /// Paint the chart
    fn show(&self, ui: &mut egui::Ui);
}

/// Where a chart is mounted on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartSlot {
    TrafficBar,
    TrafficRadar,
    Regions,
    Accuracy,
    Loss,
}

impl ChartSlot {
    pub const ALL: [ChartSlot; 5] = [
        ChartSlot::TrafficBar,
        ChartSlot::TrafficRadar,
        ChartSlot::Regions,
        ChartSlot::Accuracy,
        ChartSlot::Loss,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// Mounted chart handles, one optional slot each
#[derive(Default)]
pub struct ChartBindings {
    slots: [Option<Box<dyn ChartPrimitive>>; 5],
}

impl std::fmt::Debug for ChartBindings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mounted: Vec<_> = ChartSlot::ALL
            .iter()
            .filter(|s| self.is_mounted(**s))
            .collect();
        f.debug_struct("ChartBindings")
            .field("mounted", &mounted)
            .finish()
    }
}

impl ChartBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bindings with an egui_plot chart in every slot
    pub fn with_plot_charts() -> Self {
        let mut bindings = Self::new();
        bindings.mount(ChartSlot::TrafficBar, Box::new(PlotChart::traffic_bar()));
        bindings.mount(ChartSlot::TrafficRadar, Box::new(PlotChart::traffic_radar()));
        bindings.mount(ChartSlot::Regions, Box::new(PlotChart::regions()));
        bindings.mount(ChartSlot::Accuracy, Box::new(PlotChart::accuracy()));
        bindings.mount(ChartSlot::Loss, Box::new(PlotChart::loss()));
        bindings
    }

    /// Mount a chart, disposing whatever was in the slot
    pub fn mount(&mut self, slot: ChartSlot, chart: Box<dyn ChartPrimitive>) {
        if let Some(mut old) = self.slots[slot.index()].replace(chart) {
            old.dispose();
        }
    }

    /// Remove and dispose the chart in `slot`
    pub fn unmount(&mut self, slot: ChartSlot) -> bool {
        match self.slots[slot.index()].take() {
            Some(mut chart) => {
                chart.dispose();
                true
            }
            None => false,
        }
    }

    /// Dispose every mounted chart
    pub fn dispose(&mut self) {
        for slot in ChartSlot::ALL {
            self.unmount(slot);
        }
    }

    pub fn is_mounted(&self, slot: ChartSlot) -> bool {
        self.slots[slot.index()].is_some()
    }

    pub fn chart(&self, slot: ChartSlot) -> Option<&dyn ChartPrimitive> {
        self.slots[slot.index()].as_deref()
    }

    fn push(&mut self, slot: ChartSlot, data: ChartData) -> bool {
        match self.slots[slot.index()].as_mut() {
            Some(chart) => {
                trace!("chart {:?} updated", slot);
                chart.update(data);
                true
            }
            None => false,
        }
    }

    /// Per-class traffic counts into the bar and radar charts
    ///
    /// Returns how many charts were updated.
    pub fn push_traffic(&mut self, counts: &[u64]) -> usize {
        let labels: Vec<String> = (0..counts.len()).map(traffic_class_label).collect();
        let values: Vec<f64> = counts.iter().map(|c| *c as f64).collect();
        let mut updated = 0;
        for slot in [ChartSlot::TrafficBar, ChartSlot::TrafficRadar] {
            let data = ChartData::Categories {
                labels: labels.clone(),
                values: values.clone(),
            };
            if self.push(slot, data) {
                updated += 1;
            }
        }
        updated
    }

    /// Per-country device counts into the region doughnut
    pub fn push_regions(&mut self, counts: &BTreeMap<String, usize>) -> bool {
        self.push(
            ChartSlot::Regions,
            ChartData::Categories {
                labels: counts.keys().cloned().collect(),
                values: counts.values().map(|c| *c as f64).collect(),
            },
        )
    }

    pub fn push_accuracy(&mut self, progress: &TrainingProgress) -> bool {
        self.push(
            ChartSlot::Accuracy,
            ChartData::Series {
                points: progress.accuracy_points(),
                x_max: progress.rounds() as f64,
            },
        )
    }

    pub fn push_loss(&mut self, progress: &TrainingProgress) -> bool {
        self.push(
            ChartSlot::Loss,
            ChartData::Series {
                points: progress.loss_points(),
                x_max: progress.rounds() as f64,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::*;

    #[test]
    fn test_absent_handles_are_noops() {
        let mut bindings = ChartBindings::new();
        assert_eq!(bindings.push_traffic(&[1, 2]), 0);
        assert!(!bindings.push_regions(&BTreeMap::new()));
        assert!(!bindings.push_accuracy(&TrainingProgress::new(3)));
        assert!(!bindings.unmount(ChartSlot::Loss));
    }

    #[test]
    fn test_push_traffic_labels_classes() {
        let mut bar = MockChartPrimitive::new();
        bar.expect_update()
            .with(eq(ChartData::Categories {
                labels: vec!["Benign".into(), "Non DDoS".into(), "DDoS icmp flood".into()],
                values: vec![0.0, 0.0, 2.0],
            }))
            .times(1)
            .return_const(());
        bar.expect_dispose().return_const(());

        let mut bindings = ChartBindings::new();
        bindings.mount(ChartSlot::TrafficBar, Box::new(bar));
        assert_eq!(bindings.push_traffic(&[0, 0, 2]), 1);
    }

    #[test]
    fn test_push_regions_in_name_order() {
        let mut doughnut = MockChartPrimitive::new();
        doughnut
            .expect_update()
            .withf(|data| {
                matches!(data, ChartData::Categories { labels, values }
                    if labels == &["Germany", "Kazakhstan"] && values == &[1.0, 3.0])
            })
            .times(1)
            .return_const(());
        doughnut.expect_dispose().return_const(());

        let mut bindings = ChartBindings::new();
        bindings.mount(ChartSlot::Regions, Box::new(doughnut));
        let counts = BTreeMap::from([("Kazakhstan".to_string(), 3), ("Germany".to_string(), 1)]);
        assert!(bindings.push_regions(&counts));
    }

    #[test]
    fn test_remount_disposes_previous() {
        let mut first = MockChartPrimitive::new();
        first.expect_dispose().times(1).return_const(());
        let mut second = MockChartPrimitive::new();
        second.expect_dispose().times(1).return_const(());

        let mut bindings = ChartBindings::new();
        bindings.mount(ChartSlot::Loss, Box::new(first));
        bindings.mount(ChartSlot::Loss, Box::new(second));
        bindings.dispose();
        assert!(!bindings.is_mounted(ChartSlot::Loss));
    }

    #[test]
    fn test_series_carry_round_range() {
        let mut line = MockChartPrimitive::new();
        line.expect_update()
            .with(eq(ChartData::Series {
                points: vec![[1.0, 0.5]],
                x_max: 10.0,
            }))
            .times(1)
            .return_const(());
        line.expect_dispose().return_const(());

        let mut progress = TrainingProgress::new(10);
        progress.record_accuracy(Some(1), Some(0.5));
        let mut bindings = ChartBindings::new();
        bindings.mount(ChartSlot::Accuracy, Box::new(line));
        assert!(bindings.push_accuracy(&progress));
        assert!(!bindings.push_loss(&progress));
    }
}
