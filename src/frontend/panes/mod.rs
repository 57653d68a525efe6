//! Pane modules for the dashboard pages
//!
//! Each pane provides a render function that takes its own state, SharedState, and &mut Ui.
//! Panes return Vec<AppAction> instead of mutating state directly.

pub mod devices;
pub mod logs;
pub mod overview;
pub mod training;

pub use devices::DevicesPaneState;
pub use logs::LogsPaneState;
pub use overview::OverviewPaneState;
pub use training::TrainingPaneState;

use egui::Ui;

use crate::frontend::state::{AppAction, SharedState, Tab};

/// Trait implemented by all pane state types.
pub trait Pane {
    /// Page this pane fills
    fn tab(&self) -> Tab;

    /// Render the pane UI. Returns actions for the app to handle.
    fn render(&mut self, shared: &mut SharedState<'_>, ui: &mut Ui) -> Vec<AppAction>;
}

macro_rules! impl_pane {
    ($state:ty, $tab:expr, $module:ident) => {
        impl Pane for $state {
            fn tab(&self) -> Tab {
                $tab
            }

            fn render(&mut self, shared: &mut SharedState<'_>, ui: &mut Ui) -> Vec<AppAction> {
                $module::render(self, shared, ui)
            }
        }
    };
}

impl_pane!(DevicesPaneState, Tab::Devices, devices);
impl_pane!(OverviewPaneState, Tab::Overview, overview);
impl_pane!(TrainingPaneState, Tab::Training, training);
impl_pane!(LogsPaneState, Tab::Logs, logs);

/// One pane per page
pub fn default_panes(default_rounds: u32) -> Vec<Box<dyn Pane>> {
    vec![
        Box::new(DevicesPaneState::default()),
        Box::new(OverviewPaneState::default()),
        Box::new(TrainingPaneState::new(default_rounds)),
        Box::new(LogsPaneState::default()),
    ]
}
