//! Custom widgets for the FleetVis-RS UI
//!
//! - [`StatusIndicator`] - Colored status dot with label
//! - [`ValueDisplay`] - Label and formatted value on one line

use crate::types::{ChannelState, DeviceStatus, Severity};
use egui::{Color32, Response, RichText, Ui, Widget};

/// Dot colour for a device status
pub fn device_status_color(status: DeviceStatus) -> Color32 {
    match status {
        DeviceStatus::Online => Color32::from_rgb(46, 204, 113),
        DeviceStatus::Offline => Color32::GRAY,
        DeviceStatus::Warning => Color32::from_rgb(241, 196, 15),
    }
}

/// Text colour for an operator log line
pub fn severity_color(severity: Severity) -> Color32 {
    match severity {
        Severity::Info => Color32::LIGHT_GRAY,
        Severity::Warn => Color32::from_rgb(241, 196, 15),
        Severity::Error => Color32::LIGHT_RED,
    }
}

/// A widget that displays a colored status indicator
pub struct StatusIndicator {
    color: Color32,
    label: String,
    tooltip: Option<String>,
}

impl StatusIndicator {
    /// Create a new status indicator with the given color and label
    pub fn new(color: Color32, label: impl Into<String>) -> Self {
        Self {
            color,
            label: label.into(),
            tooltip: None,
        }
    }

    /// Indicator for the channel state
    pub fn channel(state: ChannelState) -> Self {
        match state {
            ChannelState::Open => Self::new(Color32::GREEN, "Connected"),
            ChannelState::Connecting => Self::new(Color32::YELLOW, "Connecting..."),
            ChannelState::Closed => Self::new(Color32::RED, "Disconnected"),
            ChannelState::Idle => Self::new(Color32::GRAY, "Idle"),
        }
    }

    /// Indicator for a device
    pub fn device(status: DeviceStatus) -> Self {
        Self::new(device_status_color(status), status.as_str())
    }

    /// Add a tooltip to the indicator
    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }
}

impl Widget for StatusIndicator {
    fn ui(self, ui: &mut Ui) -> Response {
        let response = ui.horizontal(|ui| {
            ui.colored_label(self.color, "●");
            ui.label(&self.label);
        });

        let response = response.response;

        if let Some(tooltip) = self.tooltip {
            response.on_hover_text(tooltip)
        } else {
            response
        }
    }
}

/// A widget for displaying a value with a label
pub struct ValueDisplay {
    label: String,
    value: String,
    color: Option<Color32>,
}

impl ValueDisplay {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            color: None,
        }
    }

    /// Set the color of the value
    pub fn with_color(mut self, color: Color32) -> Self {
        self.color = Some(color);
        self
    }
}

impl Widget for ValueDisplay {
    fn ui(self, ui: &mut Ui) -> Response {
        ui.horizontal(|ui| {
            ui.label(RichText::new(format!("{}:", self.label)).weak());
            let text = RichText::new(self.value).monospace();
            match self.color {
                Some(color) => ui.colored_label(color, text),
                None => ui.label(text),
            };
        })
        .response
    }
}
