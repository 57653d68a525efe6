//! Shared state types for the frontend
//!
//! Panes receive a [`SharedState`] borrow and return [`AppAction`]s instead
//! of talking to the session directly. The app applies the actions after
//! the frame's panes have rendered.

use crate::dashboard::Dashboard;
use crate::types::{ChannelState, DeviceId};
use serde_json::{Map, Value};
use std::time::Duration;

/// Top-level pages of the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    #[default]
    Devices,
    Overview,
    Training,
    Logs,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Devices, Tab::Overview, Tab::Training, Tab::Logs];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Devices => "Devices",
            Tab::Overview => "Overview",
            Tab::Training => "Training",
            Tab::Logs => "Logs",
        }
    }
}

/// Channel status as shown to panes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelInfo {
    pub state: ChannelState,
    pub attempts: u64,
    /// Time until the pending reconnect, if one is scheduled
    pub retry_in: Option<Duration>,
}

impl ChannelInfo {
    pub fn is_open(&self) -> bool {
        self.state == ChannelState::Open
    }
}

/// Shared state accessible by all panes (borrowed, not owned)
pub struct SharedState<'a> {
    pub dashboard: &'a mut Dashboard,
    pub channel: ChannelInfo,
}

/// Actions that any pane can emit
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    /// Select a device for the detail view and commands
    SelectDevice(DeviceId),
    /// Send a command to the selected device
    SendCommand {
        command: String,
        params: Map<String, Value>,
    },
    /// Ask the server to start training
    StartTraining { model: String, rounds: u32 },
    /// Change the expected round count before a run
    SetRounds(u32),
    /// Empty the operator log
    ClearLog,
    /// Show another page
    SwitchTab(Tab),
}

impl AppAction {
    /// Command without parameters
    pub fn command(command: impl Into<String>) -> Self {
        AppAction::SendCommand {
            command: command.into(),
            params: Map::new(),
        }
    }
}
