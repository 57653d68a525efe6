//! Outbound channel messages

use crate::error::{DashboardError, Result};
use crate::types::DeviceId;
use serde_json::{json, Map, Value};

/// A request sent from the dashboard to the backend
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundMessage {
    /// Subscribe/sync request sent as soon as the channel opens
    Subscribe { kind: String },
    /// Operator command for one device
    Command {
        device_id: DeviceId,
        command: String,
        params: Map<String, Value>,
    },
    /// Ask the server to start a federated training run
    StartTraining { model: String, rounds: u32 },
}

impl OutboundMessage {
    /// Subscribe request with the given `type`
    pub fn subscribe(kind: impl Into<String>) -> Self {
        OutboundMessage::Subscribe { kind: kind.into() }
    }

    /// Device command without parameters
    pub fn command(device_id: DeviceId, command: impl Into<String>) -> Self {
        OutboundMessage::Command {
            device_id,
            command: command.into(),
            params: Map::new(),
        }
    }

    /// Add a parameter to a command; other messages are returned unchanged
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        if let OutboundMessage::Command { params, .. } = &mut self {
            params.insert(key.into(), value.into());
        }
        self
    }

    /// Short name, used in logs
    pub fn kind(&self) -> &str {
        match self {
            OutboundMessage::Subscribe { kind } => kind,
            OutboundMessage::Command { .. } => "command",
            OutboundMessage::StartTraining { .. } => "start_training",
        }
    }

    /// JSON representation as expected by the backend
    pub fn to_json(&self) -> Value {
        match self {
            OutboundMessage::Subscribe { kind } => json!({ "type": kind }),
            OutboundMessage::Command {
                device_id,
                command,
                params,
            } => json!({
                "type": "command",
                "device_id": device_id,
                "command": command,
                "params": params,
            }),
            OutboundMessage::StartTraining { model, rounds } => json!({
                "type": "start_training",
                "model": model,
                "rounds": rounds,
            }),
        }
    }

    /// Encode as a text frame
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(&self.to_json())
            .map_err(|e| DashboardError::Serialization(format!("{} message: {}", self.kind(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_encoding() {
        let text = OutboundMessage::subscribe("ui_subscribe").encode().unwrap();
        assert_eq!(text, r#"{"type":"ui_subscribe"}"#);
    }

    #[test]
    fn test_command_encoding() {
        let msg = OutboundMessage::command(4, "set_mode").with_param("mode", "batch");
        let value = msg.to_json();
        assert_eq!(value["type"], "command");
        assert_eq!(value["device_id"], 4);
        assert_eq!(value["command"], "set_mode");
        assert_eq!(value["params"]["mode"], "batch");
    }

    #[test]
    fn test_with_param_ignored_for_non_commands() {
        let msg = OutboundMessage::subscribe("ui_sync").with_param("x", 1);
        assert_eq!(msg, OutboundMessage::subscribe("ui_sync"));
    }

    #[test]
    fn test_start_training_encoding() {
        let msg = OutboundMessage::StartTraining {
            model: "cnn".into(),
            rounds: 10,
        };
        assert_eq!(msg.to_json()["rounds"], 10);
        assert_eq!(msg.kind(), "start_training");
    }
}
