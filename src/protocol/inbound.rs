//! Inbound channel messages
//!
//! Every message is a JSON object with a `type` discriminator. Decoding is
//! two-phase: the text is parsed into a JSON value, then the payload is
//! decoded by the decoder registered for its kind. Kinds without a decoder
//! are reported as [`Decoded::Unknown`] and never misread as another shape.

use super::lenient;
use crate::error::{DashboardError, Result};
use crate::types::DeviceId;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Result of decoding one channel frame
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// A message of a known kind
    Message(InboundMessage),
    /// A well-formed frame whose `type` has no decoder
    Unknown(String),
}

/// Device identity as listed in snapshots and online announcements
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeviceDescriptor {
    #[serde(deserialize_with = "lenient::device_id")]
    pub device_id: DeviceId,
    #[serde(default)]
    pub device_name: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
}

/// Geolocation attached to a traffic report
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct IpData {
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default, alias = "isp")]
    pub org: Option<String>,
    #[serde(default, alias = "query")]
    pub ip: Option<String>,
}

/// Traffic classification reported by a device's on-board model
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrafficReport {
    #[serde(deserialize_with = "lenient::device_id")]
    pub device_id: DeviceId,
    #[serde(default)]
    pub device_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_int")]
    pub prediction: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_float")]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub prediction_label: Option<String>,
    /// `"danger"` or `"safe"`
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub ip_data: Option<IpData>,
}

impl TrafficReport {
    /// Whether the backend flagged the traffic as dangerous
    pub fn is_danger(&self) -> bool {
        self.status.as_deref() == Some("danger")
    }
}

/// Confusion matrix payload shared by several training messages
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct MatrixPayload {
    #[serde(default, deserialize_with = "lenient::opt_labels")]
    pub labels: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient::opt_cells")]
    pub matrix: Option<Vec<Vec<f64>>>,
    #[serde(default, deserialize_with = "lenient::opt_row")]
    pub support: Option<Vec<f64>>,
}

/// Aggregated model after a federated round
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct GlobalWeights {
    #[serde(default, deserialize_with = "lenient::opt_round")]
    pub round: Option<u32>,
    #[serde(default, deserialize_with = "lenient::opt_float")]
    pub accuracy: Option<f64>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_cells")]
    pub confusion: Option<Vec<Vec<f64>>>,
    #[serde(default, deserialize_with = "lenient::opt_labels")]
    pub classes: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient::opt_row")]
    pub support: Option<Vec<f64>>,
}

/// End of a training run
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct TrainingComplete {
    #[serde(default, deserialize_with = "lenient::opt_round")]
    pub rounds: Option<u32>,
    #[serde(default, deserialize_with = "lenient::opt_float")]
    pub final_accuracy: Option<f64>,
    #[serde(flatten)]
    pub matrix: MatrixPayload,
}

/// A decoded inbound message
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// Complete list of devices currently attached
    Snapshot(Vec<DeviceDescriptor>),
    /// Device connected
    Online(DeviceDescriptor),
    /// Device disconnected
    Offline { device_id: DeviceId },
    /// Opaque status payload from a device
    Status { device_id: DeviceId, payload: Value },
    /// Inference event (result or error) from a device
    InferenceEvent {
        device_id: DeviceId,
        event: Option<String>,
        mode: Option<String>,
    },
    /// Device switched its operating mode
    ModeChanged {
        device_id: DeviceId,
        mode: Option<String>,
    },
    /// Traffic classification from the monitoring feed
    Traffic(TrafficReport),
    /// Device acknowledged a run request
    RunAck {
        device_id: Option<DeviceId>,
        mode: Option<String>,
    },
    /// Backend relayed (or failed to relay) an operator command
    CommandResponse {
        device_id: Option<DeviceId>,
        command: Option<String>,
        success: bool,
    },
    /// Backend-reported error
    Error { message: String },
    /// Free-form training log line
    TrainLog { text: String },
    /// Aggregated weights and metrics for a round
    GlobalWeights(GlobalWeights),
    /// Average loss for a round
    TrainLoss { round: Option<u32>, loss: Option<f64> },
    /// Full confusion matrix replacement
    ConfusionMatrix(MatrixPayload),
    /// Single confusion matrix cell
    ConfusionUpdate { row: usize, col: usize, value: f64 },
    /// Training run finished
    TrainingComplete(TrainingComplete),
    /// Server started a training round
    TrainingStarted {
        round: Option<u32>,
        model: Option<String>,
    },
    /// Training participants currently connected
    Subscribers(Vec<DeviceDescriptor>),
    /// A training participant subscribed
    Subscribed { device_name: Option<String> },
}

impl InboundMessage {
    /// Canonical kind name, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            InboundMessage::Snapshot(_) => "snapshot",
            InboundMessage::Online(_) => "online",
            InboundMessage::Offline { .. } => "offline",
            InboundMessage::Status { .. } => "status",
            InboundMessage::InferenceEvent { .. } => "inference-event",
            InboundMessage::ModeChanged { .. } => "mode-changed",
            InboundMessage::Traffic(_) => "traffic",
            InboundMessage::RunAck { .. } => "run-ack",
            InboundMessage::CommandResponse { .. } => "command-response",
            InboundMessage::Error { .. } => "error",
            InboundMessage::TrainLog { .. } => "train-log",
            InboundMessage::GlobalWeights(_) => "global-weights",
            InboundMessage::TrainLoss { .. } => "train-loss",
            InboundMessage::ConfusionMatrix(_) => "confusion-matrix",
            InboundMessage::ConfusionUpdate { .. } => "confusion-update",
            InboundMessage::TrainingComplete(_) => "training-complete",
            InboundMessage::TrainingStarted { .. } => "training-started",
            InboundMessage::Subscribers(_) => "subscribers",
            InboundMessage::Subscribed { .. } => "subscribed",
        }
    }

    /// Device the message is about, if any
    pub fn device_id(&self) -> Option<DeviceId> {
        match self {
            InboundMessage::Online(d) => Some(d.device_id),
            InboundMessage::Offline { device_id }
            | InboundMessage::Status { device_id, .. }
            | InboundMessage::InferenceEvent { device_id, .. }
            | InboundMessage::ModeChanged { device_id, .. } => Some(*device_id),
            InboundMessage::Traffic(t) => Some(t.device_id),
            InboundMessage::RunAck { device_id, .. }
            | InboundMessage::CommandResponse { device_id, .. } => *device_id,
            _ => None,
        }
    }
}

// ==================== Per-kind payloads ====================

#[derive(Deserialize)]
struct SnapshotWire {
    #[serde(default)]
    items: Vec<DeviceDescriptor>,
}

#[derive(Deserialize)]
struct DeviceRef {
    #[serde(deserialize_with = "lenient::device_id")]
    device_id: DeviceId,
}

#[derive(Deserialize)]
struct StatusWire {
    #[serde(deserialize_with = "lenient::device_id")]
    device_id: DeviceId,
    #[serde(default)]
    payload: Value,
}

#[derive(Deserialize)]
struct InferenceWire {
    #[serde(deserialize_with = "lenient::device_id")]
    device_id: DeviceId,
    #[serde(default)]
    event: Option<String>,
    #[serde(default)]
    mode: Option<String>,
}

#[derive(Deserialize)]
struct ModeWire {
    #[serde(deserialize_with = "lenient::device_id")]
    device_id: DeviceId,
    #[serde(default)]
    mode: Option<String>,
}

#[derive(Deserialize)]
struct RunAckWire {
    #[serde(default, deserialize_with = "lenient::opt_device_id")]
    device_id: Option<DeviceId>,
    #[serde(default)]
    mode: Option<String>,
}

#[derive(Deserialize)]
struct CommandResponseWire {
    #[serde(default, deserialize_with = "lenient::opt_device_id")]
    device_id: Option<DeviceId>,
    #[serde(default)]
    command: Option<String>,
    #[serde(default)]
    success: bool,
}

#[derive(Deserialize)]
struct ErrorWire {
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct TrainLogWire {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct TrainLossWire {
    #[serde(default, deserialize_with = "lenient::opt_round")]
    round: Option<u32>,
    #[serde(default, deserialize_with = "lenient::opt_float")]
    loss: Option<f64>,
}

#[derive(Deserialize)]
struct CellWire {
    i: usize,
    j: usize,
    #[serde(default, deserialize_with = "lenient::opt_float")]
    value: Option<f64>,
}

#[derive(Deserialize)]
struct TrainingStartedWire {
    #[serde(default, deserialize_with = "lenient::opt_round")]
    round: Option<u32>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Deserialize)]
struct SubscribedWire {
    #[serde(default)]
    device_name: Option<String>,
}

fn payload<T: DeserializeOwned>(kind: &str, value: Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| DashboardError::Decode(format!("invalid {} payload: {}", kind, e)))
}

/// Decode one text frame from the channel
///
/// Returns an error for malformed JSON, a non-object frame, or a payload
/// that does not match its declared kind.
pub fn decode(text: &str) -> Result<Decoded> {
    let value: Value = serde_json::from_str(text)?;
    let kind = match &value {
        Value::Object(map) => map
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string(),
        _ => {
            return Err(DashboardError::Decode(
                "frame is not a JSON object".to_string(),
            ))
        }
    };

    let message = match kind.as_str() {
        "devices_snapshot" | "snapshot" => {
            InboundMessage::Snapshot(payload::<SnapshotWire>(&kind, value)?.items)
        }
        "device_online" | "online" => InboundMessage::Online(payload(&kind, value)?),
        "device_offline" | "offline" => {
            let r: DeviceRef = payload(&kind, value)?;
            InboundMessage::Offline {
                device_id: r.device_id,
            }
        }
        "status" => {
            let w: StatusWire = payload(&kind, value)?;
            InboundMessage::Status {
                device_id: w.device_id,
                payload: w.payload,
            }
        }
        "inference_event" | "inference-event" => {
            let w: InferenceWire = payload(&kind, value)?;
            InboundMessage::InferenceEvent {
                device_id: w.device_id,
                event: w.event,
                mode: w.mode,
            }
        }
        "mode_changed" | "mode-changed" => {
            let w: ModeWire = payload(&kind, value)?;
            InboundMessage::ModeChanged {
                device_id: w.device_id,
                mode: w.mode,
            }
        }
        "status_update" | "traffic" => InboundMessage::Traffic(payload(&kind, value)?),
        "run_ack" => {
            let w: RunAckWire = payload(&kind, value)?;
            InboundMessage::RunAck {
                device_id: w.device_id,
                mode: w.mode,
            }
        }
        "command_response" | "command-response" => {
            let w: CommandResponseWire = payload(&kind, value)?;
            InboundMessage::CommandResponse {
                device_id: w.device_id,
                command: w.command,
                success: w.success,
            }
        }
        "error" => InboundMessage::Error {
            message: payload::<ErrorWire>(&kind, value)?.message,
        },
        "train_log" | "train-log" => InboundMessage::TrainLog {
            text: payload::<TrainLogWire>(&kind, value)?.text,
        },
        "global_weights" | "global-weights" => InboundMessage::GlobalWeights(payload(&kind, value)?),
        "train_loss" | "train-loss" => {
            let w: TrainLossWire = payload(&kind, value)?;
            InboundMessage::TrainLoss {
                round: w.round,
                loss: w.loss,
            }
        }
        "confusion_matrix" | "confusion-matrix" => {
            InboundMessage::ConfusionMatrix(payload(&kind, value)?)
        }
        "confusion_update" | "confusion-update" => {
            let w: CellWire = payload(&kind, value)?;
            InboundMessage::ConfusionUpdate {
                row: w.i,
                col: w.j,
                value: w.value.unwrap_or(0.0),
            }
        }
        "training_complete" | "training-complete" => {
            InboundMessage::TrainingComplete(payload(&kind, value)?)
        }
        "start_training" => {
            let w: TrainingStartedWire = payload(&kind, value)?;
            InboundMessage::TrainingStarted {
                round: w.round,
                model: w.model,
            }
        }
        "full_subscribers" => {
            InboundMessage::Subscribers(payload::<SnapshotWire>(&kind, value)?.items)
        }
        "subscribe" => InboundMessage::Subscribed {
            device_name: payload::<SubscribedWire>(&kind, value)?.device_name,
        },
        _ => return Ok(Decoded::Unknown(kind)),
    };

    Ok(Decoded::Message(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_message(text: &str) -> InboundMessage {
        match decode(text).unwrap() {
            Decoded::Message(m) => m,
            Decoded::Unknown(kind) => panic!("unexpected unknown kind {}", kind),
        }
    }

    #[test]
    fn test_decode_snapshot() {
        let msg = decode_message(
            r#"{"type":"devices_snapshot","items":[{"device_id":1,"device_name":"edge-1","mode":"stream"},{"device_id":"2"}]}"#,
        );
        let InboundMessage::Snapshot(items) = msg else {
            panic!("expected snapshot");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].device_name.as_deref(), Some("edge-1"));
        assert_eq!(items[1].device_id, 2);
        assert_eq!(items[1].mode, None);
    }

    #[test]
    fn test_spec_kind_aliases() {
        assert_eq!(
            decode_message(r#"{"type":"offline","device_id":3}"#),
            InboundMessage::Offline { device_id: 3 }
        );
        assert_eq!(
            decode_message(r#"{"type":"mode-changed","device_id":3,"mode":"batch"}"#),
            InboundMessage::ModeChanged {
                device_id: 3,
                mode: Some("batch".into())
            }
        );
    }

    #[test]
    fn test_decode_status_keeps_payload_verbatim() {
        let msg = decode_message(
            r#"{"type":"status","device_id":5,"payload":{"cpu":0.4,"mode":"idle","nested":[1,2]}}"#,
        );
        let InboundMessage::Status { device_id, payload } = msg else {
            panic!("expected status");
        };
        assert_eq!(device_id, 5);
        assert_eq!(payload["nested"][1], 2);
    }

    #[test]
    fn test_decode_traffic_report() {
        let msg = decode_message(
            r#"{"type":"status_update","device_id":7,"prediction":"2","confidence":"0.93","prediction_label":"DDoS icmp flood","status":"danger","ip_data":{"country":"Norway","isp":"Telenor"}}"#,
        );
        let InboundMessage::Traffic(report) = msg else {
            panic!("expected traffic");
        };
        assert_eq!(report.prediction, Some(2));
        assert_eq!(report.confidence, Some(0.93));
        assert!(report.is_danger());
        let ip = report.ip_data.unwrap();
        assert_eq!(ip.country.as_deref(), Some("Norway"));
        assert_eq!(ip.org.as_deref(), Some("Telenor"));
    }

    #[test]
    fn test_decode_global_weights_with_matrix() {
        let msg = decode_message(
            r#"{"type":"global_weights","round":3,"accuracy":0.91,"confusion":[[50,2],[3,40]],"classes":[0,1],"payload":"abcd"}"#,
        );
        let InboundMessage::GlobalWeights(w) = msg else {
            panic!("expected global weights");
        };
        assert_eq!(w.round, Some(3));
        assert_eq!(w.confusion, Some(vec![vec![50.0, 2.0], vec![3.0, 40.0]]));
        assert_eq!(w.classes, Some(vec!["0".to_string(), "1".to_string()]));
    }

    #[test]
    fn test_decode_training_complete_flattened_matrix() {
        let msg = decode_message(
            r#"{"type":"training_complete","rounds":5,"final_accuracy":0.97,"labels":["benign","attack"],"matrix":[[9,1],[0,10]]}"#,
        );
        let InboundMessage::TrainingComplete(done) = msg else {
            panic!("expected training complete");
        };
        assert_eq!(done.rounds, Some(5));
        assert_eq!(done.matrix.labels.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn test_decode_confusion_update() {
        assert_eq!(
            decode_message(r#"{"type":"confusion_update","i":1,"j":0,"value":4}"#),
            InboundMessage::ConfusionUpdate {
                row: 1,
                col: 0,
                value: 4.0
            }
        );
    }

    #[test]
    fn test_unknown_kind_fails_closed() {
        assert_eq!(
            decode(r#"{"type":"pong"}"#).unwrap(),
            Decoded::Unknown("pong".into())
        );
        assert_eq!(
            decode(r#"{"device_id":1}"#).unwrap(),
            Decoded::Unknown("unknown".into())
        );
    }

    #[test]
    fn test_malformed_frames_are_errors() {
        assert!(matches!(decode("{not json"), Err(DashboardError::Decode(_))));
        assert!(matches!(decode("[1,2]"), Err(DashboardError::Decode(_))));
        // Known kind with the wrong shape is rejected, not misread.
        assert!(matches!(
            decode(r#"{"type":"device_offline","device_id":"abc"}"#),
            Err(DashboardError::Decode(_))
        ));
    }

    #[test]
    fn test_device_id_accessor() {
        let msg = decode_message(r#"{"type":"inference_event","device_id":9,"event":"error"}"#);
        assert_eq!(msg.device_id(), Some(9));
        assert_eq!(msg.kind(), "inference-event");
    }
}
