//! Dashboard state hub
//!
//! [`Dashboard`] is the single [`MessageHandler`] registered with the
//! session. Each decoded message is applied to the device store, the
//! training progress or the heatmap, noted in the operator log, and the
//! affected aggregates are pushed to the chart bindings. The whole
//! transition completes before the next frame reads any of it.

use crate::charts::ChartBindings;
use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use crate::log_buffer::LogRingBuffer;
use crate::matrix::HeatmapEngine;
use crate::protocol::{InboundMessage, MatrixPayload, OutboundMessage};
use crate::store::{country_counts, traffic_class_counts, DeviceStore};
use crate::training::TrainingProgress;
use crate::transport::{MessageHandler, SessionEvent, SessionManager, Transport};
use crate::types::{DeviceId, Severity};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{error, info, warn};

/// Everything the front-end shows, fed by the session
#[derive(Debug)]
pub struct Dashboard {
    store: DeviceStore,
    training: TrainingProgress,
    heatmap: HeatmapEngine,
    log: LogRingBuffer,
    charts: ChartBindings,
    traffic_classes: usize,
}

impl Dashboard {
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            store: DeviceStore::new(),
            training: TrainingProgress::new(config.charts.default_rounds),
            heatmap: HeatmapEngine::new(config.matrix.clone()),
            log: LogRingBuffer::new(config.logs.capacity),
            charts: ChartBindings::new(),
            traffic_classes: config.charts.traffic_classes,
        }
    }

    /// Replace the chart bindings and push the current aggregates into them
    pub fn with_charts(mut self, charts: ChartBindings) -> Self {
        self.charts = charts;
        self.refresh_device_charts();
        self.refresh_training_charts();
        self
    }

    pub fn store(&self) -> &DeviceStore {
        &self.store
    }

    pub fn training(&self) -> &TrainingProgress {
        &self.training
    }

    pub fn heatmap(&self) -> &HeatmapEngine {
        &self.heatmap
    }

    pub fn heatmap_mut(&mut self) -> &mut HeatmapEngine {
        &mut self.heatmap
    }

    pub fn log(&self) -> &LogRingBuffer {
        &self.log
    }

    pub fn charts(&self) -> &ChartBindings {
        &self.charts
    }

    pub fn charts_mut(&mut self) -> &mut ChartBindings {
        &mut self.charts
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// Devices per country, recomputed
    pub fn country_counts(&self) -> BTreeMap<String, usize> {
        country_counts(&self.store)
    }

    /// Devices per traffic class, recomputed
    pub fn traffic_counts(&self) -> Vec<u64> {
        traffic_class_counts(&self.store, self.traffic_classes)
    }

    /// Append to the operator log and mirror it to tracing
    pub fn note(&mut self, severity: Severity, text: impl Into<String>) {
        let text = text.into();
        match severity {
            Severity::Info => info!("{}", text),
            Severity::Warn => warn!("{}", text),
            Severity::Error => error!("{}", text),
        }
        self.log.push(severity, text);
    }

    /// Operator picked a device
    pub fn select_device(&mut self, id: DeviceId) -> bool {
        self.store.select(id)
    }

    fn device_name(&self, id: DeviceId) -> String {
        self.store
            .get(id)
            .map(|r| r.display_name.clone())
            .unwrap_or_else(|| crate::store::placeholder_name(id))
    }

    fn refresh_device_charts(&mut self) {
        let traffic = self.traffic_counts();
        let regions = self.country_counts();
        self.charts.push_traffic(&traffic);
        self.charts.push_regions(&regions);
    }

    fn refresh_training_charts(&mut self) {
        self.charts.push_accuracy(&self.training);
        self.charts.push_loss(&self.training);
    }

    fn apply_matrix(&mut self, payload: &MatrixPayload) {
        self.heatmap.update(payload);
    }

    /// Send a command to the selected device
    ///
    /// Rejected locally, with a warning in the operator log, when nothing is
    /// selected or the channel is not open.
    pub fn send_command<T: Transport>(
        &mut self,
        session: &mut SessionManager<T>,
        command: &str,
        params: Map<String, Value>,
    ) -> Result<()> {
        let Some(device_id) = self.store.selected() else {
            self.note(Severity::Warn, format!("Command '{}' not sent: no device selected", command));
            return Err(DashboardError::NoDeviceSelected);
        };
        let message = OutboundMessage::Command {
            device_id,
            command: command.to_string(),
            params,
        };
        match session.send(&message) {
            Ok(()) => {
                let name = self.device_name(device_id);
                self.note(Severity::Info, format!("Command '{}' sent to {}", command, name));
                Ok(())
            }
            Err(e) => {
                let severity = if e.is_recoverable() {
                    Severity::Warn
                } else {
                    Severity::Error
                };
                self.note(severity, format!("Command '{}' not sent: {}", command, e));
                Err(e)
            }
        }
    }

    /// Ask the server to start a training run
    ///
    /// On success the series are reset and the heatmap cleared.
    pub fn start_training<T: Transport>(
        &mut self,
        session: &mut SessionManager<T>,
        model: &str,
        rounds: u32,
    ) -> Result<()> {
        let message = OutboundMessage::StartTraining {
            model: model.to_string(),
            rounds,
        };
        if let Err(e) = session.send(&message) {
            self.note(Severity::Warn, format!("Training not started: {}", e));
            return Err(e);
        }
        self.training.start(model, rounds);
        self.heatmap.clear();
        self.refresh_training_charts();
        self.note(
            Severity::Info,
            format!("Training started: {}, {} rounds", model.to_uppercase(), rounds),
        );
        Ok(())
    }

    /// Change the expected round count shown on the training charts
    pub fn set_rounds(&mut self, rounds: u32) {
        self.training.set_rounds(rounds);
        self.refresh_training_charts();
    }
}

impl Dashboard {
    fn note_out_of_range_round(&mut self, round: Option<u32>) {
        let ceiling = self.training.round_ceiling();
        if let Some(round) = round.filter(|r| *r > ceiling) {
            self.note(
                Severity::Warn,
                format!("Ignored round {} (expected at most {})", round, ceiling),
            );
        }
    }
}

fn fmt_opt<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "?".to_string(), |v| v.to_string())
}

impl MessageHandler for Dashboard {
    fn handle_message(&mut self, message: InboundMessage) {
        self.store.apply(&message);

        match &message {
            InboundMessage::Snapshot(items) => {
                self.note(Severity::Info, format!("Snapshot: {} devices", items.len()));
                self.refresh_device_charts();
            }
            InboundMessage::Online(d) => {
                let name = self.device_name(d.device_id);
                self.note(Severity::Info, format!("{} online", name));
                self.refresh_device_charts();
            }
            InboundMessage::Offline { device_id } => {
                let name = self.device_name(*device_id);
                self.note(Severity::Warn, format!("{} offline", name));
            }
            InboundMessage::Status { device_id, .. } => {
                let name = self.device_name(*device_id);
                self.note(Severity::Info, format!("Status from {}", name));
            }
            InboundMessage::InferenceEvent { device_id, .. } => {
                let record = self.store.get(*device_id);
                let summary = record
                    .and_then(|r| r.last_event_summary.clone())
                    .unwrap_or_default();
                let name = self.device_name(*device_id);
                self.note(Severity::Info, format!("{}: {}", name, summary));
            }
            InboundMessage::ModeChanged { device_id, .. } => {
                let name = self.device_name(*device_id);
                let mode = self.store.get(*device_id).map(|r| r.mode.clone()).unwrap_or_default();
                self.note(Severity::Info, format!("{} switched to {}", name, mode));
            }
            InboundMessage::Traffic(report) => {
                let name = self.device_name(report.device_id);
                let label = report
                    .prediction_label
                    .clone()
                    .or_else(|| {
                        report
                            .prediction
                            .and_then(|p| usize::try_from(p).ok())
                            .map(crate::store::traffic_class_label)
                    })
                    .unwrap_or_else(|| "unclassified".to_string());
                let severity = if report.is_danger() {
                    Severity::Warn
                } else {
                    Severity::Info
                };
                let confidence = report
                    .confidence
                    .map(|c| format!(" ({:.1}%)", c * 100.0))
                    .unwrap_or_default();
                self.note(severity, format!("{}: {}{}", name, label, confidence));
                self.refresh_device_charts();
            }
            InboundMessage::RunAck { device_id, mode } => {
                let name = device_id.map_or_else(|| "device".to_string(), |id| self.device_name(id));
                self.note(
                    Severity::Info,
                    format!("Run acknowledged by {} ({})", name, mode.as_deref().unwrap_or("-")),
                );
            }
            InboundMessage::CommandResponse {
                device_id,
                command,
                success,
            } => {
                let name = device_id.map_or_else(|| "device".to_string(), |id| self.device_name(id));
                let command = command.as_deref().unwrap_or("command");
                if *success {
                    self.note(Severity::Info, format!("'{}' delivered to {}", command, name));
                } else {
                    self.note(Severity::Error, format!("'{}' failed on {}", command, name));
                }
            }
            InboundMessage::Error { message } => {
                self.note(Severity::Error, format!("Server error: {}", message));
            }
            InboundMessage::TrainLog { text } => {
                if !text.is_empty() {
                    self.note(Severity::Info, text.clone());
                }
            }
            InboundMessage::GlobalWeights(weights) => {
                if self.training.record_accuracy(weights.round, weights.accuracy) {
                    self.charts.push_accuracy(&self.training);
                } else {
                    self.note_out_of_range_round(weights.round);
                }
                // Matrix first, then the labels that go with it
                if let Some(confusion) = &weights.confusion {
                    self.heatmap.set_matrix(confusion.clone());
                    if let Some(classes) = &weights.classes {
                        self.heatmap.set_labels(classes.clone());
                    }
                    if weights.support.is_some() {
                        self.heatmap.set_support(weights.support.clone());
                    }
                }
                self.note(
                    Severity::Info,
                    format!("Global weights received (round {})", fmt_opt(weights.round)),
                );
            }
            InboundMessage::TrainLoss { round, loss } => {
                if self.training.record_loss(*round, *loss) {
                    self.charts.push_loss(&self.training);
                } else {
                    self.note_out_of_range_round(*round);
                }
                let loss = loss.map_or_else(|| "-".to_string(), |l| format!("{:.4}", l));
                self.note(Severity::Info, format!("Loss at round {}: {}", fmt_opt(*round), loss));
            }
            InboundMessage::ConfusionMatrix(payload) => {
                self.apply_matrix(payload);
                self.note(Severity::Info, "Confusion matrix updated");
            }
            InboundMessage::ConfusionUpdate { row, col, value } => {
                if !self.heatmap.update_cell(*row, *col, *value) {
                    self.note(
                        Severity::Warn,
                        format!("Ignored update of cell ({}, {}) outside the matrix", row, col),
                    );
                }
            }
            InboundMessage::TrainingComplete(done) => {
                self.training.complete(done.rounds, done.final_accuracy);
                self.apply_matrix(&done.matrix);
                self.refresh_training_charts();
                let accuracy = self
                    .training
                    .final_accuracy()
                    .map(|a| format!(", final accuracy {:.3}", a))
                    .unwrap_or_default();
                self.note(Severity::Info, format!("Training complete{}", accuracy));
            }
            InboundMessage::TrainingStarted { round, model } => {
                self.note_out_of_range_round(*round);
                self.training.round_started(*round, model.as_deref());
                self.refresh_training_charts();
                self.note(
                    Severity::Info,
                    format!("Server started round {}", round.unwrap_or(0)),
                );
            }
            InboundMessage::Subscribers(items) => {
                for item in items {
                    let name = item
                        .device_name
                        .clone()
                        .unwrap_or_else(|| format!("device#{}", item.device_id));
                    self.note(Severity::Info, format!("Device connected: {}", name));
                }
            }
            InboundMessage::Subscribed { device_name } => {
                self.note(
                    Severity::Info,
                    format!("Client subscribed: {}", device_name.as_deref().unwrap_or("unknown")),
                );
            }
        }
    }

    fn handle_session_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Opened => self.note(Severity::Info, "Channel connected"),
            SessionEvent::Closed { reason, retry_in } => self.note(
                Severity::Warn,
                format!(
                    "Channel closed ({}), reconnecting in {:.1}s",
                    reason,
                    retry_in.as_secs_f32()
                ),
            ),
            SessionEvent::Reconnecting { attempt } => {
                self.note(Severity::Info, format!("Reconnecting (attempt {})", attempt))
            }
            SessionEvent::ParseError(e) => {
                self.note(Severity::Error, format!("Dropped malformed message: {}", e))
            }
            SessionEvent::UnknownKind(kind) => {
                self.note(Severity::Info, format!("Ignored message of type '{}'", kind))
            }
            SessionEvent::TransportError(e) => {
                self.note(Severity::Warn, format!("Channel error: {}", e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{DeviceDescriptor, GlobalWeights, TrafficReport};
    use crate::transport::{MockTransport, TransportEvent};
    use crate::types::{ChannelState, DeviceStatus};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    fn dashboard() -> Dashboard {
        Dashboard::new(&DashboardConfig::default())
    }

    fn descriptor(id: DeviceId) -> DeviceDescriptor {
        DeviceDescriptor {
            device_id: id,
            device_name: None,
            mode: None,
        }
    }

    /// Session whose transport opens at once and records every sent frame
    fn open_session(sent: Arc<Mutex<Vec<String>>>) -> SessionManager<MockTransport> {
        let queue = Arc::new(Mutex::new(VecDeque::from([TransportEvent::Opened])));
        let mut mock = MockTransport::new();
        mock.expect_connect().return_const(());
        mock.expect_send().returning(move |text| {
            sent.lock().unwrap().push(text);
            Ok(())
        });
        mock.expect_poll_event()
            .returning(move || queue.lock().unwrap().pop_front());
        let mut session = SessionManager::new(
            mock,
            Duration::from_secs(2),
            OutboundMessage::subscribe("ui_subscribe"),
        );
        session.start();
        session.pump(Instant::now(), &mut dashboard());
        assert_eq!(session.state(), ChannelState::Open);
        session
    }

    #[test]
    fn test_reconciliation_scenario() {
        let mut dash = dashboard();
        dash.handle_message(InboundMessage::Snapshot(vec![descriptor(1), descriptor(2)]));
        dash.handle_message(InboundMessage::Offline { device_id: 1 });

        assert_eq!(dash.store().get(1).unwrap().status, DeviceStatus::Offline);
        assert_eq!(dash.store().get(2).unwrap().status, DeviceStatus::Online);
        assert_eq!(dash.store().selected(), Some(1));
        assert_eq!(dash.log().len(), 2);
        assert_eq!(dash.log().last().unwrap().severity, Severity::Warn);
    }

    #[test]
    fn test_error_and_failed_command_logged_as_errors() {
        let mut dash = dashboard();
        dash.handle_message(InboundMessage::Error {
            message: "boom".into(),
        });
        dash.handle_message(InboundMessage::CommandResponse {
            device_id: Some(3),
            command: Some("reboot".into()),
            success: false,
        });
        assert!(dash.log().iter().all(|e| e.severity == Severity::Error));
        assert_eq!(dash.log().iter().next().unwrap().text, "Server error: boom");
    }

    #[test]
    fn test_traffic_updates_counts() {
        let mut dash = dashboard();
        for (id, class) in [(1, 2), (2, 2), (3, 99)] {
            dash.handle_message(InboundMessage::Traffic(TrafficReport {
                device_id: id,
                device_name: None,
                prediction: Some(class),
                confidence: None,
                prediction_label: None,
                status: None,
                ip_data: None,
            }));
        }
        let counts = dash.traffic_counts();
        assert_eq!(counts.len(), 12);
        assert_eq!(counts[2], 2);
        assert_eq!(counts.iter().sum::<u64>(), 2);
        assert_eq!(dash.country_counts().get("Unknown"), Some(&3));
        assert!(dash.log().last().unwrap().text.contains("Class 99"));
    }

    #[test]
    fn test_global_weights_feed_training_and_heatmap() {
        let mut dash = dashboard();
        dash.handle_message(InboundMessage::GlobalWeights(GlobalWeights {
            round: Some(2),
            accuracy: Some(0.9),
            model: None,
            confusion: Some(vec![vec![5.0, 1.0], vec![0.0, 4.0]]),
            classes: Some(vec!["benign".into(), "attack".into()]),
            support: None,
        }));
        assert_eq!(dash.training().accuracy_points(), vec![[2.0, 0.9]]);
        assert_eq!(dash.heatmap().state().max_value(), 5.0);
        assert_eq!(dash.heatmap().state().label(1), "attack");

        dash.handle_message(InboundMessage::ConfusionUpdate {
            row: 0,
            col: 1,
            value: 3.0,
        });
        assert_eq!(dash.heatmap().state().cell(0, 1), 3.0);
        dash.handle_message(InboundMessage::ConfusionUpdate {
            row: 7,
            col: 1,
            value: 3.0,
        });
        assert_eq!(dash.log().last().unwrap().severity, Severity::Warn);
    }

    #[test]
    fn test_session_events_logged() {
        let mut dash = dashboard();
        dash.handle_session_event(SessionEvent::Closed {
            reason: "reset".into(),
            retry_in: Duration::from_secs(2),
        });
        dash.handle_session_event(SessionEvent::ParseError("bad".into()));
        let texts: Vec<_> = dash.log().iter().map(|e| e.text.clone()).collect();
        assert_eq!(texts[0], "Channel closed (reset), reconnecting in 2.0s");
        assert_eq!(dash.log().last().unwrap().severity, Severity::Error);
    }

    #[test]
    fn test_command_without_selection_rejected() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let mut session = open_session(sent.clone());
        let mut dash = dashboard();
        let result = dash.send_command(&mut session, "run_inference", Map::new());
        assert!(matches!(result, Err(DashboardError::NoDeviceSelected)));
        assert_eq!(dash.log().last().unwrap().severity, Severity::Warn);
        // Only the subscribe request went out
        assert_eq!(sent.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_command_to_selected_device() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let mut session = open_session(sent.clone());
        let mut dash = dashboard();
        dash.handle_message(InboundMessage::Snapshot(vec![descriptor(4)]));

        let mut params = Map::new();
        params.insert("mode".into(), Value::from("stream"));
        dash.send_command(&mut session, "set_mode", params).unwrap();

        let frames = sent.lock().unwrap();
        let frame: Value = serde_json::from_str(&frames[1]).unwrap();
        assert_eq!(frame["type"], "command");
        assert_eq!(frame["device_id"], 4);
        assert_eq!(frame["params"]["mode"], "stream");
    }

    #[test]
    fn test_command_while_closed_not_ready() {
        let mut mock = MockTransport::new();
        mock.expect_send().never();
        let mut session = SessionManager::new(
            mock,
            Duration::from_secs(2),
            OutboundMessage::subscribe("ui_subscribe"),
        );
        let mut dash = dashboard();
        dash.handle_message(InboundMessage::Snapshot(vec![descriptor(1)]));
        let result = dash.send_command(&mut session, "reboot", Map::new());
        assert!(matches!(result, Err(DashboardError::NotReady { .. })));
        assert!(dash.log().last().unwrap().text.contains("not sent"));

        let result = dash.start_training(&mut session, "cnn", 5);
        assert!(result.is_err());
        assert!(!dash.training().is_running());
    }

    #[test]
    fn test_start_training_resets_progress() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let mut session = open_session(sent.clone());
        let mut dash = dashboard();
        dash.handle_message(InboundMessage::ConfusionMatrix(MatrixPayload {
            labels: None,
            matrix: Some(vec![vec![1.0]]),
            support: None,
        }));
        dash.handle_message(InboundMessage::TrainLoss {
            round: Some(1),
            loss: Some(0.7),
        });

        dash.start_training(&mut session, "cnn", 5).unwrap();
        assert!(dash.training().is_running());
        assert!(dash.training().loss_points().is_empty());
        assert!(dash.heatmap().state().is_empty());
        assert_eq!(
            sent.lock().unwrap()[1],
            r#"{"model":"cnn","rounds":5,"type":"start_training"}"#
        );
    }
}
