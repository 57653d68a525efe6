//! Device state store
//!
//! Maps device identity to its last-known record and applies inbound events
//! field by field. Records are created on first reference and never
//! removed during a session. Every update is a plain field assignment, so
//! re-applying an event leaves the store unchanged.

use crate::protocol::{DeviceDescriptor, InboundMessage, TrafficReport};
use crate::types::{DeviceId, DeviceStatus};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, trace};

/// Shown when a device has not reported a mode
pub const MODE_PLACEHOLDER: &str = "-";

/// Country used until a device reports its location
pub const UNKNOWN_COUNTRY: &str = "Unknown";

/// Placeholder display name for a device first seen by id only
pub fn placeholder_name(id: DeviceId) -> String {
    format!("Device #{}", id)
}

/// Last-known state of one device
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceRecord {
    pub id: DeviceId,
    pub display_name: String,
    pub mode: String,
    pub status: DeviceStatus,
    /// Most recent status payload, kept verbatim
    pub last_status_payload: Option<Value>,
    /// Summary of the most recent inference event
    pub last_event_summary: Option<String>,
    pub country: String,
    /// Most recent traffic classification index
    pub traffic_class: Option<i64>,
    pub confidence: Option<f64>,
    pub traffic_label: Option<String>,
}

impl DeviceRecord {
    /// Record with defaults for a device seen for the first time
    pub fn new(id: DeviceId) -> Self {
        Self {
            id,
            display_name: placeholder_name(id),
            mode: MODE_PLACEHOLDER.to_string(),
            status: DeviceStatus::Offline,
            last_status_payload: None,
            last_event_summary: None,
            country: UNKNOWN_COUNTRY.to_string(),
            traffic_class: None,
            confidence: None,
            traffic_label: None,
        }
    }

    /// Status payload as indented JSON, for the detail view
    pub fn pretty_status(&self) -> Option<String> {
        self.last_status_payload
            .as_ref()
            .and_then(|v| serde_json::to_string_pretty(v).ok())
    }

    fn merge(&mut self, patch: DevicePatch) {
        if let Some(name) = patch.display_name {
            self.display_name = name;
        }
        if let Some(mode) = patch.mode {
            self.mode = mode;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(payload) = patch.last_status_payload {
            self.last_status_payload = Some(payload);
        }
        if let Some(summary) = patch.last_event_summary {
            self.last_event_summary = Some(summary);
        }
        if let Some(country) = patch.country {
            self.country = country;
        }
        if let Some(class) = patch.traffic_class {
            self.traffic_class = Some(class);
        }
        if let Some(confidence) = patch.confidence {
            self.confidence = Some(confidence);
        }
        if let Some(label) = patch.traffic_label {
            self.traffic_label = Some(label);
        }
    }
}

/// Partial update of a [`DeviceRecord`]; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DevicePatch {
    pub display_name: Option<String>,
    pub mode: Option<String>,
    pub status: Option<DeviceStatus>,
    pub last_status_payload: Option<Value>,
    pub last_event_summary: Option<String>,
    pub country: Option<String>,
    pub traffic_class: Option<i64>,
    pub confidence: Option<f64>,
    pub traffic_label: Option<String>,
}

impl DevicePatch {
    pub fn status(mut self, status: DeviceStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn name(mut self, name: Option<String>) -> Self {
        self.display_name = name;
        self
    }

    pub fn mode(mut self, mode: Option<String>) -> Self {
        self.mode = mode;
        self
    }

    fn from_descriptor(d: &DeviceDescriptor) -> Self {
        DevicePatch::default()
            .name(d.device_name.clone().filter(|n| !n.is_empty()))
            .mode(d.mode.clone().filter(|m| !m.is_empty()))
            .status(DeviceStatus::Online)
    }

    fn from_traffic(report: &TrafficReport) -> Self {
        let status = if report.is_danger() {
            DeviceStatus::Warning
        } else {
            DeviceStatus::Online
        };
        DevicePatch {
            display_name: report.device_name.clone().filter(|n| !n.is_empty()),
            status: Some(status),
            country: report
                .ip_data
                .as_ref()
                .and_then(|ip| ip.country.clone())
                .filter(|c| !c.is_empty()),
            traffic_class: report.prediction,
            confidence: report.confidence,
            traffic_label: report.prediction_label.clone(),
            ..Default::default()
        }
    }
}

/// Format the summary stored for an inference event
pub fn event_summary(event: Option<&str>, mode: Option<&str>) -> String {
    format!("{} ({})", event.unwrap_or("event"), mode.unwrap_or(MODE_PLACEHOLDER))
}

/// Mapping of device id to record, plus the operator's selection
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeviceStore {
    /// Records in first-seen order
    records: Vec<DeviceRecord>,
    #[serde(skip)]
    index: HashMap<DeviceId, usize>,
    selected: Option<DeviceId>,
}

impl PartialEq for DeviceStore {
    fn eq(&self, other: &Self) -> bool {
        self.records == other.records && self.selected == other.selected
    }
}

impl DeviceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the record for `id`, creating it with defaults first if
    /// needed, then merge `patch` into it
    pub fn ensure_device(&mut self, id: DeviceId, patch: Option<DevicePatch>) -> &mut DeviceRecord {
        let idx = match self.index.get(&id) {
            Some(&idx) => idx,
            None => {
                debug!("New device #{}", id);
                self.records.push(DeviceRecord::new(id));
                let idx = self.records.len() - 1;
                self.index.insert(id, idx);
                idx
            }
        };
        let record = &mut self.records[idx];
        if let Some(patch) = patch {
            record.merge(patch);
        }
        record
    }

    /// Apply one inbound event
    ///
    /// Returns `true` if the event concerns the store (whether or not any
    /// field actually changed). Kinds unrelated to devices are ignored.
    pub fn apply(&mut self, message: &InboundMessage) -> bool {
        trace!("store <- {}", message.kind());
        match message {
            InboundMessage::Snapshot(items) => {
                for item in items {
                    self.ensure_device(item.device_id, Some(DevicePatch::from_descriptor(item)));
                }
                if self.selected.is_none() {
                    self.selected = self.records.first().map(|r| r.id);
                    if let Some(id) = self.selected {
                        debug!("Auto-selected device #{}", id);
                    }
                }
                true
            }
            InboundMessage::Online(item) => {
                self.ensure_device(item.device_id, Some(DevicePatch::from_descriptor(item)));
                true
            }
            InboundMessage::Offline { device_id } => {
                self.ensure_device(
                    *device_id,
                    Some(DevicePatch::default().status(DeviceStatus::Offline)),
                );
                true
            }
            InboundMessage::Status { device_id, payload } => {
                self.ensure_device(
                    *device_id,
                    Some(DevicePatch {
                        last_status_payload: Some(payload.clone()),
                        status: Some(DeviceStatus::Online),
                        ..Default::default()
                    }),
                );
                true
            }
            InboundMessage::InferenceEvent {
                device_id,
                event,
                mode,
            } => {
                self.ensure_device(
                    *device_id,
                    Some(DevicePatch {
                        last_event_summary: Some(event_summary(event.as_deref(), mode.as_deref())),
                        status: Some(DeviceStatus::Online),
                        ..Default::default()
                    }),
                );
                true
            }
            InboundMessage::ModeChanged { device_id, mode } => {
                let mode = mode
                    .clone()
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| MODE_PLACEHOLDER.to_string());
                self.ensure_device(*device_id, Some(DevicePatch::default().mode(Some(mode))));
                true
            }
            InboundMessage::Traffic(report) => {
                self.ensure_device(report.device_id, Some(DevicePatch::from_traffic(report)));
                true
            }
            _ => false,
        }
    }

    /// Select a device for the detail view and outgoing commands
    ///
    /// Returns `false` (and keeps the current selection) for unknown ids.
    pub fn select(&mut self, id: DeviceId) -> bool {
        if self.index.contains_key(&id) {
            self.selected = Some(id);
            true
        } else {
            false
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<DeviceId> {
        self.selected
    }

    pub fn selected_record(&self) -> Option<&DeviceRecord> {
        self.selected.and_then(|id| self.get(id))
    }

    pub fn get(&self, id: DeviceId) -> Option<&DeviceRecord> {
        self.index.get(&id).map(|&idx| &self.records[idx])
    }

    /// Records in first-seen order
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &DeviceRecord> {
        self.records.iter()
    }

    /// Records sorted by display name, then id
    pub fn sorted_by_name(&self) -> Vec<&DeviceRecord> {
        let mut records: Vec<_> = self.records.iter().collect();
        records.sort_by(|a, b| {
            a.display_name
                .cmp(&b.display_name)
                .then_with(|| a.id.cmp(&b.id))
        });
        records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of devices per status
    pub fn count_by_status(&self, status: DeviceStatus) -> usize {
        self.records.iter().filter(|r| r.status == status).count()
    }
}
