//! Test data builders for wire frames

use serde_json::{json, Value};

/// Builder for a traffic (`status_update`) frame
pub struct TrafficBuilder {
    device_id: u64,
    prediction: Option<i64>,
    label: Option<String>,
    confidence: Option<f64>,
    danger: bool,
    country: Option<String>,
}

impl TrafficBuilder {
    pub fn new(device_id: u64) -> Self {
        Self {
            device_id,
            prediction: None,
            label: None,
            confidence: None,
            danger: false,
            country: None,
        }
    }

    pub fn prediction(mut self, class: i64) -> Self {
        self.prediction = Some(class);
        self
    }

    pub fn label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn danger(mut self) -> Self {
        self.danger = true;
        self
    }

    pub fn country(mut self, country: &str) -> Self {
        self.country = Some(country.to_string());
        self
    }

    pub fn build(self) -> String {
        let mut frame = json!({
            "type": "status_update",
            "device_id": self.device_id,
            "status": if self.danger { "danger" } else { "safe" },
        });
        if let Some(p) = self.prediction {
            frame["prediction"] = json!(p);
        }
        if let Some(l) = self.label {
            frame["prediction_label"] = json!(l);
        }
        if let Some(c) = self.confidence {
            frame["confidence"] = json!(c);
        }
        if let Some(c) = self.country {
            frame["ip_data"] = json!({ "country": c });
        }
        frame.to_string()
    }
}

pub fn device(id: u64, name: Option<&str>, mode: Option<&str>) -> Value {
    let mut item = json!({ "device_id": id });
    if let Some(name) = name {
        item["device_name"] = json!(name);
    }
    if let Some(mode) = mode {
        item["mode"] = json!(mode);
    }
    item
}

pub fn snapshot(items: Vec<Value>) -> String {
    json!({ "type": "devices_snapshot", "items": items }).to_string()
}

pub fn online(id: u64, name: Option<&str>, mode: Option<&str>) -> String {
    let mut frame = device(id, name, mode);
    frame["type"] = json!("device_online");
    frame.to_string()
}

pub fn offline(id: u64) -> String {
    json!({ "type": "device_offline", "device_id": id }).to_string()
}

pub fn status(id: u64, payload: Value) -> String {
    json!({ "type": "status", "device_id": id, "payload": payload }).to_string()
}

pub fn mode_changed(id: u64, mode: Option<&str>) -> String {
    json!({ "type": "mode_changed", "device_id": id, "mode": mode }).to_string()
}

pub fn inference(id: u64, event: &str, mode: &str) -> String {
    json!({ "type": "inference_event", "device_id": id, "event": event, "mode": mode }).to_string()
}

pub fn confusion_matrix(labels: &[&str], matrix: Value) -> String {
    json!({ "type": "confusion_matrix", "labels": labels, "matrix": matrix }).to_string()
}

pub fn confusion_update(i: usize, j: usize, value: f64) -> String {
    json!({ "type": "confusion_update", "i": i, "j": j, "value": value }).to_string()
}

pub fn global_weights(round: u32, accuracy: Option<f64>) -> String {
    json!({ "type": "global_weights", "round": round, "accuracy": accuracy }).to_string()
}

pub fn train_loss(round: u32, loss: f64) -> String {
    json!({ "type": "train_loss", "round": round, "loss": loss }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_traffic_builder() {
        let frame: Value = serde_json::from_str(
            &TrafficBuilder::new(4)
                .prediction(3)
                .confidence(0.9)
                .danger()
                .country("FR")
                .build(),
        )
        .unwrap();

        assert_eq!(frame["type"], "status_update");
        assert_eq!(frame["status"], "danger");
        assert_eq!(frame["ip_data"]["country"], "FR");
        assert!(frame.get("prediction_label").is_none());
    }
}
