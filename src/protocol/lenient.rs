//! Lenient field decoders for wire payloads
//!
//! The backend is not strict about number encoding: ids and class indices
//! arrive as numbers or numeric strings, matrix cells may be `null`, and
//! class labels may be integers. These helpers normalize that at decode time
//! so the rest of the crate only sees typed values.

use crate::types::DeviceId;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Int(i64),
    Float(f64),
    Text(String),
}

impl NumberOrText {
    fn as_i64(&self) -> Option<i64> {
        match self {
            NumberOrText::Int(v) => Some(*v),
            NumberOrText::Float(v) if v.fract() == 0.0 && v.is_finite() => Some(*v as i64),
            NumberOrText::Float(_) => None,
            NumberOrText::Text(s) => s.trim().parse().ok(),
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            NumberOrText::Int(v) => Some(*v as f64),
            NumberOrText::Float(v) => Some(*v),
            NumberOrText::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Device id from a number or a numeric string
pub fn device_id<'de, D>(deserializer: D) -> Result<DeviceId, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = NumberOrText::deserialize(deserializer)?;
    raw.as_i64()
        .and_then(|v| DeviceId::try_from(v).ok())
        .ok_or_else(|| serde::de::Error::custom("device_id must be a non-negative integer"))
}

/// Optional device id; `null`, absent and unparseable values become `None`
pub fn opt_device_id<'de, D>(deserializer: D) -> Result<Option<DeviceId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<NumberOrText>::deserialize(deserializer)?;
    Ok(raw
        .and_then(|r| r.as_i64())
        .and_then(|v| DeviceId::try_from(v).ok()))
}

/// Optional integer, parsed like `parseInt`
pub fn opt_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<NumberOrText>::deserialize(deserializer)?;
    Ok(raw.and_then(|r| r.as_i64()))
}

/// Optional float, parsed like `parseFloat`
pub fn opt_float<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<NumberOrText>::deserialize(deserializer)?;
    Ok(raw.and_then(|r| r.as_f64()).filter(|v| v.is_finite()))
}

/// Optional round number; zero counts as absent
pub fn opt_round<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_int(deserializer)?
        .and_then(|v| u32::try_from(v).ok())
        .filter(|v| *v > 0))
}

/// Optional label list; labels may be strings or numbers
pub fn opt_labels<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<Value>>::deserialize(deserializer)?;
    Ok(raw.map(|labels| labels.into_iter().map(label_text).collect()))
}

/// Optional numeric grid; `null` and non-numeric cells become `0`
pub fn opt_cells<'de, D>(deserializer: D) -> Result<Option<Vec<Vec<f64>>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<Option<Vec<Value>>>>::deserialize(deserializer)?;
    Ok(raw.map(|rows| {
        rows.into_iter()
            .map(|row| row.unwrap_or_default().iter().map(cell_value).collect())
            .collect()
    }))
}

/// Optional numeric row (e.g. support counts)
pub fn opt_row<'de, D>(deserializer: D) -> Result<Option<Vec<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<Value>>::deserialize(deserializer)?;
    Ok(raw.map(|row| row.iter().map(cell_value).collect()))
}

fn label_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn cell_value(value: &Value) -> f64 {
    let v = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    };
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(deserialize_with = "device_id")]
        id: DeviceId,
        #[serde(default, deserialize_with = "opt_int")]
        class: Option<i64>,
        #[serde(default, deserialize_with = "opt_labels")]
        labels: Option<Vec<String>>,
        #[serde(default, deserialize_with = "opt_cells")]
        cells: Option<Vec<Vec<f64>>>,
        #[serde(default, deserialize_with = "opt_round")]
        round: Option<u32>,
    }

    #[test]
    fn test_numeric_string_id() {
        let p: Probe = serde_json::from_str(r#"{"id": "42"}"#).unwrap();
        assert_eq!(p.id, 42);
        assert!(p.class.is_none());
    }

    #[test]
    fn test_negative_id_rejected() {
        assert!(serde_json::from_str::<Probe>(r#"{"id": -1}"#).is_err());
    }

    #[test]
    fn test_class_from_string() {
        let p: Probe = serde_json::from_str(r#"{"id": 1, "class": "7"}"#).unwrap();
        assert_eq!(p.class, Some(7));
    }

    #[test]
    fn test_mixed_labels() {
        let p: Probe = serde_json::from_str(r#"{"id": 1, "labels": [0, "attack", 2.5]}"#).unwrap();
        assert_eq!(
            p.labels,
            Some(vec!["0".to_string(), "attack".to_string(), "2.5".to_string()])
        );
    }

    #[test]
    fn test_null_cells_become_zero() {
        let p: Probe = serde_json::from_str(r#"{"id": 1, "cells": [[1, null], null]}"#).unwrap();
        assert_eq!(p.cells, Some(vec![vec![1.0, 0.0], vec![]]));
    }

    #[test]
    fn test_round_zero_is_absent() {
        let p: Probe = serde_json::from_str(r#"{"id": 1, "round": 0}"#).unwrap();
        assert_eq!(p.round, None);
        let p: Probe = serde_json::from_str(r#"{"id": 1, "round": 3}"#).unwrap();
        assert_eq!(p.round, Some(3));
    }
}
