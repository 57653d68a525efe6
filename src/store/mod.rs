//! Device state store and the statistics derived from it
//!
//! - [`device`]: the per-device records and event application
//! - [`stats`]: per-country and per-class counts recomputed on demand

pub mod device;
pub mod stats;

pub use device::{
    event_summary, placeholder_name, DevicePatch, DeviceRecord, DeviceStore, MODE_PLACEHOLDER,
    UNKNOWN_COUNTRY,
};
pub use stats::{country_counts, traffic_class_counts, traffic_class_label, TRAFFIC_CLASS_LABELS};
