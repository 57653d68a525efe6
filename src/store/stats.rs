//! Aggregate statistics over the device store
//!
//! Everything here is a full recompute from the current records. There are
//! no incremental counters to keep in sync.

use super::DeviceStore;
use std::collections::BTreeMap;

/// Names of the traffic classes reported by the monitoring model, by index
pub const TRAFFIC_CLASS_LABELS: [&str; 12] = [
    "Benign",
    "Non DDoS",
    "DDoS icmp flood",
    "DDoS UDP flood",
    "DDoS TCP flood",
    "DDoS PSHACK",
    "DDoS Syn flood",
    "DDoS RSTFN flood",
    "DDoS Synonymousip flood",
    "DDoS ICMP fragmentation",
    "DDoS UDP fragmentation",
    "DDoS ACK Fragmentation",
];

/// Display name for traffic class `class`
pub fn traffic_class_label(class: usize) -> String {
    TRAFFIC_CLASS_LABELS
        .get(class)
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("Class {}", class))
}

/// Number of devices per country, ordered by country name
pub fn country_counts(store: &DeviceStore) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for record in store.iter() {
        *counts.entry(record.country.clone()).or_insert(0) += 1;
    }
    counts
}

/// Number of devices per traffic class
///
/// The result always has `class_count` buckets. Devices without a
/// classification, or with one outside `[0, class_count)`, are skipped.
pub fn traffic_class_counts(store: &DeviceStore, class_count: usize) -> Vec<u64> {
    let mut buckets = vec![0u64; class_count];
    for class in store.iter().filter_map(|r| r.traffic_class) {
        if let Some(bucket) = usize::try_from(class).ok().and_then(|c| buckets.get_mut(c)) {
            *bucket += 1;
        }
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DevicePatch;

    fn with_classes(classes: &[i64]) -> DeviceStore {
        let mut store = DeviceStore::new();
        for (i, class) in classes.iter().enumerate() {
            store.ensure_device(
                i as u64 + 1,
                Some(DevicePatch {
                    traffic_class: Some(*class),
                    ..Default::default()
                }),
            );
        }
        store
    }

    #[test]
    fn test_traffic_buckets_skip_out_of_range() {
        let store = with_classes(&[2, 2, 99, -1]);
        let counts = traffic_class_counts(&store, 12);
        assert_eq!(counts.len(), 12);
        assert_eq!(counts[2], 2);
        assert_eq!(counts.iter().sum::<u64>(), 2);
    }

    #[test]
    fn test_traffic_buckets_empty_store() {
        assert_eq!(traffic_class_counts(&DeviceStore::new(), 4), vec![0; 4]);
    }

    #[test]
    fn test_country_counts() {
        let mut store = DeviceStore::new();
        for (id, country) in [(1, "Kazakhstan"), (2, "Germany"), (3, "Kazakhstan")] {
            store.ensure_device(
                id,
                Some(DevicePatch {
                    country: Some(country.to_string()),
                    ..Default::default()
                }),
            );
        }
        store.ensure_device(4, None);

        let counts = country_counts(&store);
        assert_eq!(counts.get("Kazakhstan"), Some(&2));
        assert_eq!(counts.get("Germany"), Some(&1));
        assert_eq!(counts.get("Unknown"), Some(&1));
        assert_eq!(counts.keys().next().map(String::as_str), Some("Germany"));
    }

    #[test]
    fn test_class_labels() {
        assert_eq!(traffic_class_label(0), "Benign");
        assert_eq!(traffic_class_label(11), "DDoS ACK Fragmentation");
        assert_eq!(traffic_class_label(12), "Class 12");
    }
}
