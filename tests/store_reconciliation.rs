//! Device store reconciliation over decoded wire frames

mod common;

use common::builders::{self, TrafficBuilder};
use fleetvis_rs::protocol::{decode, Decoded, InboundMessage};
use fleetvis_rs::store::{country_counts, traffic_class_counts, DeviceStore, MODE_PLACEHOLDER};
use fleetvis_rs::types::DeviceStatus;
use proptest::prelude::*;
use serde_json::json;

fn message(frame: &str) -> InboundMessage {
    match decode(frame).unwrap() {
        Decoded::Message(m) => m,
        Decoded::Unknown(kind) => panic!("unexpected unknown kind {}", kind),
    }
}

fn apply_all(store: &mut DeviceStore, frames: &[String]) {
    for frame in frames {
        store.apply(&message(frame));
    }
}

#[test]
fn test_snapshot_then_offline() {
    let mut store = DeviceStore::new();
    apply_all(
        &mut store,
        &[
            builders::snapshot(vec![
                builders::device(1, Some("Gateway"), Some("stream")),
                builders::device(2, None, None),
            ]),
            builders::offline(2),
        ],
    );

    assert_eq!(store.len(), 2);
    assert_eq!(store.selected(), Some(1));

    let first = store.get(1).unwrap();
    assert_eq!(first.display_name, "Gateway");
    assert_eq!(first.status, DeviceStatus::Online);

    let second = store.get(2).unwrap();
    assert_eq!(second.display_name, "Device #2");
    assert_eq!(second.mode, MODE_PLACEHOLDER);
    assert_eq!(second.status, DeviceStatus::Offline);
}

#[test]
fn test_events_for_unknown_device_create_it() {
    let mut store = DeviceStore::new();
    apply_all(
        &mut store,
        &[
            builders::status(9, json!({ "cpu": 12 })),
            builders::inference(10, "result", "batch"),
            builders::mode_changed(11, None),
        ],
    );

    assert_eq!(store.len(), 3);
    assert!(store.get(9).unwrap().pretty_status().unwrap().contains("cpu"));
    assert_eq!(
        store.get(10).unwrap().last_event_summary.as_deref(),
        Some("result (batch)")
    );
    assert_eq!(store.get(11).unwrap().mode, MODE_PLACEHOLDER);
    // Only snapshots auto-select
    assert_eq!(store.selected(), None);
}

#[test]
fn test_traffic_feeds_aggregates() {
    let mut store = DeviceStore::new();
    apply_all(
        &mut store,
        &[
            TrafficBuilder::new(1).prediction(0).country("DE").build(),
            TrafficBuilder::new(2).prediction(2).danger().country("DE").build(),
            TrafficBuilder::new(3).prediction(2).build(),
            TrafficBuilder::new(4).prediction(40).country("FR").build(),
        ],
    );

    assert_eq!(store.get(2).unwrap().status, DeviceStatus::Warning);
    assert_eq!(store.count_by_status(DeviceStatus::Warning), 1);

    let countries = country_counts(&store);
    assert_eq!(countries.get("DE"), Some(&2));
    assert_eq!(countries.get("FR"), Some(&1));
    assert_eq!(countries.get("Unknown"), Some(&1));

    let classes = traffic_class_counts(&store, 12);
    assert_eq!(classes.len(), 12);
    assert_eq!(classes[0], 1);
    assert_eq!(classes[2], 2);
    assert_eq!(classes.iter().sum::<u64>(), 3);
}

#[test]
fn test_later_snapshot_keeps_selection() {
    let mut store = DeviceStore::new();
    apply_all(
        &mut store,
        &[
            builders::snapshot(vec![builders::device(1, None, None)]),
            builders::online(5, Some("Late"), None),
        ],
    );
    assert!(store.select(5));
    apply_all(
        &mut store,
        &[builders::snapshot(vec![
            builders::device(1, None, None),
            builders::device(7, None, None),
        ])],
    );
    assert_eq!(store.selected(), Some(5));
    assert_eq!(store.len(), 3);
}

// ==================== Properties ====================

fn names() -> impl Strategy<Value = Option<&'static str>> {
    prop::option::of(prop::sample::select(vec!["alpha", "beta", ""]))
}

fn modes() -> impl Strategy<Value = Option<&'static str>> {
    prop::option::of(prop::sample::select(vec!["stream", "batch"]))
}

fn device_frame(id: u64) -> impl Strategy<Value = String> {
    prop_oneof![
        (names(), modes()).prop_map(move |(n, m)| builders::online(id, n, m)),
        Just(builders::offline(id)),
        (0u32..100).prop_map(move |v| builders::status(id, json!({ "v": v }))),
        modes().prop_map(move |m| builders::mode_changed(id, m)),
        (0i64..14, any::<bool>()).prop_map(move |(p, danger)| {
            let b = TrafficBuilder::new(id).prediction(p).confidence(0.5);
            if danger { b.danger().build() } else { b.build() }
        }),
        (names(), modes()).prop_map(move |(n, m)| {
            builders::snapshot(vec![builders::device(id, n, m)])
        }),
    ]
}

/// Per-device event sequences plus a merge order across devices
fn interleaving() -> impl Strategy<Value = (Vec<Vec<String>>, Vec<usize>)> {
    (1usize..4)
        .prop_flat_map(|devices| {
            let seqs: Vec<_> = (0..devices)
                .map(|d| prop::collection::vec(device_frame(d as u64 + 1), 0..8))
                .collect();
            (seqs, prop::collection::vec(0..devices, 0..64))
        })
}

proptest! {
    #[test]
    fn prop_applying_twice_is_idempotent(
        setup in prop::collection::vec(device_frame(1), 0..6),
        frame in device_frame(1),
    ) {
        let mut once = DeviceStore::new();
        apply_all(&mut once, &setup);
        let mut twice = once.clone();

        once.apply(&message(&frame));
        twice.apply(&message(&frame));
        twice.apply(&message(&frame));

        prop_assert_eq!(
            serde_json::to_string(&once).unwrap(),
            serde_json::to_string(&twice).unwrap()
        );
    }

    #[test]
    fn prop_per_device_order_decides_the_record((seqs, order) in interleaving()) {
        // Sequential: device by device
        let mut sequential = DeviceStore::new();
        for seq in &seqs {
            apply_all(&mut sequential, seq);
        }

        // Interleaved: follow `order`, then drain what is left
        let mut interleaved = DeviceStore::new();
        let mut cursors = vec![0usize; seqs.len()];
        for d in order {
            if let Some(frame) = seqs[d].get(cursors[d]) {
                interleaved.apply(&message(frame));
                cursors[d] += 1;
            }
        }
        for (d, seq) in seqs.iter().enumerate() {
            apply_all(&mut interleaved, &seq[cursors[d]..]);
        }

        prop_assert_eq!(sequential.len(), interleaved.len());
        for record in sequential.iter() {
            prop_assert_eq!(Some(record), interleaved.get(record.id));
        }
    }
}
