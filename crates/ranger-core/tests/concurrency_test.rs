//! Registry behaviour under concurrent ingestion, removal, and snapshots.

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use ranger_core::{DeviceClass, Observation, ObservationRegistry};

const WRITERS: usize = 8;
const DEVICES_PER_WRITER: usize = 50;
const ROUNDS: i64 = 20;

fn sighting(id: &str, rssi: i32, at: i64) -> Observation {
    Observation::new(id, None, rssi, Some(-59), DeviceClass::ShortRangeAdvertising, at).unwrap()
}

#[test]
fn test_concurrent_upserts_keep_one_entry_per_device() {
    let registry = Arc::new(ObservationRegistry::default());

    let handles: Vec<_> = (0..WRITERS)
        .map(|writer| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for round in 0..ROUNDS {
                    for device in 0..DEVICES_PER_WRITER {
                        let id = format!("w{writer}-d{device}");
                        registry.upsert(sighting(&id, -60 - i32::try_from(round).unwrap(), round));
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(registry.len(), WRITERS * DEVICES_PER_WRITER);
    for entry in registry.snapshot() {
        assert_eq!(entry.observation().observed_at_ms(), ROUNDS - 1);
    }
}

#[test]
fn test_snapshots_never_contain_duplicates_during_writes() {
    let registry = Arc::new(ObservationRegistry::default());

    let writer = {
        let registry = Arc::clone(&registry);
        thread::spawn(move || {
            for round in 0..500_i64 {
                let id = format!("dev-{}", round % 25);
                registry.upsert(sighting(&id, -70, round));
                if round % 7 == 0 {
                    registry.remove(&format!("dev-{}", (round + 3) % 25));
                }
                if round % 50 == 0 {
                    registry.evict_stale(round, 100);
                }
            }
        })
    };

    let reader = {
        let registry = Arc::clone(&registry);
        thread::spawn(move || {
            for _ in 0..500 {
                let snapshot = registry.snapshot();
                let ids: HashSet<&str> = snapshot.iter().map(|e| e.device_id()).collect();
                assert_eq!(ids.len(), snapshot.len());
                assert!(snapshot.len() <= 25);
            }
        })
    };

    writer.join().unwrap();
    reader.join().unwrap();
}

#[test]
fn test_concurrent_sweeps_are_idempotent() {
    let registry = Arc::new(ObservationRegistry::default());
    for i in 0..100_i64 {
        registry.upsert(sighting(&format!("dev-{i}"), -70, i * 1_000));
    }

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || registry.evict_stale(100_000, 60_000))
        })
        .collect();

    let evicted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(evicted, 41);
    assert_eq!(registry.len(), 59);
}
