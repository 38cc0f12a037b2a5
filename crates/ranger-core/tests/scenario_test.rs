//! End-to-end ingestion scenarios: scan reports in, snapshot rows out.

use ranger_core::{
    DeviceClass, DeviceReport, DistanceModel, ObservationRegistry, ScanReport, ScanSession,
};

fn report(id: &str, rssi: i32, reference: Option<i32>, at: i64) -> ScanReport {
    ScanReport {
        device_id: id.to_string(),
        name: None,
        signal_strength: rssi,
        reference_power: reference,
        device_class: DeviceClass::ShortRangeAdvertising,
        observed_at_ms: Some(at),
        model: None,
    }
}

fn ingest(registry: &ObservationRegistry, report: ScanReport) {
    let model = report.model.unwrap_or_else(|| registry.model());
    let observation = report.into_observation(0).expect("valid report");
    registry.upsert_with_model(observation, model);
}

fn rows(registry: &ObservationRegistry) -> Vec<DeviceReport> {
    registry.snapshot().iter().map(DeviceReport::from).collect()
}

#[test]
fn test_repeated_sighting_keeps_latest_signal() {
    let registry = ObservationRegistry::default();
    ingest(&registry, report("A", -65, Some(-59), 0));
    ingest(&registry, report("A", -80, Some(-59), 1_000));

    let rows = rows(&registry);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].device_id, "A");
    assert_eq!(rows[0].signal_strength, -80);
    assert_eq!(rows[0].observed_at_ms, 1_000);
}

#[test]
fn test_unreadable_signal_has_absent_distance() {
    let registry = ObservationRegistry::default();
    ingest(&registry, report("B", 0, Some(-59), 0));

    let rows = rows(&registry);
    assert_eq!(rows[0].estimated_distance, None);
    assert_eq!(rows[0].distance_text, "unknown");
}

#[test]
fn test_sweep_window_boundaries() {
    let registry = ObservationRegistry::default();
    ingest(&registry, report("C", -70, Some(-59), 0));

    registry.evict_stale(59_000, 60_000);
    assert!(registry.get("C").is_some());

    registry.evict_stale(61_000, 60_000);
    assert!(registry.get("C").is_none());
}

#[test]
fn test_per_report_model_selection() {
    let registry = ObservationRegistry::new(DistanceModel::RatioPower, -59);
    let mut log_report = report("L", -79, Some(-59), 0);
    log_report.model = Some(DistanceModel::LogDistance);

    ingest(&registry, log_report);
    ingest(&registry, report("R", -79, Some(-59), 0));

    let log_entry = registry.get("L").unwrap();
    let ratio_entry = registry.get("R").unwrap();
    assert_eq!(log_entry.model(), DistanceModel::LogDistance);
    assert_eq!(ratio_entry.model(), DistanceModel::RatioPower);
    assert!((log_entry.estimated_distance().unwrap() - 10.0).abs() < 1e-9);
    assert_ne!(log_entry.estimated_distance(), ratio_entry.estimated_distance());
}

#[test]
fn test_mixed_device_classes() {
    let registry = ObservationRegistry::default();
    ingest(&registry, report("ble", -65, Some(-59), 0));

    let mut beacon = report("beacon-msg", -70, None, 0);
    beacon.device_class = DeviceClass::Beacon;
    ingest(&registry, beacon);

    let mut classic = report("classic", -60, Some(-59), 0);
    classic.device_class = DeviceClass::ClassicPairing;
    classic.name = Some("Car Stereo".into());
    ingest(&registry, classic);

    let rows = rows(&registry);
    assert_eq!(rows.len(), 3);

    let beacon_row = rows.iter().find(|r| r.device_id == "beacon-msg").unwrap();
    assert_eq!(beacon_row.display_name, "Beacon");
    assert!(beacon_row.estimated_distance.is_some());

    let classic_row = rows.iter().find(|r| r.device_id == "classic").unwrap();
    assert_eq!(classic_row.display_name, "Car Stereo");
    assert_eq!(classic_row.estimated_distance, None);
    assert_eq!(classic_row.reference_power, None);
}

#[test]
fn test_lost_beacon_is_removed_and_unknown_loss_ignored() {
    let registry = ObservationRegistry::default();
    ingest(&registry, report("beacon", -70, None, 0));

    assert!(registry.remove("beacon"));
    assert!(!registry.remove("beacon"));
    assert!(!registry.remove("never-seen"));
    assert!(rows(&registry).is_empty());
}

#[test]
fn test_stopping_session_keeps_observations() {
    let registry = ObservationRegistry::default();
    let mut session = ScanSession::new(10_000);

    session.start(0);
    ingest(&registry, report("A", -65, Some(-59), 500));
    assert!(session.expire(10_000));

    assert_eq!(registry.len(), 1);
    assert_eq!(registry.evict_stale(30_000, 60_000), 0);
}

#[test]
fn test_long_idle_period_is_harmless() {
    let registry = ObservationRegistry::default();
    for now in (0..10).map(|i| i * 3_600_000) {
        assert_eq!(registry.evict_stale_default(now), 0);
    }
    assert!(registry.snapshot().is_empty());
}
