//! Latest-observation-per-device registry with age-based eviction.
//!
//! The registry keeps at most one [`RegistryEntry`] per device id. A newer
//! observation replaces the previous entry wholesale. Entries leave the
//! registry through [`ObservationRegistry::remove`] (the device was reported
//! lost) or through [`ObservationRegistry::evict_stale`], which the owner calls
//! on its own timer; the registry never schedules work itself.
//!
//! All operations take a single lock for their whole duration, so a
//! [`snapshot`](ObservationRegistry::snapshot) never sees a half-applied
//! mutation. Snapshots are ordered by last update, oldest first.

use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use tracing::{debug, info};

use crate::config::EstimationConfig;
use crate::distance::{DistanceModel, DEFAULT_REFERENCE_POWER};
use crate::observation::Observation;

/// Aging threshold used when none is configured (60 seconds).
pub const DEFAULT_MAX_AGE_MS: i64 = 60_000;

/// An observation together with the distance estimated at ingestion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistryEntry {
    observation: Observation,
    estimated_distance: Option<f64>,
    model: DistanceModel,
}

impl RegistryEntry {
    /// Estimate the distance for `observation` and wrap it.
    #[must_use]
    pub fn new(
        observation: Observation,
        model: DistanceModel,
        default_reference_power: i32,
    ) -> Self {
        let estimated_distance = observation.estimate_distance(model, default_reference_power);
        Self {
            observation,
            estimated_distance,
            model,
        }
    }

    /// The stored observation.
    #[must_use]
    pub const fn observation(&self) -> &Observation {
        &self.observation
    }

    /// Registry key.
    #[must_use]
    pub fn device_id(&self) -> &str {
        self.observation.device_id()
    }

    /// Estimated distance in meters, `None` when unknown.
    #[must_use]
    pub const fn estimated_distance(&self) -> Option<f64> {
        self.estimated_distance
    }

    /// Model the estimate was computed with.
    #[must_use]
    pub const fn model(&self) -> DistanceModel {
        self.model
    }
}

/// What an upsert did to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// The device was absent and is now present.
    Inserted,
    /// The device was present and its entry was replaced.
    Replaced,
}

#[derive(Debug)]
struct Slot {
    seq: u64,
    entry: RegistryEntry,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, Slot>,
    // update sequence -> device id, for ordered snapshots
    order: BTreeMap<u64, String>,
    next_seq: u64,
}

impl Inner {
    fn take(&mut self, device_id: &str) -> Option<Slot> {
        let slot = self.entries.remove(device_id)?;
        self.order.remove(&slot.seq);
        Some(slot)
    }
}

/// Thread-safe registry of the most recent observation per device.
#[derive(Debug)]
pub struct ObservationRegistry {
    inner: RwLock<Inner>,
    model: DistanceModel,
    default_reference_power: i32,
}

impl Default for ObservationRegistry {
    fn default() -> Self {
        Self::new(DistanceModel::default(), DEFAULT_REFERENCE_POWER)
    }
}

impl ObservationRegistry {
    /// Create an empty registry that estimates with `model`.
    #[must_use]
    pub fn new(model: DistanceModel, default_reference_power: i32) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            model,
            default_reference_power,
        }
    }

    /// Create an empty registry from estimation settings.
    #[must_use]
    pub fn from_config(config: &EstimationConfig) -> Self {
        Self::new(config.model, config.default_reference_power)
    }

    /// Default distance model for [`upsert`](Self::upsert).
    #[must_use]
    pub const fn model(&self) -> DistanceModel {
        self.model
    }

    /// Reference power assumed when an observation carries none.
    #[must_use]
    pub const fn default_reference_power(&self) -> i32 {
        self.default_reference_power
    }

    /// Insert or replace the entry for the observation's device, estimating
    /// with the registry's default model.
    pub fn upsert(&self, observation: Observation) -> UpsertOutcome {
        self.upsert_with_model(observation, self.model)
    }

    /// Insert or replace the entry for the observation's device, estimating
    /// with `model`.
    pub fn upsert_with_model(&self, observation: Observation, model: DistanceModel) -> UpsertOutcome {
        let entry = RegistryEntry::new(observation, model, self.default_reference_power);
        let device_id = entry.device_id().to_string();

        let mut inner = self.write();
        let replaced = inner.take(&device_id).is_some();

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.order.insert(seq, device_id.clone());
        inner.entries.insert(device_id.clone(), Slot { seq, entry });
        drop(inner);

        if replaced {
            debug!(device_id = %device_id, "Replaced device entry");
            UpsertOutcome::Replaced
        } else {
            debug!(device_id = %device_id, "Added device entry");
            UpsertOutcome::Inserted
        }
    }

    /// Remove the entry for `device_id`.
    ///
    /// Returns `true` if an entry existed. Removing an unknown id is a no-op.
    pub fn remove(&self, device_id: &str) -> bool {
        let removed = self.write().take(device_id).is_some();
        if removed {
            debug!(device_id = %device_id, "Removed device entry");
        }
        removed
    }

    /// Remove every entry whose age at `now_ms` is at least `max_age_ms`.
    ///
    /// Afterwards every remaining entry satisfies
    /// `now_ms - observed_at_ms < max_age_ms`. Returns how many entries were
    /// evicted; repeated calls with the same arguments evict nothing further.
    pub fn evict_stale(&self, now_ms: i64, max_age_ms: i64) -> usize {
        let mut inner = self.write();

        let stale: Vec<(u64, String)> = inner
            .entries
            .iter()
            .filter(|(_, slot)| {
                now_ms.saturating_sub(slot.entry.observation().observed_at_ms()) >= max_age_ms
            })
            .map(|(id, slot)| (slot.seq, id.clone()))
            .collect();

        for (seq, device_id) in &stale {
            inner.order.remove(seq);
            inner.entries.remove(device_id);
            debug!(device_id = %device_id, "Evicted stale device entry");
        }
        let remaining = inner.entries.len();
        drop(inner);

        if !stale.is_empty() {
            info!(
                evicted = stale.len(),
                remaining,
                max_age_ms,
                "Removed stale device(s) from registry"
            );
        }
        stale.len()
    }

    /// [`evict_stale`](Self::evict_stale) with the default 60 second window.
    pub fn evict_stale_default(&self, now_ms: i64) -> usize {
        self.evict_stale(now_ms, DEFAULT_MAX_AGE_MS)
    }

    /// Point-in-time copy of all entries, least recently updated first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<RegistryEntry> {
        let inner = self.read();
        inner
            .order
            .values()
            .filter_map(|device_id| inner.entries.get(device_id))
            .map(|slot| slot.entry.clone())
            .collect()
    }

    /// Current entry for `device_id`, if any.
    #[must_use]
    pub fn get(&self, device_id: &str) -> Option<RegistryEntry> {
        self.read()
            .entries
            .get(device_id)
            .map(|slot| slot.entry.clone())
    }

    /// Number of tracked devices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    /// Whether no devices are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().entries.is_empty()
    }

    /// Drop every entry. Returns how many were removed.
    pub fn clear(&self) -> usize {
        let mut inner = self.write();
        let count = inner.entries.len();
        inner.entries.clear();
        inner.order.clear();
        drop(inner);

        if count > 0 {
            info!(cleared = count, "Cleared device registry");
        }
        count
    }

    // Lock poisoning is ignored; `Inner` stays consistent across panics.
    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::DeviceClass;
    use proptest::prelude::*;

    fn obs(id: &str, rssi: i32, at: i64) -> Observation {
        Observation::new(id, None, rssi, Some(-59), DeviceClass::ShortRangeAdvertising, at).unwrap()
    }

    #[test]
    fn test_upsert_new_device_grows_by_one() {
        let registry = ObservationRegistry::default();
        assert!(registry.is_empty());

        assert_eq!(registry.upsert(obs("A", -65, 0)), UpsertOutcome::Inserted);
        assert_eq!(registry.len(), 1);

        assert_eq!(registry.upsert(obs("B", -70, 0)), UpsertOutcome::Inserted);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_upsert_existing_device_replaces_all_fields() {
        let registry = ObservationRegistry::default();
        registry.upsert(obs("A", -65, 0));

        let newer = Observation::new(
            "A",
            Some("Speaker".into()),
            -80,
            Some(-62),
            DeviceClass::Beacon,
            1_000,
        )
        .unwrap();
        assert_eq!(registry.upsert(newer.clone()), UpsertOutcome::Replaced);
        assert_eq!(registry.len(), 1);

        let entry = registry.get("A").unwrap();
        assert_eq!(entry.observation(), &newer);
        assert_eq!(
            entry.estimated_distance(),
            DistanceModel::RatioPower.estimate(-80, -62)
        );
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let registry = ObservationRegistry::default();
        assert!(!registry.remove("missing"));

        registry.upsert(obs("A", -65, 0));
        assert!(registry.remove("A"));
        assert!(!registry.remove("A"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_reinsert_after_remove_is_fresh() {
        let registry = ObservationRegistry::default();
        registry.upsert(obs("A", -65, 0));
        registry.remove("A");
        assert_eq!(registry.upsert(obs("A", -70, 5)), UpsertOutcome::Inserted);
        assert_eq!(registry.get("A").unwrap().observation().signal_strength(), -70);
    }

    #[test]
    fn test_evict_stale_boundaries() {
        let registry = ObservationRegistry::default();
        registry.upsert(obs("C", -65, 0));

        assert_eq!(registry.evict_stale(59_000, 60_000), 0);
        assert!(registry.get("C").is_some());

        assert_eq!(registry.evict_stale(60_000, 60_000), 1);
        assert!(registry.get("C").is_none());
    }

    #[test]
    fn test_evict_stale_is_idempotent() {
        let registry = ObservationRegistry::default();
        registry.upsert(obs("old", -65, 0));
        registry.upsert(obs("new", -65, 50_000));

        assert_eq!(registry.evict_stale_default(61_000), 1);
        assert_eq!(registry.evict_stale_default(61_000), 0);
        assert_eq!(registry.len(), 1);
        assert!(registry.get("new").is_some());
    }

    #[test]
    fn test_future_observation_is_kept() {
        let registry = ObservationRegistry::default();
        registry.upsert(obs("A", -65, 100_000));
        assert_eq!(registry.evict_stale_default(0), 0);
    }

    #[test]
    fn test_snapshot_orders_by_last_update() {
        let registry = ObservationRegistry::default();
        registry.upsert(obs("A", -65, 0));
        registry.upsert(obs("B", -65, 0));
        registry.upsert(obs("C", -65, 0));
        registry.upsert(obs("A", -60, 1));

        let ids: Vec<String> = registry
            .snapshot()
            .iter()
            .map(|e| e.device_id().to_string())
            .collect();
        assert_eq!(ids, vec!["B", "C", "A"]);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let registry = ObservationRegistry::default();
        registry.upsert(obs("A", -65, 0));

        let snapshot = registry.snapshot();
        registry.upsert(obs("B", -65, 0));
        registry.remove("A");

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].device_id(), "A");
    }

    #[test]
    fn test_upsert_with_model_overrides_default() {
        let registry = ObservationRegistry::new(DistanceModel::RatioPower, -59);
        registry.upsert_with_model(obs("A", -79, 0), DistanceModel::LogDistance);

        let entry = registry.get("A").unwrap();
        assert_eq!(entry.model(), DistanceModel::LogDistance);
        assert!((entry.estimated_distance().unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_clear() {
        let registry = ObservationRegistry::default();
        registry.upsert(obs("A", -65, 0));
        registry.upsert(obs("B", -65, 0));
        assert_eq!(registry.clear(), 2);
        assert!(registry.snapshot().is_empty());
    }

    proptest! {
        #[test]
        fn prop_evict_leaves_only_fresh_entries(
            timestamps in proptest::collection::vec(0i64..200_000, 0..40),
            now in 0i64..250_000,
            max_age in 1i64..120_000,
        ) {
            let registry = ObservationRegistry::default();
            for (i, at) in timestamps.iter().enumerate() {
                registry.upsert(obs(&format!("dev-{i}"), -70, *at));
            }

            let expected_stale = timestamps.iter().filter(|at| now - **at >= max_age).count();
            let evicted = registry.evict_stale(now, max_age);
            prop_assert_eq!(evicted, expected_stale);

            for entry in registry.snapshot() {
                prop_assert!(now - entry.observation().observed_at_ms() < max_age);
            }
            prop_assert_eq!(registry.len(), timestamps.len() - expected_stale);
        }
    }
}
