//! Shared types and OpenAPI schemas.
//!
//! [`DeviceReport`] is the flat, display-ready form of a registry entry handed
//! to consumers of a snapshot.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::distance::{format_distance, DistanceModel};
use crate::observation::DeviceClass;
use crate::registry::RegistryEntry;

/// One row of a registry snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "device_id": "AA:BB:CC:DD:EE:FF",
    "display_name": "Unknown BLE Device",
    "signal_strength": -65,
    "estimated_distance": 1.87,
    "distance_text": "1.87 m",
    "reference_power": -59,
    "device_class": "short_range_advertising",
    "model": "ratio_power",
    "observed_at_ms": 1736911800000_i64
}))]
pub struct DeviceReport {
    /// Stable device identifier.
    #[schema(example = "AA:BB:CC:DD:EE:FF")]
    pub device_id: String,

    /// Human-readable label.
    #[schema(example = "Unknown BLE Device")]
    pub display_name: String,

    /// Received signal strength in dBm.
    #[schema(example = -65)]
    pub signal_strength: i32,

    /// Estimated distance in meters, absent when unknown.
    #[schema(nullable, example = 1.87)]
    pub estimated_distance: Option<f64>,

    /// Estimated distance formatted for display.
    #[schema(example = "1.87 m")]
    pub distance_text: String,

    /// Calibrated signal strength at 1 meter, if advertised.
    #[schema(nullable, example = -59)]
    pub reference_power: Option<i32>,

    /// Technology that produced the sighting.
    pub device_class: DeviceClass,

    /// Model the distance was estimated with.
    pub model: DistanceModel,

    /// Sighting time in Unix milliseconds.
    pub observed_at_ms: i64,
}

impl From<&RegistryEntry> for DeviceReport {
    fn from(entry: &RegistryEntry) -> Self {
        let observation = entry.observation();
        Self {
            device_id: observation.device_id().to_string(),
            display_name: observation.display_name().to_string(),
            signal_strength: observation.signal_strength(),
            estimated_distance: entry.estimated_distance(),
            distance_text: format_distance(entry.estimated_distance()),
            reference_power: observation.reference_power(),
            device_class: observation.device_class(),
            model: entry.model(),
            observed_at_ms: observation.observed_at_ms(),
        }
    }
}

impl From<RegistryEntry> for DeviceReport {
    fn from(entry: RegistryEntry) -> Self {
        Self::from(&entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::Observation;

    #[test]
    fn test_report_from_entry() {
        let observation = Observation::new(
            "B",
            None,
            0,
            Some(-59),
            DeviceClass::ShortRangeAdvertising,
            1_000,
        )
        .unwrap();
        let entry = RegistryEntry::new(observation, DistanceModel::RatioPower, -59);

        let report = DeviceReport::from(&entry);
        assert_eq!(report.device_id, "B");
        assert_eq!(report.estimated_distance, None);
        assert_eq!(report.distance_text, "unknown");
        assert_eq!(report.reference_power, Some(-59));
        assert_eq!(report.observed_at_ms, 1_000);
    }

    #[test]
    fn test_unknown_distance_serializes_as_null() {
        let observation =
            Observation::new("C", None, -70, None, DeviceClass::ClassicPairing, 0).unwrap();
        let report = DeviceReport::from(RegistryEntry::new(
            observation,
            DistanceModel::LogDistance,
            -59,
        ));

        let json = serde_json::to_value(&report).unwrap();
        assert!(json["estimated_distance"].is_null());
        assert!(json["reference_power"].is_null());
        assert_eq!(json["device_class"], "classic_pairing");
    }
}
