//! Raw device observations produced by scanning collaborators.
//!
//! An [`Observation`] is an immutable record of one sighting of a device. It is
//! built either directly or from a deserialized [`ScanReport`] and is consumed
//! immediately by the [`ObservationRegistry`](crate::registry::ObservationRegistry).

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::distance::{DistanceModel, INVALID_SIGNAL_STRENGTH};

/// Errors raised while building an observation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObservationError {
    /// The device identifier was empty or whitespace.
    #[error("Device id cannot be empty")]
    EmptyDeviceId,
}

/// Result type for observation construction.
pub type ObservationResult<T> = std::result::Result<T, ObservationError>;

/// Technology that produced an observation.
///
/// Only affects display and whether a reference power is trusted; the
/// estimation math is the same for every class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    /// Bluetooth Low Energy advertisement.
    #[serde(alias = "ble")]
    ShortRangeAdvertising,
    /// Proximity beacon (iBeacon, Eddystone, Nearby message).
    Beacon,
    /// Classic Bluetooth inquiry result.
    #[serde(alias = "classic")]
    ClassicPairing,
}

impl DeviceClass {
    /// Display name used when the source reports none.
    #[must_use]
    pub const fn placeholder_name(self) -> &'static str {
        match self {
            Self::ShortRangeAdvertising => "Unknown BLE Device",
            Self::Beacon => "Beacon",
            Self::ClassicPairing => "Unknown Classic Device",
        }
    }

    /// Whether a reference power reported for this class is used.
    ///
    /// Classic inquiry results carry no calibrated transmit power.
    #[must_use]
    pub const fn advertises_reference_power(self) -> bool {
        !matches!(self, Self::ClassicPairing)
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch.
#[must_use]
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// A single sighting of a remote device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Observation {
    device_id: String,
    display_name: String,
    signal_strength: i32,
    reference_power: Option<i32>,
    device_class: DeviceClass,
    observed_at_ms: i64,
}

impl Observation {
    /// Build an observation.
    ///
    /// A missing or blank `display_name` is replaced by the class placeholder.
    /// The reference power is dropped for [`DeviceClass::ClassicPairing`].
    ///
    /// # Errors
    ///
    /// Returns [`ObservationError::EmptyDeviceId`] if `device_id` is blank.
    pub fn new(
        device_id: impl Into<String>,
        display_name: Option<String>,
        signal_strength: i32,
        reference_power: Option<i32>,
        device_class: DeviceClass,
        observed_at_ms: i64,
    ) -> ObservationResult<Self> {
        let device_id = device_id.into();
        if device_id.trim().is_empty() {
            return Err(ObservationError::EmptyDeviceId);
        }

        let display_name = display_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| device_class.placeholder_name().to_string());

        let reference_power = reference_power.filter(|_| device_class.advertises_reference_power());

        Ok(Self {
            device_id,
            display_name,
            signal_strength,
            reference_power,
            device_class,
            observed_at_ms,
        })
    }

    /// Build an observation stamped with the current wall-clock time.
    ///
    /// # Errors
    ///
    /// Returns [`ObservationError::EmptyDeviceId`] if `device_id` is blank.
    pub fn now(
        device_id: impl Into<String>,
        display_name: Option<String>,
        signal_strength: i32,
        reference_power: Option<i32>,
        device_class: DeviceClass,
    ) -> ObservationResult<Self> {
        Self::new(
            device_id,
            display_name,
            signal_strength,
            reference_power,
            device_class,
            now_millis(),
        )
    }

    /// Registry key.
    #[must_use]
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Human-readable label.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Received signal strength in dBm.
    #[must_use]
    pub const fn signal_strength(&self) -> i32 {
        self.signal_strength
    }

    /// Calibrated signal strength at 1 meter, if advertised.
    #[must_use]
    pub const fn reference_power(&self) -> Option<i32> {
        self.reference_power
    }

    /// Technology that produced this observation.
    #[must_use]
    pub const fn device_class(&self) -> DeviceClass {
        self.device_class
    }

    /// When this observation was made, in Unix milliseconds.
    #[must_use]
    pub const fn observed_at_ms(&self) -> i64 {
        self.observed_at_ms
    }

    /// Whether the signal strength is the unreadable sentinel.
    #[must_use]
    pub const fn has_valid_signal(&self) -> bool {
        self.signal_strength != INVALID_SIGNAL_STRENGTH
    }

    /// Milliseconds elapsed since the observation, clamped at zero.
    #[must_use]
    pub const fn age_ms(&self, now_ms: i64) -> i64 {
        let age = now_ms.saturating_sub(self.observed_at_ms);
        if age < 0 {
            0
        } else {
            age
        }
    }

    /// Estimate the distance to the device.
    ///
    /// Classic inquiry results never get an estimate. Otherwise a missing
    /// reference power falls back to `default_reference_power`.
    #[must_use]
    pub fn estimate_distance(
        &self,
        model: DistanceModel,
        default_reference_power: i32,
    ) -> Option<f64> {
        if !self.device_class.advertises_reference_power() {
            return None;
        }
        model.estimate(
            self.signal_strength,
            self.reference_power.unwrap_or(default_reference_power),
        )
    }
}

/// Ingestion record as delivered by a scanning collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "device_id": "AA:BB:CC:DD:EE:FF",
    "name": "Pixel Buds",
    "signal_strength": -65,
    "reference_power": -59,
    "device_class": "short_range_advertising"
}))]
pub struct ScanReport {
    /// Stable identifier (hardware address or content-derived id).
    #[schema(example = "AA:BB:CC:DD:EE:FF")]
    pub device_id: String,

    /// Advertised name, if any.
    #[serde(default)]
    #[schema(example = "Pixel Buds")]
    pub name: Option<String>,

    /// Received signal strength in dBm. `0` means unreadable.
    #[schema(example = -65)]
    pub signal_strength: i32,

    /// Calibrated signal strength at 1 meter, if advertised.
    #[serde(default)]
    #[schema(example = -59)]
    pub reference_power: Option<i32>,

    /// Technology that produced the sighting.
    pub device_class: DeviceClass,

    /// Sighting time in Unix milliseconds. Stamped on arrival when absent.
    #[serde(default)]
    pub observed_at_ms: Option<i64>,

    /// Distance model override for this report.
    #[serde(default)]
    pub model: Option<DistanceModel>,
}

impl ScanReport {
    /// Convert into an [`Observation`], stamping `now_ms` when the report
    /// carries no timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`ObservationError::EmptyDeviceId`] if the device id is blank.
    pub fn into_observation(self, now_ms: i64) -> ObservationResult<Observation> {
        Observation::new(
            self.device_id,
            self.name,
            self.signal_strength,
            self.reference_power,
            self.device_class,
            self.observed_at_ms.unwrap_or(now_ms),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ble(id: &str, rssi: i32) -> Observation {
        Observation::new(id, None, rssi, Some(-59), DeviceClass::ShortRangeAdvertising, 0).unwrap()
    }

    #[test]
    fn test_empty_device_id_rejected() {
        let err = Observation::new("", None, -60, None, DeviceClass::Beacon, 0).unwrap_err();
        assert_eq!(err, ObservationError::EmptyDeviceId);

        let err = Observation::new("   ", None, -60, None, DeviceClass::Beacon, 0).unwrap_err();
        assert_eq!(err, ObservationError::EmptyDeviceId);
    }

    #[test]
    fn test_placeholder_names() {
        assert_eq!(ble("a", -60).display_name(), "Unknown BLE Device");

        let beacon = Observation::new("b", Some(String::new()), -60, None, DeviceClass::Beacon, 0)
            .unwrap();
        assert_eq!(beacon.display_name(), "Beacon");

        let classic =
            Observation::new("c", None, -60, None, DeviceClass::ClassicPairing, 0).unwrap();
        assert_eq!(classic.display_name(), "Unknown Classic Device");
    }

    #[test]
    fn test_reported_name_is_kept() {
        let obs = Observation::new(
            "a",
            Some("Headphones".into()),
            -60,
            None,
            DeviceClass::ShortRangeAdvertising,
            0,
        )
        .unwrap();
        assert_eq!(obs.display_name(), "Headphones");
    }

    #[test]
    fn test_classic_drops_reference_power_and_estimate() {
        let obs =
            Observation::new("c", None, -60, Some(-59), DeviceClass::ClassicPairing, 0).unwrap();
        assert_eq!(obs.reference_power(), None);
        for model in DistanceModel::ALL {
            assert_eq!(obs.estimate_distance(model, -59), None);
        }
    }

    #[test]
    fn test_zero_signal_has_no_estimate() {
        let obs = ble("z", 0);
        assert!(!obs.has_valid_signal());
        assert_eq!(obs.estimate_distance(DistanceModel::RatioPower, -59), None);
    }

    #[test]
    fn test_estimate_uses_default_reference_when_absent() {
        let obs =
            Observation::new("a", None, -79, None, DeviceClass::ShortRangeAdvertising, 0).unwrap();
        let distance = obs.estimate_distance(DistanceModel::LogDistance, -59).unwrap();
        assert!((distance - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_age_is_clamped() {
        let obs = Observation::new("a", None, -60, None, DeviceClass::Beacon, 1_000).unwrap();
        assert_eq!(obs.age_ms(61_000), 60_000);
        assert_eq!(obs.age_ms(500), 0);
    }

    #[test]
    fn test_scan_report_deserialization_defaults() {
        let report: ScanReport = serde_json::from_str(
            r#"{"device_id":"AA:BB","signal_strength":-70,"device_class":"ble"}"#,
        )
        .unwrap();
        assert_eq!(report.device_class, DeviceClass::ShortRangeAdvertising);
        assert_eq!(report.name, None);
        assert_eq!(report.model, None);

        let obs = report.into_observation(42).unwrap();
        assert_eq!(obs.observed_at_ms(), 42);
        assert_eq!(obs.display_name(), "Unknown BLE Device");
    }

    #[test]
    fn test_scan_report_keeps_explicit_timestamp() {
        let report = ScanReport {
            device_id: "beacon-1".into(),
            name: None,
            signal_strength: -70,
            reference_power: Some(-62),
            device_class: DeviceClass::Beacon,
            observed_at_ms: Some(7),
            model: Some(DistanceModel::LogDistance),
        };
        let obs = report.into_observation(1_000).unwrap();
        assert_eq!(obs.observed_at_ms(), 7);
        assert_eq!(obs.reference_power(), Some(-62));
    }
}
