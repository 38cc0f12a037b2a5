//! RSSI-to-distance estimation.
//!
//! Two numeric models are supported and selected per call:
//!
//! - [`DistanceModel::RatioPower`]: an empirical curve fit over the ratio
//!   `rssi / reference_power`. Only meaningful when both values are negative
//!   dBm of comparable magnitude.
//! - [`DistanceModel::LogDistance`]: the log-distance path-loss formula with a
//!   free-space exponent of `2.0`.
//!
//! A signal strength of `0` dBm is the "unreadable" sentinel and never yields
//! an estimate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Assumed calibrated signal strength at 1 meter when the source advertises none.
pub const DEFAULT_REFERENCE_POWER: i32 = -59;

/// Path-loss exponent used by [`DistanceModel::LogDistance`] (free space).
pub const PATH_LOSS_EXPONENT: f64 = 2.0;

/// Reserved RSSI value meaning the measurement could not be read.
pub const INVALID_SIGNAL_STRENGTH: i32 = 0;

const RATIO_COEFFICIENT: f64 = 0.899_76;
const RATIO_EXPONENT: f64 = 7.7095;
const RATIO_OFFSET: f64 = 0.111;

/// Numeric model used to turn a signal strength into meters.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum DistanceModel {
    /// Piecewise power curve over `rssi / reference_power`.
    #[default]
    RatioPower,
    /// `10 ^ ((reference_power - rssi) / (10 * n))` with `n = 2.0`.
    LogDistance,
}

impl DistanceModel {
    /// All supported models.
    pub const ALL: [Self; 2] = [Self::RatioPower, Self::LogDistance];

    /// Stable identifier used in configuration and over the API.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RatioPower => "ratio_power",
            Self::LogDistance => "log_distance",
        }
    }

    /// Estimate the distance in meters.
    ///
    /// Returns `None` when the signal strength is the invalid sentinel or when
    /// the model produces a non-finite value (for instance a zero reference
    /// power under [`DistanceModel::RatioPower`]).
    #[must_use]
    pub fn estimate(self, signal_strength: i32, reference_power: i32) -> Option<f64> {
        if signal_strength == INVALID_SIGNAL_STRENGTH {
            return None;
        }

        let distance = match self {
            Self::RatioPower => ratio_power(signal_strength, reference_power),
            Self::LogDistance => log_distance(signal_strength, reference_power),
        };

        distance.is_finite().then_some(distance)
    }
}

impl fmt::Display for DistanceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown model name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown distance model '{0}'. Expected 'ratio_power' or 'log_distance'.")]
pub struct UnknownModelError(pub String);

impl FromStr for DistanceModel {
    type Err = UnknownModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "ratio_power" | "ratio" => Ok(Self::RatioPower),
            "log_distance" | "path_loss" => Ok(Self::LogDistance),
            _ => Err(UnknownModelError(s.to_string())),
        }
    }
}

/// Estimate a distance, falling back to [`DEFAULT_REFERENCE_POWER`] when the
/// source advertised no reference power.
#[must_use]
pub fn estimate_distance(
    model: DistanceModel,
    signal_strength: i32,
    reference_power: Option<i32>,
) -> Option<f64> {
    model.estimate(
        signal_strength,
        reference_power.unwrap_or(DEFAULT_REFERENCE_POWER),
    )
}

/// Render a distance for display, e.g. `"1.50 m"`.
#[must_use]
pub fn format_distance(distance: Option<f64>) -> String {
    distance.map_or_else(|| "unknown".to_string(), |d| format!("{d:.2} m"))
}

// Kept as a separate multiply and add so results match the fitted curve exactly.
#[allow(clippy::suboptimal_flops)]
fn ratio_power(signal_strength: i32, reference_power: i32) -> f64 {
    let ratio = f64::from(signal_strength) / f64::from(reference_power);
    if ratio < 1.0 {
        ratio.powf(10.0)
    } else {
        RATIO_COEFFICIENT * ratio.powf(RATIO_EXPONENT) + RATIO_OFFSET
    }
}

fn log_distance(signal_strength: i32, reference_power: i32) -> f64 {
    let exponent =
        (f64::from(reference_power) - f64::from(signal_strength)) / (10.0 * PATH_LOSS_EXPONENT);
    10f64.powf(exponent)
}
