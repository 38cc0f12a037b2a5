//! # ranger-core
//!
//! Core logic for tracking nearby wireless devices from raw scan sightings.
//!
//! This crate provides:
//! - RSSI-to-distance estimation with two selectable models
//! - A thread-safe registry holding the latest sighting per device, with
//!   age-based eviction
//! - Scan session lifecycle tracking
//! - Configuration loading, saving, and validation
//!
//! Radio access is out of scope: scanning collaborators hand in
//! [`ScanReport`]s or [`Observation`]s and consumers read snapshots.
//!
//! ## Architecture
//!
//! - [`distance`] - Ratio-power and log-distance path-loss estimators
//! - [`observation`] - Sightings, device classes, and the ingestion record
//! - [`registry`] - Latest-observation-per-device store with eviction
//! - [`session`] - Scan start/stop/auto-stop state
//! - [`config`] - Layered configuration (defaults, TOML file, environment)
//! - [`error`] - Unified error types for the crate
//! - [`types`] - Shared snapshot output schema
//!
//! ## Example
//!
//! ```rust
//! use ranger_core::{DeviceClass, DeviceReport, Observation, ObservationRegistry};
//!
//! let registry = ObservationRegistry::default();
//! let sighting = Observation::new(
//!     "AA:BB:CC:DD:EE:FF",
//!     None,
//!     -65,
//!     Some(-59),
//!     DeviceClass::ShortRangeAdvertising,
//!     0,
//! )?;
//! registry.upsert(sighting);
//!
//! let rows: Vec<DeviceReport> = registry.snapshot().iter().map(DeviceReport::from).collect();
//! assert_eq!(rows.len(), 1);
//!
//! registry.evict_stale(61_000, 60_000);
//! assert!(registry.is_empty());
//! # Ok::<(), ranger_core::RangerError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(missing_docs)]

pub mod config;
pub mod distance;
pub mod error;
pub mod observation;
pub mod registry;
pub mod session;
pub mod types;

// Re-export primary types for convenience
pub use config::{
    default_config_path, Config, ConfigError, ConfigResult, EstimationConfig, RegistryConfig,
    ScanConfig, ServerConfig,
};
pub use distance::{
    estimate_distance, format_distance, DistanceModel, UnknownModelError,
    DEFAULT_REFERENCE_POWER, PATH_LOSS_EXPONENT,
};
pub use error::{RangerError, Result};
pub use observation::{now_millis, DeviceClass, Observation, ObservationError, ScanReport};
pub use registry::{ObservationRegistry, RegistryEntry, UpsertOutcome, DEFAULT_MAX_AGE_MS};
pub use session::{ScanSession, ScanState, ScanStatus};
pub use types::DeviceReport;
