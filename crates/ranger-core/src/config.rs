//! Application configuration management.
//!
//! Settings are layered in this order, later layers winning:
//! - Built-in defaults
//! - A TOML file (optional unless loaded with [`Config::load`])
//! - Environment variables prefixed with `RANGER__`, sections separated by
//!   `__` (e.g. `RANGER__REGISTRY__MAX_AGE_MS=30000`)
//!
//! ```toml
//! [estimation]
//! model = "ratio_power"
//! default_reference_power = -59
//!
//! [registry]
//! max_age_ms = 60000
//! sweep_interval_ms = 5000
//!
//! [scan]
//! period_ms = 10000
//! clear_on_start = false
//!
//! [server]
//! bind_address = "0.0.0.0:3000"
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::distance::{DistanceModel, DEFAULT_REFERENCE_POWER};
use crate::registry::DEFAULT_MAX_AGE_MS;

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "RANGER";

const ENV_SEPARATOR: &str = "__";

/// Errors raised while loading, saving or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file does not exist.
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    /// The configuration file could not be written.
    #[error("Failed to write configuration to {path}: {source}")]
    WriteError {
        /// Target path.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A configuration source could not be read or deserialized.
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] config::ConfigError),

    /// The configuration could not be serialized to TOML.
    #[error("Failed to serialize configuration: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// A single field holds an invalid value.
    #[error("Invalid value for '{field}': {message}")]
    ValidationError {
        /// Dotted field path, e.g. `registry.max_age_ms`.
        field: String,
        /// What is wrong with it.
        message: String,
    },

    /// Several fields hold invalid values.
    #[error("Configuration has {} validation errors", .0.len())]
    MultipleValidationErrors(Vec<ConfigError>),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Distance estimation settings.
    pub estimation: EstimationConfig,
    /// Registry aging settings.
    pub registry: RegistryConfig,
    /// Scan session settings.
    pub scan: ScanConfig,
    /// HTTP server settings.
    pub server: ServerConfig,
}

/// Distance estimation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimationConfig {
    /// Model applied when an ingestion does not choose one.
    pub model: DistanceModel,
    /// Reference power (dBm at 1 m) assumed when a source advertises none.
    pub default_reference_power: i32,
}

impl Default for EstimationConfig {
    fn default() -> Self {
        Self {
            model: DistanceModel::default(),
            default_reference_power: DEFAULT_REFERENCE_POWER,
        }
    }
}

/// Registry aging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Entries at least this old are evicted by a sweep.
    pub max_age_ms: i64,
    /// How often the owner runs the sweep.
    pub sweep_interval_ms: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_age_ms: DEFAULT_MAX_AGE_MS,
            sweep_interval_ms: 5_000,
        }
    }
}

impl RegistryConfig {
    /// Sweep cadence as a [`Duration`].
    #[must_use]
    pub const fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }
}

/// Scan session settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Auto-stop period for a scan session, `0` to scan until stopped.
    pub period_ms: u64,
    /// Drop previous results when a new session starts.
    pub clear_on_start: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            period_ms: 10_000,
            clear_on_start: false,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on.
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, which must exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if the file is missing, a parse error
    /// if it is malformed, or a validation error if values are out of range.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        Self::build(path, true)
    }

    /// Load configuration from `path`, using defaults when the file is missing.
    ///
    /// # Errors
    ///
    /// Returns a parse error if the file is malformed, or a validation error if
    /// values are out of range.
    pub fn load_or_default(path: impl AsRef<Path>) -> ConfigResult<Self> {
        Self::build(path.as_ref(), false)
    }

    fn build(path: &Path, required: bool) -> ConfigResult<Self> {
        let settings = config::Config::builder()
            .add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(required),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Write configuration to `path` as TOML, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = path.as_ref();
        let write_error = |source| ConfigError::WriteError {
            path: path.display().to_string(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(write_error)?;
        Ok(())
    }

    /// Check every field, collecting all violations.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] for a single violation or
    /// [`ConfigError::MultipleValidationErrors`] for several.
    pub fn validate(&self) -> ConfigResult<()> {
        let mut errors = Vec::new();

        if !(-127..=-1).contains(&self.estimation.default_reference_power) {
            errors.push(invalid(
                "estimation.default_reference_power",
                "must be between -127 and -1 dBm",
            ));
        }
        if self.registry.max_age_ms <= 0 {
            errors.push(invalid("registry.max_age_ms", "must be greater than 0"));
        }
        if self.registry.sweep_interval_ms == 0 {
            errors.push(invalid("registry.sweep_interval_ms", "must be greater than 0"));
        }
        if self.server.bind_address.parse::<SocketAddr>().is_err() {
            errors.push(invalid(
                "server.bind_address",
                "must be a socket address such as 0.0.0.0:3000",
            ));
        }

        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(ConfigError::MultipleValidationErrors(errors)),
        }
    }

    /// Bind address parsed as a [`SocketAddr`].
    ///
    /// # Errors
    ///
    /// Returns a validation error if the address is malformed.
    pub fn bind_address(&self) -> ConfigResult<SocketAddr> {
        self.server.bind_address.parse().map_err(|_| {
            invalid(
                "server.bind_address",
                "must be a socket address such as 0.0.0.0:3000",
            )
        })
    }
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_string(),
        message: message.to_string(),
    }
}

/// Default configuration file location.
///
/// On Linux: `/etc/ranger/config.toml`.
/// Elsewhere: the platform config directory, e.g. `~/Library/Application Support/ranger/`.
#[must_use]
pub fn default_config_path() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        PathBuf::from("/etc/ranger/config.toml")
    }
    #[cfg(not(target_os = "linux"))]
    {
        directories::ProjectDirs::from("", "", "ranger").map_or_else(
            || PathBuf::from("config.toml"),
            |dirs| dirs.config_dir().join("config.toml"),
        )
    }
}
