//! Unified error types for the ranger core library.
//!
//! [`RangerError`] covers every failure mode the library can report. Modules
//! keep their own specific error types ([`ObservationError`], [`ConfigError`])
//! and convert into this one at the boundary.
//!
//! Note what is *not* an error: an unreadable signal strength yields an
//! unknown distance, and removing a device that is not tracked is a no-op.
//!
//! # Example
//!
//! ```rust
//! use ranger_core::error::{RangerError, Result};
//! use ranger_core::{DeviceClass, Observation};
//!
//! fn ingest(id: &str) -> Result<Observation> {
//!     Ok(Observation::new(id, None, -60, None, DeviceClass::Beacon, 0)?)
//! }
//!
//! assert!(matches!(ingest(""), Err(RangerError::EmptyDeviceId)));
//! ```

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;
use crate::observation::ObservationError;

/// The unified error type for all ranger operations.
#[derive(Debug, Error)]
pub enum RangerError {
    // =========================================================================
    // OBSERVATION ERRORS
    // =========================================================================
    /// An observation arrived without a device identifier.
    #[error("Device id cannot be empty. Every observation needs a stable identifier.")]
    EmptyDeviceId,

    // =========================================================================
    // CONFIGURATION ERRORS
    // =========================================================================
    /// The configuration file was not found at the expected path.
    #[error("Configuration file not found at: {}", .0.display())]
    ConfigNotFound(PathBuf),

    /// The configuration exists but could not be parsed.
    #[error("Failed to parse configuration: {0}")]
    ConfigParseError(String),

    /// The configuration was parsed but contains invalid values.
    #[error("Configuration validation failed: {0}")]
    ConfigValidationError(String),

    // =========================================================================
    // I/O ERRORS
    // =========================================================================
    /// A low-level I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// A specialized [`Result`] type for ranger operations.
pub type Result<T> = std::result::Result<T, RangerError>;

impl RangerError {
    /// Returns `true` if this error was raised while building an observation.
    #[inline]
    #[must_use]
    pub const fn is_observation_error(&self) -> bool {
        matches!(self, Self::EmptyDeviceId)
    }

    /// Returns `true` if this error is related to configuration.
    #[inline]
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigNotFound(_) | Self::ConfigParseError(_) | Self::ConfigValidationError(_)
        )
    }

    /// Returns `true` if this error is related to I/O.
    #[inline]
    #[must_use]
    pub const fn is_io_error(&self) -> bool {
        matches!(self, Self::IoError(_))
    }

    /// Returns an HTTP-appropriate status code for this error.
    #[inline]
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - malformed input
            Self::EmptyDeviceId => 400,

            // 404 Not Found
            Self::ConfigNotFound(_) => 404,

            // 422 Unprocessable Entity - semantic errors
            Self::ConfigParseError(_) | Self::ConfigValidationError(_) => 422,

            // 500 Internal Server Error
            Self::IoError(_) => 500,
        }
    }

    /// Returns a machine-readable error code for API responses.
    #[inline]
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyDeviceId => "EMPTY_DEVICE_ID",
            Self::ConfigNotFound(_) => "CONFIG_NOT_FOUND",
            Self::ConfigParseError(_) => "CONFIG_PARSE_ERROR",
            Self::ConfigValidationError(_) => "CONFIG_VALIDATION_ERROR",
            Self::IoError(_) => "IO_ERROR",
        }
    }
}

// =============================================================================
// CONVERSIONS FROM MODULE-SPECIFIC ERRORS
// =============================================================================

impl From<ObservationError> for RangerError {
    fn from(err: ObservationError) -> Self {
        match err {
            ObservationError::EmptyDeviceId => Self::EmptyDeviceId,
        }
    }
}

impl From<ConfigError> for RangerError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NotFound(path) => Self::ConfigNotFound(path.into()),
            ConfigError::WriteError { path, source } => Self::IoError(std::io::Error::new(
                source.kind(),
                format!("Failed to write {path}: {source}"),
            )),
            ConfigError::ParseError(e) => Self::ConfigParseError(e.to_string()),
            ConfigError::SerializeError(e) => Self::ConfigParseError(e.to_string()),
            ConfigError::ValidationError { field, message } => {
                Self::ConfigValidationError(format!("{field}: {message}"))
            }
            ConfigError::MultipleValidationErrors(errors) => {
                let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
                Self::ConfigValidationError(messages.join("; "))
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
