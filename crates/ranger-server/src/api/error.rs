//! API error types and response handling.
//!
//! This module provides a unified error type for all API handlers
//! with automatic conversion to appropriate HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Result type alias for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type.
///
/// Each variant maps to a specific HTTP status code and produces a
/// consistent JSON error response.
#[derive(Debug, Clone)]
pub enum ApiError {
    /// 400 Bad Request - Invalid input from client.
    BadRequest {
        /// Machine-readable error code.
        error_code: String,
        /// Human-readable error message.
        message: String,
        /// Optional additional details.
        details: Option<serde_json::Value>,
    },

    /// 404 Not Found - Resource does not exist.
    NotFound {
        /// Machine-readable error code.
        error_code: String,
        /// Human-readable error message.
        message: String,
    },

    /// 500 Internal Server Error - Unexpected server-side error.
    InternalError {
        /// Machine-readable error code.
        error_code: String,
        /// Human-readable error message.
        message: String,
        /// Optional details.
        details: Option<String>,
    },
}

/// Standard JSON error response body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "error": "empty_device_id",
    "message": "Device id cannot be empty",
    "details": { "index": 0 }
}))]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g., "empty_device_id").
    #[schema(example = "empty_device_id")]
    pub error: String,

    /// Human-readable error message.
    #[schema(example = "Device id cannot be empty")]
    pub message: String,

    /// Optional additional details for debugging.
    #[schema(nullable)]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_response) = match self {
            Self::BadRequest {
                error_code,
                message,
                details,
            } => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: error_code,
                    message,
                    details,
                },
            ),

            Self::NotFound {
                error_code,
                message,
            } => (
                StatusCode::NOT_FOUND,
                ErrorResponse {
                    error: error_code,
                    message,
                    details: None,
                },
            ),

            Self::InternalError {
                error_code,
                message,
                details,
            } => {
                tracing::error!(
                    error_code = %error_code,
                    message = %message,
                    details = ?details,
                    "Internal server error"
                );

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: error_code,
                        message,
                        details: details.map(|d| serde_json::json!(d)),
                    },
                )
            }
        };

        (status, Json(error_response)).into_response()
    }
}

impl ApiError {
    /// Attach structured details to a client error. Other variants are
    /// returned unchanged.
    #[must_use]
    pub fn with_details(mut self, value: serde_json::Value) -> Self {
        if let Self::BadRequest { details, .. } = &mut self {
            *details = Some(value);
        }
        self
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadRequest { message, .. } => write!(f, "Bad Request: {message}"),
            Self::NotFound { message, .. } => write!(f, "Not Found: {message}"),
            Self::InternalError { message, .. } => write!(f, "Internal Error: {message}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// Convert from `ranger_core` errors.
impl From<ranger_core::RangerError> for ApiError {
    fn from(err: ranger_core::RangerError) -> Self {
        use ranger_core::RangerError;

        match &err {
            RangerError::EmptyDeviceId => Self::BadRequest {
                error_code: "empty_device_id".to_string(),
                message: err.to_string(),
                details: None,
            },
            RangerError::ConfigNotFound(_) => Self::NotFound {
                error_code: "config_not_found".to_string(),
                message: err.to_string(),
            },
            RangerError::ConfigParseError(_)
            | RangerError::ConfigValidationError(_)
            | RangerError::IoError(_) => Self::InternalError {
                error_code: err.error_code().to_ascii_lowercase(),
                message: err.to_string(),
                details: None,
            },
        }
    }
}

impl From<ranger_core::ObservationError> for ApiError {
    fn from(err: ranger_core::ObservationError) -> Self {
        Self::from(ranger_core::RangerError::from(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_request_error() {
        let err = ApiError::BadRequest {
            error_code: "test_error".to_string(),
            message: "Test message".to_string(),
            details: None,
        };
        assert!(err.to_string().contains("Bad Request"));
    }

    #[test]
    fn test_from_empty_device_id() {
        let err = ApiError::from(ranger_core::ObservationError::EmptyDeviceId);
        match err {
            ApiError::BadRequest { error_code, .. } => assert_eq!(error_code, "empty_device_id"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_with_details_only_touches_bad_request() {
        let err = ApiError::from(ranger_core::ObservationError::EmptyDeviceId)
            .with_details(serde_json::json!({ "index": 2 }));
        match err {
            ApiError::BadRequest { details, .. } => {
                assert_eq!(details, Some(serde_json::json!({ "index": 2 })));
            }
            other => panic!("unexpected error: {other}"),
        }

        let not_found = ApiError::NotFound {
            error_code: "device_not_found".to_string(),
            message: "missing".to_string(),
        }
        .with_details(serde_json::json!({ "index": 0 }));
        assert!(matches!(not_found, ApiError::NotFound { .. }));
    }

    #[test]
    fn test_status_codes() {
        let not_found = ApiError::NotFound {
            error_code: "device_not_found".to_string(),
            message: "missing".to_string(),
        };
        assert_eq!(not_found.into_response().status(), StatusCode::NOT_FOUND);

        let internal = ApiError::from(ranger_core::RangerError::IoError(std::io::Error::other(
            "disk full",
        )));
        assert_eq!(
            internal.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_response_serialization() {
        let response = ErrorResponse {
            error: "test_error".to_string(),
            message: "Test message".to_string(),
            details: None,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("test_error"));
    }
}
