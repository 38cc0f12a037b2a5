//! Registry API endpoints.
//!
//! Provides the device snapshot, single-device lookup, removal, and an
//! on-demand stale sweep.

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use ranger_core::{now_millis, DeviceReport};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::api::error::{ApiError, ApiResult};
use crate::state::SharedState;

/// Creates the devices router with all endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_devices))
        .route("/sweep", post(sweep))
        .route("/{device_id}", get(get_device).delete(remove_device))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Snapshot of every tracked device.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "devices": [
        {
            "device_id": "AA:BB:CC:DD:EE:FF",
            "display_name": "Pixel Buds",
            "signal_strength": -65,
            "estimated_distance": 1.87,
            "distance_text": "1.87 m",
            "reference_power": -59,
            "device_class": "short_range_advertising",
            "model": "ratio_power",
            "observed_at_ms": 1736911800000_i64
        }
    ],
    "count": 1
}))]
pub struct DevicesResponse {
    /// Tracked devices, least recently updated first.
    pub devices: Vec<DeviceReport>,

    /// Number of devices in the snapshot.
    #[schema(example = 1)]
    pub count: usize,
}

/// Result of removing a device.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "device_id": "AA:BB:CC:DD:EE:FF",
    "removed": true
}))]
pub struct RemoveDeviceResponse {
    /// Identifier that was requested.
    #[schema(example = "AA:BB:CC:DD:EE:FF")]
    pub device_id: String,

    /// Whether an entry existed and was removed.
    #[schema(example = true)]
    pub removed: bool,
}

/// Query parameters for the sweep endpoint.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct SweepQuery {
    /// Maximum entry age in milliseconds.
    /// Defaults to the configured `registry.max_age_ms`.
    #[param(example = 60000)]
    pub max_age_ms: Option<i64>,
}

/// Result of a sweep.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "evicted": 2,
    "remaining": 5,
    "max_age_ms": 60000
}))]
pub struct SweepResponse {
    /// Entries removed.
    #[schema(example = 2)]
    pub evicted: usize,

    /// Entries left after the sweep.
    #[schema(example = 5)]
    pub remaining: usize,

    /// Age threshold that was applied.
    #[schema(example = 60000)]
    pub max_age_ms: i64,
}

// ============================================================================
// Handlers
// ============================================================================

/// List every tracked device.
#[utoipa::path(
    get,
    path = "/api/devices",
    tag = "devices",
    operation_id = "listDevices",
    summary = "List tracked devices",
    description = "Returns a point-in-time snapshot of the registry: one entry per device \
        with its latest signal strength and estimated distance. Devices appear in order \
        of their last update, oldest first.",
    responses(
        (status = 200, description = "Snapshot taken", body = DevicesResponse)
    )
)]
pub async fn list_devices(State(state): State<SharedState>) -> Json<DevicesResponse> {
    let devices: Vec<DeviceReport> = state
        .read()
        .await
        .registry
        .snapshot()
        .into_iter()
        .map(DeviceReport::from)
        .collect();

    Json(DevicesResponse {
        count: devices.len(),
        devices,
    })
}

/// Look up a single device.
#[utoipa::path(
    get,
    path = "/api/devices/{device_id}",
    tag = "devices",
    operation_id = "getDevice",
    summary = "Get a tracked device",
    params(
        ("device_id" = String, Path, description = "Device identifier")
    ),
    responses(
        (status = 200, description = "Device found", body = DeviceReport),
        (status = 404, description = "Device is not tracked", body = crate::api::error::ErrorResponse)
    )
)]
pub async fn get_device(
    State(state): State<SharedState>,
    Path(device_id): Path<String>,
) -> ApiResult<Json<DeviceReport>> {
    state
        .read()
        .await
        .registry
        .get(&device_id)
        .map(|entry| Json(DeviceReport::from(entry)))
        .ok_or_else(|| ApiError::NotFound {
            error_code: "device_not_found".to_string(),
            message: format!("Device '{device_id}' is not tracked"),
        })
}

/// Stop tracking a device.
#[utoipa::path(
    delete,
    path = "/api/devices/{device_id}",
    tag = "devices",
    operation_id = "removeDevice",
    summary = "Remove a tracked device",
    description = "Removes the device's entry. Removing an unknown device succeeds with \
        `removed: false`.",
    params(
        ("device_id" = String, Path, description = "Device identifier")
    ),
    responses(
        (status = 200, description = "Removal processed", body = RemoveDeviceResponse)
    )
)]
pub async fn remove_device(
    State(state): State<SharedState>,
    Path(device_id): Path<String>,
) -> Json<RemoveDeviceResponse> {
    let removed = state.read().await.registry.remove(&device_id);
    Json(RemoveDeviceResponse { device_id, removed })
}

/// Evict stale devices now.
#[utoipa::path(
    post,
    path = "/api/devices/sweep",
    tag = "devices",
    operation_id = "sweepDevices",
    summary = "Evict stale devices",
    description = "Removes every device whose last sighting is at least `max_age_ms` old. \
        The background sweep does the same on a timer.",
    params(SweepQuery),
    responses(
        (status = 200, description = "Sweep complete", body = SweepResponse),
        (status = 400, description = "Non-positive max age", body = crate::api::error::ErrorResponse)
    )
)]
pub async fn sweep(
    State(state): State<SharedState>,
    Query(query): Query<SweepQuery>,
) -> ApiResult<Json<SweepResponse>> {
    let state_guard = state.read().await;
    let max_age_ms = query
        .max_age_ms
        .unwrap_or(state_guard.config.registry.max_age_ms);

    if max_age_ms <= 0 {
        return Err(ApiError::BadRequest {
            error_code: "invalid_max_age".to_string(),
            message: "max_age_ms must be positive".to_string(),
            details: None,
        });
    }

    let evicted = state_guard.registry.evict_stale(now_millis(), max_age_ms);

    Ok(Json(SweepResponse {
        evicted,
        remaining: state_guard.registry.len(),
        max_age_ms,
    }))
}
