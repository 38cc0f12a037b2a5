//! Scan session API endpoints.
//!
//! The server does not drive a radio itself. These endpoints track the
//! session lifecycle that scanning collaborators report against.

use axum::extract::State;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use ranger_core::{now_millis, ScanStatus};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::state::SharedState;

/// Creates the scan router with all endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(get_scan_status))
        .route("/start", post(start_scan))
        .route("/stop", post(stop_scan))
        .route("/adapter", put(set_adapter))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Result of a start or stop request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "changed": true,
    "cleared": 0,
    "status": {
        "state": "scanning",
        "status": "Scanning...",
        "session_id": "0b5e8c5e-3f0a-4b7e-9a55-8a2d3c1f6e11",
        "started_at_ms": 1736911800000_i64,
        "stopped_at_ms": null,
        "period_ms": 10000,
        "adapter_enabled": true
    }
}))]
pub struct ScanActionResponse {
    /// Whether the session state changed. Repeating a start or stop is a no-op.
    #[schema(example = true)]
    pub changed: bool,

    /// Registry entries dropped because `scan.clear_on_start` is set.
    #[schema(example = 0)]
    pub cleared: usize,

    /// Session status after the request.
    pub status: ScanStatus,
}

/// Request to record the radio adapter state.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[schema(example = json!({ "enabled": true }))]
pub struct AdapterRequest {
    /// Whether the adapter is enabled.
    #[schema(example = true)]
    pub enabled: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// Get the scan session status.
#[utoipa::path(
    get,
    path = "/api/scan",
    tag = "scan",
    operation_id = "getScanStatus",
    summary = "Get scan session status",
    responses(
        (status = 200, description = "Current status", body = ScanStatus)
    )
)]
pub async fn get_scan_status(State(state): State<SharedState>) -> Json<ScanStatus> {
    Json(state.read().await.session.status())
}

/// Start a scan session.
#[utoipa::path(
    post,
    path = "/api/scan/start",
    tag = "scan",
    operation_id = "startScan",
    summary = "Start a scan session",
    description = "Starts a new session with a fresh id. Has no effect while a session is \
        already running. When `scan.clear_on_start` is set the registry is emptied first.",
    responses(
        (status = 200, description = "Request processed", body = ScanActionResponse)
    )
)]
pub async fn start_scan(State(state): State<SharedState>) -> Json<ScanActionResponse> {
    let mut state_guard = state.write().await;

    let changed = state_guard.session.start(now_millis());
    let cleared = if changed && state_guard.config.scan.clear_on_start {
        state_guard.registry.clear()
    } else {
        0
    };

    if changed {
        info!(
            session_id = ?state_guard.session.session_id(),
            cleared,
            "Scan session started"
        );
    }

    Json(ScanActionResponse {
        changed,
        cleared,
        status: state_guard.session.status(),
    })
}

/// Stop the scan session.
#[utoipa::path(
    post,
    path = "/api/scan/stop",
    tag = "scan",
    operation_id = "stopScan",
    summary = "Stop the scan session",
    description = "Stops the running session. Tracked devices are kept. Has no effect when \
        no session is running.",
    responses(
        (status = 200, description = "Request processed", body = ScanActionResponse)
    )
)]
pub async fn stop_scan(State(state): State<SharedState>) -> Json<ScanActionResponse> {
    let mut state_guard = state.write().await;

    let changed = state_guard.session.stop(now_millis());
    if changed {
        info!(
            session_id = ?state_guard.session.session_id(),
            "Scan session stopped"
        );
    }

    Json(ScanActionResponse {
        changed,
        cleared: 0,
        status: state_guard.session.status(),
    })
}

/// Record whether the radio adapter is enabled.
#[utoipa::path(
    put,
    path = "/api/scan/adapter",
    tag = "scan",
    operation_id = "setAdapter",
    summary = "Report the radio adapter state",
    request_body = AdapterRequest,
    responses(
        (status = 200, description = "Adapter state recorded", body = ScanStatus)
    )
)]
pub async fn set_adapter(
    State(state): State<SharedState>,
    Json(request): Json<AdapterRequest>,
) -> Json<ScanStatus> {
    let mut state_guard = state.write().await;
    state_guard.session.set_adapter_enabled(request.enabled);
    Json(state_guard.session.status())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapter_request_deserialization() {
        let request: AdapterRequest = serde_json::from_str(r#"{"enabled":false}"#).unwrap();
        assert!(!request.enabled);
    }
}
