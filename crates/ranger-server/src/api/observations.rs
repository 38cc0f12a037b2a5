//! Observation ingestion endpoint.
//!
//! Scanning collaborators post batches of [`ScanReport`]s here. A batch is
//! validated as a whole before anything touches the registry.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use ranger_core::{now_millis, ObservationError, ScanReport, UpsertOutcome};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::api::error::{ApiError, ApiResult};
use crate::state::SharedState;

/// Creates the observations router.
pub fn router() -> Router<SharedState> {
    Router::new().route("/", post(ingest))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Batch of scan reports.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[schema(example = json!({
    "reports": [
        {
            "device_id": "AA:BB:CC:DD:EE:FF",
            "name": "Pixel Buds",
            "signal_strength": -65,
            "reference_power": -59,
            "device_class": "short_range_advertising"
        },
        {
            "device_id": "11:22:33:44:55:66",
            "signal_strength": -80,
            "device_class": "classic_pairing"
        }
    ]
}))]
pub struct IngestRequest {
    /// Sightings to record, applied in order.
    pub reports: Vec<ScanReport>,
}

/// Result of an ingestion batch.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "accepted": 2,
    "inserted": 1,
    "replaced": 1
}))]
pub struct IngestResponse {
    /// Reports applied to the registry.
    #[schema(example = 2)]
    pub accepted: usize,

    /// Reports that created a new entry.
    #[schema(example = 1)]
    pub inserted: usize,

    /// Reports that replaced an existing entry.
    #[schema(example = 1)]
    pub replaced: usize,
}

// ============================================================================
// Handlers
// ============================================================================

/// Record a batch of scan reports.
#[utoipa::path(
    post,
    path = "/api/observations",
    tag = "observations",
    operation_id = "ingestObservations",
    summary = "Ingest scan reports",
    description = "Records the latest sighting for each reported device, replacing any \
        previous entry and re-estimating its distance. Reports without `observed_at_ms` \
        are stamped with the arrival time. If any report has a blank `device_id` the \
        whole batch is rejected and the registry is left untouched.",
    request_body = IngestRequest,
    responses(
        (status = 200, description = "Batch applied", body = IngestResponse),
        (status = 400, description = "A report has an empty device id", body = crate::api::error::ErrorResponse)
    )
)]
pub async fn ingest(
    State(state): State<SharedState>,
    Json(request): Json<IngestRequest>,
) -> ApiResult<Json<IngestResponse>> {
    let now_ms = now_millis();
    let state_guard = state.read().await;
    let registry = &state_guard.registry;

    let observations = request
        .reports
        .into_iter()
        .enumerate()
        .map(|(index, report)| {
            let model = report.model.unwrap_or_else(|| registry.model());
            report
                .into_observation(now_ms)
                .map(|observation| (observation, model))
                .map_err(|err| rejected(index, err))
        })
        .collect::<ApiResult<Vec<_>>>()?;

    let mut response = IngestResponse {
        accepted: observations.len(),
        inserted: 0,
        replaced: 0,
    };
    for (observation, model) in observations {
        match registry.upsert_with_model(observation, model) {
            UpsertOutcome::Inserted => response.inserted += 1,
            UpsertOutcome::Replaced => response.replaced += 1,
        }
    }

    info!(
        accepted = response.accepted,
        inserted = response.inserted,
        replaced = response.replaced,
        tracked = registry.len(),
        "Ingested scan reports"
    );

    Ok(Json(response))
}

fn rejected(index: usize, err: ObservationError) -> ApiError {
    ApiError::from(err).with_details(serde_json::json!({ "index": index }))
}
