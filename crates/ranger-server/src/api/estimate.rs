//! One-off distance estimation endpoint.

use axum::extract::{Query, State};
use axum::Json;
use ranger_core::{format_distance, DistanceModel};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::state::SharedState;

/// Query parameters for the estimate endpoint.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct EstimateQuery {
    /// Received signal strength in dBm. `0` means unreadable.
    #[param(example = -65)]
    pub signal_strength: i32,

    /// Calibrated signal strength at 1 meter.
    /// Defaults to the configured `estimation.default_reference_power`.
    #[param(example = -59)]
    pub reference_power: Option<i32>,

    /// Model to apply. Defaults to the configured `estimation.model`.
    pub model: Option<DistanceModel>,
}

/// Distance estimate for a single reading.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "signal_strength": -65,
    "reference_power": -59,
    "model": "log_distance",
    "estimated_distance": 1.9953,
    "distance_text": "2.00 m"
}))]
pub struct EstimateResponse {
    /// Signal strength that was evaluated.
    #[schema(example = -65)]
    pub signal_strength: i32,

    /// Reference power that was applied.
    #[schema(example = -59)]
    pub reference_power: i32,

    /// Model that was applied.
    pub model: DistanceModel,

    /// Estimated distance in meters, absent when unknown.
    #[schema(nullable, example = 1.9953)]
    pub estimated_distance: Option<f64>,

    /// Estimated distance formatted for display.
    #[schema(example = "2.00 m")]
    pub distance_text: String,
}

/// Estimate the distance for a signal strength reading.
#[utoipa::path(
    get,
    path = "/api/estimate",
    tag = "estimation",
    operation_id = "estimateDistance",
    summary = "Estimate distance from signal strength",
    description = "Applies a distance model to one reading without touching the registry. \
        `estimated_distance` is null when the signal strength is 0 or the model yields \
        no finite value.",
    params(EstimateQuery),
    responses(
        (status = 200, description = "Estimate computed", body = EstimateResponse),
        (status = 400, description = "Malformed query")
    )
)]
pub async fn estimate(
    State(state): State<SharedState>,
    Query(query): Query<EstimateQuery>,
) -> Json<EstimateResponse> {
    let estimation = state.read().await.config.estimation.clone();

    let model = query.model.unwrap_or(estimation.model);
    let reference_power = query
        .reference_power
        .unwrap_or(estimation.default_reference_power);
    let estimated_distance = model.estimate(query.signal_strength, reference_power);

    Json(EstimateResponse {
        signal_strength: query.signal_strength,
        reference_power,
        model,
        estimated_distance,
        distance_text: format_distance(estimated_distance),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_response_unknown_serializes_null() {
        let response = EstimateResponse {
            signal_strength: 0,
            reference_power: -59,
            model: DistanceModel::RatioPower,
            estimated_distance: None,
            distance_text: format_distance(None),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"estimated_distance\":null"));
        assert!(json.contains("\"distance_text\":\"unknown\""));
    }
}
