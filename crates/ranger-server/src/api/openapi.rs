//! OpenAPI specification generation for the ranger API.

use axum::Json;
use utoipa::OpenApi;

use ranger_core::{DeviceClass, DeviceReport, DistanceModel, ScanReport, ScanState, ScanStatus};

use super::devices::{DevicesResponse, RemoveDeviceResponse, SweepResponse};
use super::error::ErrorResponse;
use super::estimate::EstimateResponse;
use super::health::HealthResponse;
use super::observations::{IngestRequest, IngestResponse};
use super::scan::{AdapterRequest, ScanActionResponse};

/// Serve the OpenAPI specification as JSON.
///
/// This endpoint is available at `/api/openapi.json`.
pub async fn get_openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Returns the OpenAPI specification as a pretty-printed string.
/// Used by the gen-openapi binary.
///
/// # Errors
///
/// Returns an error if the document cannot be serialized.
pub fn get_openapi_json() -> Result<String, serde_json::Error> {
    ApiDoc::openapi().to_pretty_json()
}

/// Main OpenAPI document structure for ranger.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "ranger API",
        version = "0.1.0",
        description = r#"
# ranger API

ranger keeps a live list of nearby radio devices and estimates how far away each one is.

## Overview

1. **Ingestion**: Scanners post sightings (device id, signal strength, optional reference power)
2. **Estimation**: Each sighting is turned into a distance with the ratio-power or log-distance model
3. **Registry**: Only the latest sighting per device is kept, and entries older than the
   configured age (60 s by default) are swept away

Distances are estimates. Treat them as "near / far" hints rather than measurements.
"#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "/", description = "Local ranger server")
    ),
    tags(
        (name = "system", description = "Health checks"),
        (name = "observations", description = "Scan report ingestion"),
        (name = "devices", description = "Tracked devices and stale sweeps"),
        (name = "estimation", description = "Distance estimation for single readings"),
        (name = "scan", description = "Scan session lifecycle")
    ),
    paths(
        super::health::health_check,
        super::observations::ingest,
        super::devices::list_devices,
        super::devices::get_device,
        super::devices::remove_device,
        super::devices::sweep,
        super::estimate::estimate,
        super::scan::get_scan_status,
        super::scan::start_scan,
        super::scan::stop_scan,
        super::scan::set_adapter,
    ),
    components(
        schemas(
            // Error types
            ErrorResponse,
            // Health types
            HealthResponse,
            // Domain types
            DeviceClass,
            DistanceModel,
            ScanReport,
            DeviceReport,
            ScanState,
            ScanStatus,
            // Request/response types
            IngestRequest,
            IngestResponse,
            DevicesResponse,
            RemoveDeviceResponse,
            SweepResponse,
            EstimateResponse,
            ScanActionResponse,
            AdapterRequest,
        )
    )
)]
pub struct ApiDoc;
