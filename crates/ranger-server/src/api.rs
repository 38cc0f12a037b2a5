//! HTTP API routes and handlers.
//!
//! This module contains all HTTP endpoint implementations organized by domain:
//! - `observations` - Scan report ingestion
//! - `devices` - Registry snapshots, removal, and sweeps
//! - `estimate` - One-off distance estimation
//! - `scan` - Scan session lifecycle
//! - `health` - Service health checks
//! - `error` - API error types
//! - `openapi` - OpenAPI specification generation

use axum::routing::get;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::SharedState;

pub mod devices;
pub mod error;
pub mod estimate;
pub mod health;
pub mod observations;
pub mod openapi;
pub mod scan;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use openapi::get_openapi_json;

/// Creates the combined API router with all endpoints.
///
/// # Route Structure
///
/// ```text
/// /health                - Health check
/// /api
/// ├── /observations      - Scan report ingestion
/// ├── /devices           - Snapshot, lookup, removal, sweep
/// ├── /estimate          - Distance for a single reading
/// ├── /scan              - Scan session status and control
/// └── /openapi.json      - OpenAPI specification
/// ```
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .nest("/health", health::router())
        .nest(
            "/api",
            Router::new()
                .nest("/observations", observations::router())
                .nest("/devices", devices::router())
                .route("/estimate", get(estimate::estimate))
                .nest("/scan", scan::router())
                .route("/openapi.json", get(openapi::get_openapi_spec)),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
