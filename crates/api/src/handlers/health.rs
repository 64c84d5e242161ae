use axum::extract::State;
use axum::Json;
use serde::Serialize;

use postmap_store::AREAS_COLLECTION;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the document store is reachable.
    pub store_healthy: bool,
}

/// GET /health -- returns service and store health.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    // A point read of a nonexistent document is the cheapest probe that
    // works for every store implementation.
    let store_healthy = state
        .store
        .get(AREAS_COLLECTION, "__health_probe__")
        .await
        .is_ok();

    let status = if store_healthy { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        store_healthy,
    })
}
