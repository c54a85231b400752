//! # Health Check Handlers

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::error;

use crate::web::errors::{ApiError, ApiResult};
use crate::web::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    timestamp: String,
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    status: String,
    database: String,
    version: String,
    timestamp: String,
}

/// Liveness: GET /health
pub async fn basic_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Readiness: GET /ready
///
/// Ready once the store answers.
pub async fn readiness_probe(State(state): State<AppState>) -> ApiResult<Json<ReadinessResponse>> {
    if let Err(e) = state.store.health_check().await {
        error!(error = %e, "Readiness check failed");
        return Err(ApiError::ServiceUnavailable(e.to_string()));
    }

    Ok(Json(ReadinessResponse {
        status: "ready".to_string(),
        database: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}
