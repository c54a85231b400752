//! # Orchestration Handlers
//!
//! The maintenance trigger plus read-only views over past runs.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::orchestration::OrchestrationOutcome;
use crate::web::errors::{ApiError, ApiResult};
use crate::web::state::AppState;

const DEFAULT_LIST_LIMIT: i64 = 20;
const MAX_LIST_LIMIT: i64 = 100;

/// Render a finished run in the trigger's response shape
pub fn outcome_response(outcome: &OrchestrationOutcome) -> Response {
    let timestamp = chrono::Utc::now().to_rfc3339();

    if outcome.stopped_early {
        let body = json!({
            "success": false,
            "orchestrationId": outcome.orchestration_id,
            "error": outcome.error.clone().unwrap_or_else(|| "Orchestration aborted".to_string()),
            "results": outcome.results,
            "timestamp": timestamp,
        });
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
    }

    let body = json!({
        "success": outcome.success(),
        "orchestrationId": outcome.orchestration_id,
        "message": outcome.message(),
        "results": outcome.results,
        "summary": outcome.summary,
        "timestamp": timestamp,
    });
    (StatusCode::OK, Json(body)).into_response()
}

/// Run the full maintenance sequence: POST /api/cron/orchestrate-maintenance
pub async fn trigger_orchestration(State(state): State<AppState>) -> ApiResult<Response> {
    info!(policy = ?state.orchestrator.policy(), "Maintenance orchestration triggered");
    let outcome = state.orchestrator.run().await?;
    Ok(outcome_response(&outcome))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Kept as text so a bad value gets the JSON error shape
    pub limit: Option<String>,
}

/// `limit` query value, defaulted and clamped to 1..=100
fn parse_limit(raw: Option<&str>) -> ApiResult<i64> {
    match raw.map(str::trim) {
        None | Some("") => Ok(DEFAULT_LIST_LIMIT),
        Some(value) => value
            .parse::<i64>()
            .map(|limit| limit.clamp(1, MAX_LIST_LIMIT))
            .map_err(|_| ApiError::bad_request(format!("Invalid limit: {value}"))),
    }
}

/// Recent runs, newest first: GET /api/orchestrations
pub async fn list_orchestrations(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let limit = parse_limit(query.limit.as_deref())?;
    let runs = state.store.list_orchestration_runs(limit).await?;

    Ok(Json(json!({
        "success": true,
        "orchestrations": runs,
        "count": runs.len(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })))
}

/// One run with its job executions and their analyses: GET /api/orchestrations/:id
pub async fn get_orchestration(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let id = Uuid::parse_str(&id)
        .map_err(|_| ApiError::bad_request(format!("Invalid orchestration id: {id}")))?;

    let run = state
        .store
        .get_orchestration_run(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("orchestration run {id}")))?;
    let executions = state.store.list_job_executions(id).await?;

    let mut analysis_results = Vec::new();
    for execution in &executions {
        analysis_results.extend(state.store.list_analysis_results(execution.id).await?);
    }

    Ok(Json(json!({
        "success": true,
        "orchestration": run,
        "jobExecutions": executions,
        "analysisResults": analysis_results,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_limit() {
        assert_eq!(parse_limit(None).unwrap(), DEFAULT_LIST_LIMIT);
        assert_eq!(parse_limit(Some("")).unwrap(), DEFAULT_LIST_LIMIT);
        assert_eq!(parse_limit(Some("5")).unwrap(), 5);
        assert_eq!(parse_limit(Some("0")).unwrap(), 1);
        assert_eq!(parse_limit(Some("5000")).unwrap(), MAX_LIST_LIMIT);
        assert!(matches!(parse_limit(Some("abc")), Err(ApiError::BadRequest(_))));
    }
}
