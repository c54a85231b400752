//! # Job Handlers
//!
//! One POST endpoint per maintenance job. The optional JSON body
//! `{ "orchestrationId": "<uuid>" }` ties the execution to a run.

use axum::body::Bytes;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::constants::JobName;
use crate::web::errors::{ApiError, ApiResult};
use crate::web::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRequest {
    pub orchestration_id: Option<Uuid>,
}

impl JobRequest {
    /// An empty body is a standalone run
    pub fn parse(body: &[u8]) -> ApiResult<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
            .map_err(|e| ApiError::bad_request(format!("Invalid job request body: {e}")))
    }
}

pub async fn run_job(state: AppState, job: JobName, body: Bytes) -> ApiResult<Response> {
    let request = JobRequest::parse(&body)?;
    let outcome = state.job_runner.run(job, request.orchestration_id).await?;

    let status = if outcome.success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    Ok((status, Json(outcome.response_body())).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_job_request() {
        assert_eq!(JobRequest::parse(b"").unwrap().orchestration_id, None);
        assert_eq!(JobRequest::parse(b"  \n").unwrap().orchestration_id, None);
        assert_eq!(JobRequest::parse(b"{}").unwrap().orchestration_id, None);

        let id = Uuid::new_v4();
        let body = format!(r#"{{"orchestrationId":"{id}"}}"#);
        assert_eq!(
            JobRequest::parse(body.as_bytes()).unwrap().orchestration_id,
            Some(id)
        );
        assert!(JobRequest::parse(b"not json").is_err());
    }
}
