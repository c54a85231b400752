//! # Job Invocation
//!
//! How the orchestrator reaches a job. [`HttpJobInvoker`] calls the sibling
//! endpoint with the internal bearer credential; [`LocalJobInvoker`] runs the
//! job in process through the [`JobRunner`]. Both produce a [`JobCallReply`]
//! so the orchestrator classifies them the same way.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use crate::constants::{system, JobName};
use crate::error::{MaintenanceError, Result};
use crate::jobs::JobRunner;
use crate::orchestration::types::JobCallReply;

#[async_trait]
pub trait JobInvoker: Send + Sync {
    /// Call one job on behalf of a run.
    ///
    /// `Ok` means a reply was received, whatever it says; `Err` is a
    /// [`MaintenanceError::JobTransport`] when the call could not be completed.
    async fn invoke(&self, job: JobName, orchestration_id: Uuid) -> Result<JobCallReply>;
}

#[derive(Debug, Clone)]
pub struct HttpJobInvoker {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl HttpJobInvoker {
    /// A zero `timeout` leaves the HTTP client's defaults in place
    pub fn new(base_url: Url, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let mut builder = Client::builder().user_agent(system::USER_AGENT);
        if !timeout.is_zero() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            MaintenanceError::Configuration(format!("Failed to create HTTP client: {e}"))
        })?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.into(),
        })
    }

    pub fn endpoint(&self, job: JobName) -> Result<Url> {
        self.base_url.join(&job.endpoint_path()).map_err(|e| {
            MaintenanceError::Configuration(format!("Invalid endpoint for {job}: {e}"))
        })
    }
}

#[async_trait]
impl JobInvoker for HttpJobInvoker {
    async fn invoke(&self, job: JobName, orchestration_id: Uuid) -> Result<JobCallReply> {
        let url = self.endpoint(job)?;
        debug!(job = %job, url = %url, "Calling job endpoint");

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&json!({ "orchestrationId": orchestration_id }))
            .send()
            .await
            .map_err(|e| MaintenanceError::job_transport(job.as_str(), e.to_string()))?;

        let status_code = response.status().as_u16();
        let body = response.json::<serde_json::Value>().await.map_err(|e| {
            MaintenanceError::job_transport(
                job.as_str(),
                format!("HTTP {status_code} with unreadable body: {e}"),
            )
        })?;

        Ok(JobCallReply { status_code, body })
    }
}

#[derive(Debug, Clone)]
pub struct LocalJobInvoker {
    runner: Arc<JobRunner>,
}

impl LocalJobInvoker {
    pub fn new(runner: Arc<JobRunner>) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl JobInvoker for LocalJobInvoker {
    async fn invoke(&self, job: JobName, orchestration_id: Uuid) -> Result<JobCallReply> {
        match self.runner.run(job, Some(orchestration_id)).await {
            Ok(outcome) => Ok(JobCallReply {
                status_code: if outcome.success { 200 } else { 500 },
                body: outcome.response_body(),
            }),
            Err(e) => Ok(JobCallReply {
                status_code: 500,
                body: json!({
                    "success": false,
                    "error": e.to_string(),
                    "timestamp": chrono::Utc::now().to_rfc3339(),
                }),
            }),
        }
    }
}
