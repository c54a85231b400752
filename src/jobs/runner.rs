use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::constants::JobName;
use crate::database::MaintenanceStore;
use crate::error::{MaintenanceError, Result};
use crate::jobs::{JobContext, MaintenanceJob};
use crate::logging::{log_error, log_job_operation};
use crate::models::JobExecutionOutcome;

/// Lookup table from job name to implementation
#[derive(Clone, Default)]
pub struct JobRegistry {
    jobs: HashMap<JobName, Arc<dyn MaintenanceJob>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, job: Arc<dyn MaintenanceJob>) {
        self.jobs.insert(job.name(), job);
    }

    pub fn with(mut self, job: Arc<dyn MaintenanceJob>) -> Self {
        self.register(job);
        self
    }

    pub fn get(&self, name: JobName) -> Option<Arc<dyn MaintenanceJob>> {
        self.jobs.get(&name).cloned()
    }
}

impl std::fmt::Debug for JobRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.jobs.keys().map(|j| j.as_str()).collect();
        names.sort_unstable();
        f.debug_struct("JobRegistry").field("jobs", &names).finish()
    }
}

/// What a job endpoint reports back to its caller
#[derive(Debug, Clone, PartialEq)]
pub struct JobRunOutcome {
    pub job: JobName,
    pub job_execution_id: Uuid,
    pub success: bool,
    pub result: Value,
    pub error: Option<String>,
    pub finished_at: DateTime<Utc>,
}

impl JobRunOutcome {
    /// `{ success, jobExecutionId, ...result fields, timestamp }` or
    /// `{ success: false, jobExecutionId, error, timestamp }`
    pub fn response_body(&self) -> Value {
        let mut body = serde_json::Map::new();
        body.insert("success".to_string(), json!(self.success));
        body.insert("jobExecutionId".to_string(), json!(self.job_execution_id));

        if self.success {
            if let Value::Object(fields) = &self.result {
                for (key, value) in fields {
                    body.entry(key.clone()).or_insert_with(|| value.clone());
                }
            }
        } else {
            body.insert(
                "error".to_string(),
                json!(self.error.clone().unwrap_or_else(|| "Job failed".to_string())),
            );
        }

        body.insert("timestamp".to_string(), json!(self.finished_at.to_rfc3339()));
        Value::Object(body)
    }
}

/// Runs registered jobs with execution-record bookkeeping
pub struct JobRunner {
    store: Arc<dyn MaintenanceStore>,
    registry: JobRegistry,
}

impl std::fmt::Debug for JobRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobRunner")
            .field("registry", &self.registry)
            .finish()
    }
}

impl JobRunner {
    pub fn new(store: Arc<dyn MaintenanceStore>, registry: JobRegistry) -> Self {
        Self { store, registry }
    }

    /// Run one job.
    ///
    /// Returns `Err` only when the execution record cannot be created; every
    /// failure after that point is recorded on the execution and reported in
    /// the outcome.
    pub async fn run(&self, job_name: JobName, orchestration_id: Option<Uuid>) -> Result<JobRunOutcome> {
        let job = self.registry.get(job_name).ok_or_else(|| {
            MaintenanceError::Configuration(format!("No implementation registered for {job_name}"))
        })?;

        let execution = self
            .store
            .create_job_execution(orchestration_id, job_name)
            .await?;

        let execution_id = execution.id.to_string();
        let orchestration_ref = orchestration_id.map(|id| id.to_string());
        log_job_operation(
            "start",
            job_name.as_str(),
            Some(&execution_id),
            orchestration_ref.as_deref(),
            "running",
            None,
        );

        let ctx = JobContext {
            job_execution_id: execution.id,
            orchestration_id,
            store: self.store.clone(),
        };

        let outcome = match job.execute(&ctx).await {
            Ok(result) => JobExecutionOutcome::Completed(result),
            Err(e) => {
                warn!(job = %job_name, error = %e, "Maintenance job failed");
                JobExecutionOutcome::Failed(e.to_string())
            }
        };

        // Recording the terminal state is best effort: the caller still learns the outcome
        if let Err(e) = self
            .store
            .finish_job_execution(execution.id, outcome.clone())
            .await
        {
            error!(job = %job_name, job_execution_id = %execution.id, error = %e, "Failed to finalize job execution");
            log_error(
                "job_runner",
                "finish_job_execution",
                &e.to_string(),
                Some(job_name.as_str()),
            );
        }

        let status = outcome.status();
        log_job_operation(
            "finish",
            job_name.as_str(),
            Some(&execution_id),
            orchestration_ref.as_deref(),
            status.as_str(),
            None,
        );
        info!(job = %job_name, job_execution_id = %execution.id, status = %status, "Maintenance job finished");

        let finished_at = Utc::now();
        Ok(match outcome {
            JobExecutionOutcome::Completed(result) => JobRunOutcome {
                job: job_name,
                job_execution_id: execution.id,
                success: true,
                result,
                error: None,
                finished_at,
            },
            JobExecutionOutcome::Failed(error) => JobRunOutcome {
                job: job_name,
                job_execution_id: execution.id,
                success: false,
                result: Value::Null,
                error: Some(error),
                finished_at,
            },
        })
    }
}
