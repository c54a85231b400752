//! # Orchestration Types
//!
//! Policy enums and the result structures produced by a maintenance run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{ExecutionStatus, JobName};

/// How the orchestrator reacts when a job fails.
///
/// A job can fail in two ways: its endpoint answers with a non-2xx status or a
/// `success: false` body (a returned failure), or the call itself cannot be
/// completed (a transport error: network failure, timeout, malformed body).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Attempt every job regardless of failure type
    #[default]
    ContinueAll,
    /// Stop at the first failure of either type
    StopOnFirstFailure,
    /// Continue past returned failures, abort on transport errors
    AbortOnTransportError,
}

impl FailurePolicy {
    /// Whether the remaining jobs should be skipped after this failure
    pub fn should_stop(&self, transport_error: bool) -> bool {
        match self {
            Self::ContinueAll => false,
            Self::StopOnFirstFailure => true,
            Self::AbortOnTransportError => transport_error,
        }
    }
}

/// How the orchestrator reaches the job endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    /// Authenticated HTTP call to the sibling endpoint
    #[default]
    Http,
    /// Direct in-process call to the job runner
    Local,
}

/// Raw reply of one job call, before classification
#[derive(Debug, Clone, PartialEq)]
pub struct JobCallReply {
    pub status_code: u16,
    pub body: serde_json::Value,
}

impl JobCallReply {
    /// HTTP-level success and no explicit `success: false` in the body
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
            && self.body.get("success").and_then(serde_json::Value::as_bool) != Some(false)
    }

    /// Error text reported by the job, if any
    pub fn error_message(&self) -> Option<String> {
        self.body
            .get("error")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
    }
}

/// Outcome of one job within a run, in execution order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResult {
    pub job: JobName,
    pub success: bool,
    pub result: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestrationSummary {
    pub total_jobs: usize,
    pub successful_jobs: usize,
    pub failed_jobs: usize,
}

impl OrchestrationSummary {
    pub fn from_results(total_jobs: usize, results: &[JobResult]) -> Self {
        let successful_jobs = results.iter().filter(|r| r.success).count();
        Self {
            total_jobs,
            successful_jobs,
            failed_jobs: results.len() - successful_jobs,
        }
    }

    pub fn all_succeeded(&self) -> bool {
        self.successful_jobs == self.total_jobs && self.failed_jobs == 0
    }
}

/// Everything the trigger caller learns about a finished run
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestrationOutcome {
    pub orchestration_id: Uuid,
    pub status: ExecutionStatus,
    pub results: Vec<JobResult>,
    pub summary: OrchestrationSummary,
    /// Error text recorded on the run, when any job call could not be completed
    pub error: Option<String>,
    /// True when the failure policy skipped the remaining jobs
    pub stopped_early: bool,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl OrchestrationOutcome {
    pub fn success(&self) -> bool {
        self.status == ExecutionStatus::Completed
    }

    pub fn message(&self) -> String {
        if self.success() {
            format!(
                "Maintenance orchestration completed: all {} jobs succeeded",
                self.summary.total_jobs
            )
        } else {
            format!(
                "Maintenance orchestration finished with failures: {} succeeded, {} failed of {}",
                self.summary.successful_jobs, self.summary.failed_jobs, self.summary.total_jobs
            )
        }
    }
}
