use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::constants::{ExecutionStatus, JobName};
use crate::database::MaintenanceStore;
use crate::error::Result;
use crate::logging::{log_error, log_orchestration_operation};
use crate::models::RunFinalization;
use crate::orchestration::job_client::JobInvoker;
use crate::orchestration::pacing::Pacer;
use crate::orchestration::types::{
    FailurePolicy, JobResult, OrchestrationOutcome, OrchestrationSummary,
};

/// Runs the four maintenance jobs in their fixed order
pub struct MaintenanceOrchestrator {
    store: Arc<dyn MaintenanceStore>,
    invoker: Arc<dyn JobInvoker>,
    policy: FailurePolicy,
    pacer: Pacer,
}

impl std::fmt::Debug for MaintenanceOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaintenanceOrchestrator")
            .field("policy", &self.policy)
            .field("pacer", &self.pacer)
            .finish()
    }
}

impl MaintenanceOrchestrator {
    pub fn new(
        store: Arc<dyn MaintenanceStore>,
        invoker: Arc<dyn JobInvoker>,
        policy: FailurePolicy,
        pacer: Pacer,
    ) -> Self {
        Self {
            store,
            invoker,
            policy,
            pacer,
        }
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn jobs(&self) -> &'static [JobName] {
        &JobName::SEQUENCE
    }

    /// Execute one orchestration run.
    ///
    /// The run record is created before the first job and finalised exactly
    /// once after the last attempted job. `Err` is returned only when the run
    /// record itself cannot be written.
    pub async fn run(&self) -> Result<OrchestrationOutcome> {
        let jobs = self.jobs();
        let run = self
            .store
            .create_orchestration_run(jobs.len() as i32)
            .await?;
        let run_ref = run.id.to_string();

        log_orchestration_operation(
            "start",
            Some(&run_ref),
            "running",
            Some(&format!("policy={:?}", self.policy)),
        );

        let mut results: Vec<JobResult> = Vec::with_capacity(jobs.len());
        let mut transport_errors: Vec<String> = Vec::new();
        let mut stop_reason: Option<String> = None;

        for (index, &job) in jobs.iter().enumerate() {
            if index > 0 {
                self.pacer.pause().await;
            }

            info!(orchestration_id = %run.id, job = %job, "Invoking maintenance job");

            match self.invoker.invoke(job, run.id).await {
                Ok(reply) => {
                    let success = reply.is_success();
                    let error_message = reply.error_message();
                    results.push(JobResult {
                        job,
                        success,
                        result: reply.body,
                        timestamp: Utc::now(),
                    });

                    if !success {
                        warn!(
                            orchestration_id = %run.id,
                            job = %job,
                            status_code = reply.status_code,
                            "Maintenance job reported failure"
                        );
                        if self.policy.should_stop(false) {
                            stop_reason = Some(format!(
                                "{job} failed: {}",
                                error_message.unwrap_or_else(|| {
                                    format!("HTTP {}", reply.status_code)
                                })
                            ));
                            break;
                        }
                    }
                }
                Err(e) => {
                    let message = e.to_string();
                    error!(orchestration_id = %run.id, job = %job, error = %message, "Maintenance job call failed");
                    results.push(JobResult {
                        job,
                        success: false,
                        result: json!({ "success": false, "error": message }),
                        timestamp: Utc::now(),
                    });

                    if self.policy.should_stop(e.is_transport()) {
                        stop_reason = Some(message);
                        break;
                    }
                    transport_errors.push(message);
                }
            }
        }

        let summary = OrchestrationSummary::from_results(jobs.len(), &results);
        let stopped_early = stop_reason.is_some();
        let error_message = match stop_reason {
            Some(reason) => Some(reason),
            None if !transport_errors.is_empty() => Some(transport_errors.join("; ")),
            None => None,
        };
        let status = if summary.all_succeeded() {
            ExecutionStatus::Completed
        } else {
            ExecutionStatus::Failed
        };

        let finalized = self
            .store
            .finalize_orchestration_run(
                run.id,
                RunFinalization {
                    status,
                    completed_jobs: summary.successful_jobs as i32,
                    failed_jobs: summary.failed_jobs as i32,
                    error_message: error_message.clone(),
                },
            )
            .await;

        let finalized = match finalized {
            Ok(run) => run,
            Err(e) => {
                log_error(
                    "orchestrator",
                    "finalize_orchestration_run",
                    &e.to_string(),
                    Some(&run_ref),
                );
                return Err(e);
            }
        };

        log_orchestration_operation(
            "finish",
            Some(&run_ref),
            status.as_str(),
            Some(&format!(
                "successful={} failed={} stopped_early={}",
                summary.successful_jobs, summary.failed_jobs, stopped_early
            )),
        );

        Ok(OrchestrationOutcome {
            orchestration_id: run.id,
            status,
            results,
            summary,
            error: error_message,
            stopped_early,
            started_at: finalized.started_at,
            completed_at: finalized.completed_at.unwrap_or_else(Utc::now),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::InMemoryStore;
    use crate::error::MaintenanceError;
    use crate::orchestration::types::JobCallReply;
    use async_trait::async_trait;
    use uuid::Uuid;

    struct ScriptedInvoker;

    #[async_trait]
    impl JobInvoker for ScriptedInvoker {
        async fn invoke(&self, job: JobName, _orchestration_id: Uuid) -> Result<JobCallReply> {
            match job {
                JobName::UpdateKnowledgeBase => {
                    Err(MaintenanceError::job_transport(job.as_str(), "connection reset"))
                }
                _ => Ok(JobCallReply {
                    status_code: 200,
                    body: json!({ "success": true }),
                }),
            }
        }
    }

    #[tokio::test]
    async fn test_continue_all_records_transport_error_text() {
        let store = Arc::new(InMemoryStore::new());
        let orchestrator = MaintenanceOrchestrator::new(
            store.clone(),
            Arc::new(ScriptedInvoker),
            FailurePolicy::ContinueAll,
            Pacer::none(),
        );

        let outcome = orchestrator.run().await.unwrap();
        assert_eq!(outcome.results.len(), 4);
        assert!(!outcome.stopped_early);
        assert_eq!(outcome.summary.failed_jobs, 1);

        let run = &store.runs()[0];
        assert_eq!(run.status(), Some(ExecutionStatus::Failed));
        assert_eq!(run.completed_jobs + run.failed_jobs, 4);
        assert!(run
            .error_message
            .as_deref()
            .unwrap()
            .contains("connection reset"));
    }
}
