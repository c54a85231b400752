//! # Maintenance Store
//!
//! The persistence seam for runs, job executions, analysis results and
//! generated articles. [`PgMaintenanceStore`] is the production
//! implementation; [`crate::database::InMemoryStore`] backs tests and local
//! dry runs.

use async_trait::async_trait;
use std::time::Instant;
use uuid::Uuid;

use crate::constants::JobName;
use crate::database::DatabaseConnection;
use crate::error::{MaintenanceError, Result};
use crate::logging::log_database_operation;
use crate::models::{
    AnalysisResult, GeneratedArticle, JobExecution, JobExecutionOutcome, OrchestrationRun,
    RunFinalization,
};

#[async_trait]
pub trait MaintenanceStore: Send + Sync {
    async fn create_orchestration_run(&self, total_jobs: i32) -> Result<OrchestrationRun>;

    async fn finalize_orchestration_run(
        &self,
        id: Uuid,
        finalization: RunFinalization,
    ) -> Result<OrchestrationRun>;

    async fn get_orchestration_run(&self, id: Uuid) -> Result<Option<OrchestrationRun>>;

    /// Most recent runs first
    async fn list_orchestration_runs(&self, limit: i64) -> Result<Vec<OrchestrationRun>>;

    async fn create_job_execution(
        &self,
        orchestration_id: Option<Uuid>,
        job: JobName,
    ) -> Result<JobExecution>;

    async fn finish_job_execution(
        &self,
        id: Uuid,
        outcome: JobExecutionOutcome,
    ) -> Result<JobExecution>;

    /// Executions of one run in start order
    async fn list_job_executions(&self, orchestration_id: Uuid) -> Result<Vec<JobExecution>>;

    async fn record_analysis_result(&self, result: AnalysisResult) -> Result<AnalysisResult>;

    async fn list_analysis_results(&self, job_execution_id: Uuid) -> Result<Vec<AnalysisResult>>;

    async fn save_article(&self, article: GeneratedArticle) -> Result<GeneratedArticle>;

    async fn article_slug_exists(&self, slug: &str) -> Result<bool>;

    async fn health_check(&self) -> Result<()>;
}

/// Postgres-backed store
#[derive(Debug, Clone)]
pub struct PgMaintenanceStore {
    db: DatabaseConnection,
}

impl PgMaintenanceStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn elapsed_ms(start: Instant) -> Option<u64> {
    Some(start.elapsed().as_millis() as u64)
}

#[async_trait]
impl MaintenanceStore for PgMaintenanceStore {
    async fn create_orchestration_run(&self, total_jobs: i32) -> Result<OrchestrationRun> {
        let start = Instant::now();
        let run = OrchestrationRun::insert(self.db.pool(), &OrchestrationRun::started(total_jobs))
            .await?;
        log_database_operation(
            "insert",
            Some("maintenance_orchestration_runs"),
            Some(&run.id.to_string()),
            "success",
            elapsed_ms(start),
            None,
        );
        Ok(run)
    }

    async fn finalize_orchestration_run(
        &self,
        id: Uuid,
        finalization: RunFinalization,
    ) -> Result<OrchestrationRun> {
        let start = Instant::now();
        let run = OrchestrationRun::finalize_in_db(self.db.pool(), id, &finalization)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => {
                    MaintenanceError::NotFound(format!("orchestration run {id}"))
                }
                other => other.into(),
            })?;
        log_database_operation(
            "finalize",
            Some("maintenance_orchestration_runs"),
            Some(&id.to_string()),
            run.status.as_str(),
            elapsed_ms(start),
            None,
        );
        Ok(run)
    }

    async fn get_orchestration_run(&self, id: Uuid) -> Result<Option<OrchestrationRun>> {
        Ok(OrchestrationRun::find_by_id(self.db.pool(), id).await?)
    }

    async fn list_orchestration_runs(&self, limit: i64) -> Result<Vec<OrchestrationRun>> {
        Ok(OrchestrationRun::list_recent(self.db.pool(), limit).await?)
    }

    async fn create_job_execution(
        &self,
        orchestration_id: Option<Uuid>,
        job: JobName,
    ) -> Result<JobExecution> {
        let start = Instant::now();
        let execution =
            JobExecution::insert(self.db.pool(), &JobExecution::started(orchestration_id, job))
                .await?;
        log_database_operation(
            "insert",
            Some("maintenance_job_executions"),
            Some(&execution.id.to_string()),
            "success",
            elapsed_ms(start),
            Some(job.as_str()),
        );
        Ok(execution)
    }

    async fn finish_job_execution(
        &self,
        id: Uuid,
        outcome: JobExecutionOutcome,
    ) -> Result<JobExecution> {
        let start = Instant::now();
        let execution = JobExecution::finish_in_db(self.db.pool(), id, &outcome)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => MaintenanceError::NotFound(format!("job execution {id}")),
                other => other.into(),
            })?;
        log_database_operation(
            "finish",
            Some("maintenance_job_executions"),
            Some(&id.to_string()),
            execution.status.as_str(),
            elapsed_ms(start),
            None,
        );
        Ok(execution)
    }

    async fn list_job_executions(&self, orchestration_id: Uuid) -> Result<Vec<JobExecution>> {
        Ok(JobExecution::list_for_orchestration(self.db.pool(), orchestration_id).await?)
    }

    async fn record_analysis_result(&self, result: AnalysisResult) -> Result<AnalysisResult> {
        let start = Instant::now();
        let stored = AnalysisResult::insert(self.db.pool(), &result).await?;
        log_database_operation(
            "insert",
            Some("maintenance_analysis_results"),
            Some(&stored.id.to_string()),
            "success",
            elapsed_ms(start),
            Some(stored.analysis_type.as_str()),
        );
        Ok(stored)
    }

    async fn list_analysis_results(&self, job_execution_id: Uuid) -> Result<Vec<AnalysisResult>> {
        Ok(AnalysisResult::find_by_job_execution(self.db.pool(), job_execution_id).await?)
    }

    async fn save_article(&self, article: GeneratedArticle) -> Result<GeneratedArticle> {
        let start = Instant::now();
        let stored = GeneratedArticle::insert(self.db.pool(), &article).await?;
        log_database_operation(
            "insert",
            Some("maintenance_generated_articles"),
            Some(&stored.id.to_string()),
            "success",
            elapsed_ms(start),
            Some(stored.slug.as_str()),
        );
        Ok(stored)
    }

    async fn article_slug_exists(&self, slug: &str) -> Result<bool> {
        Ok(GeneratedArticle::slug_exists(self.db.pool(), slug).await?)
    }

    async fn health_check(&self) -> Result<()> {
        if self.db.health_check().await? {
            Ok(())
        } else {
            Err(MaintenanceError::Database(
                "health check returned unexpected value".to_string(),
            ))
        }
    }
}
