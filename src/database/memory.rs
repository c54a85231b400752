use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::constants::JobName;
use crate::database::MaintenanceStore;
use crate::error::{MaintenanceError, Result};
use crate::models::{
    AnalysisResult, GeneratedArticle, JobExecution, JobExecutionOutcome, OrchestrationRun,
    RunFinalization,
};

#[derive(Debug, Default)]
struct Tables {
    runs: Vec<OrchestrationRun>,
    executions: Vec<JobExecution>,
    analysis_results: Vec<AnalysisResult>,
    articles: Vec<GeneratedArticle>,
}

/// Process-local store with the same constraints as the Postgres schema.
///
/// Rows are kept in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn runs(&self) -> Vec<OrchestrationRun> {
        self.tables.lock().runs.clone()
    }

    pub fn job_executions(&self) -> Vec<JobExecution> {
        self.tables.lock().executions.clone()
    }

    pub fn analysis_results(&self) -> Vec<AnalysisResult> {
        self.tables.lock().analysis_results.clone()
    }

    pub fn articles(&self) -> Vec<GeneratedArticle> {
        self.tables.lock().articles.clone()
    }
}

#[async_trait]
impl MaintenanceStore for InMemoryStore {
    async fn create_orchestration_run(&self, total_jobs: i32) -> Result<OrchestrationRun> {
        let run = OrchestrationRun::started(total_jobs);
        self.tables.lock().runs.push(run.clone());
        Ok(run)
    }

    async fn finalize_orchestration_run(
        &self,
        id: Uuid,
        finalization: RunFinalization,
    ) -> Result<OrchestrationRun> {
        let mut tables = self.tables.lock();
        let run = tables
            .runs
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| MaintenanceError::NotFound(format!("orchestration run {id}")))?;
        run.finalize(&finalization, Utc::now());
        Ok(run.clone())
    }

    async fn get_orchestration_run(&self, id: Uuid) -> Result<Option<OrchestrationRun>> {
        Ok(self.tables.lock().runs.iter().find(|r| r.id == id).cloned())
    }

    async fn list_orchestration_runs(&self, limit: i64) -> Result<Vec<OrchestrationRun>> {
        let tables = self.tables.lock();
        let mut runs = tables.runs.clone();
        runs.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        runs.truncate(limit.max(0) as usize);
        Ok(runs)
    }

    async fn create_job_execution(
        &self,
        orchestration_id: Option<Uuid>,
        job: JobName,
    ) -> Result<JobExecution> {
        let mut tables = self.tables.lock();
        if let Some(id) = orchestration_id {
            if !tables.runs.iter().any(|r| r.id == id) {
                return Err(MaintenanceError::Database(format!(
                    "foreign key violation: orchestration run {id} does not exist"
                )));
            }
        }
        let execution = JobExecution::started(orchestration_id, job);
        tables.executions.push(execution.clone());
        Ok(execution)
    }

    async fn finish_job_execution(
        &self,
        id: Uuid,
        outcome: JobExecutionOutcome,
    ) -> Result<JobExecution> {
        let mut tables = self.tables.lock();
        let execution = tables
            .executions
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| MaintenanceError::NotFound(format!("job execution {id}")))?;
        execution.finish(&outcome, Utc::now());
        Ok(execution.clone())
    }

    async fn list_job_executions(&self, orchestration_id: Uuid) -> Result<Vec<JobExecution>> {
        Ok(self
            .tables
            .lock()
            .executions
            .iter()
            .filter(|e| e.orchestration_id == Some(orchestration_id))
            .cloned()
            .collect())
    }

    async fn record_analysis_result(&self, result: AnalysisResult) -> Result<AnalysisResult> {
        let mut tables = self.tables.lock();
        if !tables.executions.iter().any(|e| e.id == result.job_execution_id) {
            return Err(MaintenanceError::Database(format!(
                "foreign key violation: job execution {} does not exist",
                result.job_execution_id
            )));
        }
        tables.analysis_results.push(result.clone());
        Ok(result)
    }

    async fn list_analysis_results(&self, job_execution_id: Uuid) -> Result<Vec<AnalysisResult>> {
        Ok(self
            .tables
            .lock()
            .analysis_results
            .iter()
            .filter(|r| r.job_execution_id == job_execution_id)
            .cloned()
            .collect())
    }

    async fn save_article(&self, article: GeneratedArticle) -> Result<GeneratedArticle> {
        let mut tables = self.tables.lock();
        if tables.articles.iter().any(|a| a.slug == article.slug) {
            return Err(MaintenanceError::Conflict(format!(
                "slug '{}' already exists",
                article.slug
            )));
        }
        tables.articles.push(article.clone());
        Ok(article)
    }

    async fn article_slug_exists(&self, slug: &str) -> Result<bool> {
        Ok(self.tables.lock().articles.iter().any(|a| a.slug == slug))
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
