//! # Job Execution Model
//!
//! One row per invocation of a single maintenance job. The row is linked to
//! an orchestration run when the job was started by the orchestrator and is
//! standalone (`orchestration_id IS NULL`) when its endpoint was called
//! directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::constants::{ExecutionStatus, JobName};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct JobExecution {
    pub id: Uuid,
    pub orchestration_id: Option<Uuid>,
    pub job_name: String,
    pub status: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub result: Option<serde_json::Value>,
    pub error_message: Option<String>,
}

/// Terminal outcome of a job execution
#[derive(Debug, Clone, PartialEq)]
pub enum JobExecutionOutcome {
    Completed(serde_json::Value),
    Failed(String),
}

impl JobExecutionOutcome {
    pub fn status(&self) -> ExecutionStatus {
        match self {
            Self::Completed(_) => ExecutionStatus::Completed,
            Self::Failed(_) => ExecutionStatus::Failed,
        }
    }
}

const COLUMNS: &str =
    "id, orchestration_id, job_name, status, started_at, completed_at, result, error_message";

impl JobExecution {
    pub fn started(orchestration_id: Option<Uuid>, job: JobName) -> Self {
        Self {
            id: Uuid::new_v4(),
            orchestration_id,
            job_name: job.to_string(),
            status: ExecutionStatus::Running.to_string(),
            started_at: Utc::now(),
            completed_at: None,
            result: None,
            error_message: None,
        }
    }

    pub fn status(&self) -> Option<ExecutionStatus> {
        self.status.parse().ok()
    }

    pub fn job(&self) -> Option<JobName> {
        self.job_name.parse().ok()
    }

    pub fn finish(&mut self, outcome: &JobExecutionOutcome, at: DateTime<Utc>) {
        self.status = outcome.status().to_string();
        match outcome {
            JobExecutionOutcome::Completed(result) => self.result = Some(result.clone()),
            JobExecutionOutcome::Failed(error) => self.error_message = Some(error.clone()),
        }
        self.completed_at = Some(at.max(self.started_at));
    }

    pub async fn insert(pool: &PgPool, execution: &JobExecution) -> Result<JobExecution, sqlx::Error> {
        sqlx::query_as::<_, JobExecution>(&format!(
            r#"
            INSERT INTO maintenance_job_executions (id, orchestration_id, job_name, status, started_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(execution.id)
        .bind(execution.orchestration_id)
        .bind(&execution.job_name)
        .bind(&execution.status)
        .bind(execution.started_at)
        .fetch_one(pool)
        .await
    }

    pub async fn finish_in_db(
        pool: &PgPool,
        id: Uuid,
        outcome: &JobExecutionOutcome,
    ) -> Result<JobExecution, sqlx::Error> {
        let (result, error) = match outcome {
            JobExecutionOutcome::Completed(result) => (Some(result.clone()), None),
            JobExecutionOutcome::Failed(error) => (None, Some(error.clone())),
        };

        sqlx::query_as::<_, JobExecution>(&format!(
            r#"
            UPDATE maintenance_job_executions
            SET status = $2,
                result = $3,
                error_message = $4,
                completed_at = GREATEST(NOW(), started_at)
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(outcome.status().as_str())
        .bind(result)
        .bind(error)
        .fetch_one(pool)
        .await
    }

    pub async fn list_for_orchestration(
        pool: &PgPool,
        orchestration_id: Uuid,
    ) -> Result<Vec<JobExecution>, sqlx::Error> {
        sqlx::query_as::<_, JobExecution>(&format!(
            r#"
            SELECT {COLUMNS} FROM maintenance_job_executions
            WHERE orchestration_id = $1
            ORDER BY started_at ASC
            "#
        ))
        .bind(orchestration_id)
        .fetch_all(pool)
        .await
    }
}
