//! # Orchestration Run Model
//!
//! One row per invocation of the maintenance sequence.
//!
//! ## Lifecycle
//!
//! A run is inserted as `running` when the orchestrator starts and updated
//! exactly once when the sequence ends. Runs are never deleted here.
//!
//! ## Database Schema
//!
//! Maps to `maintenance_orchestration_runs`:
//! ```sql
//! CREATE TABLE maintenance_orchestration_runs (
//!   id UUID PRIMARY KEY,
//!   status TEXT NOT NULL,
//!   started_at TIMESTAMPTZ NOT NULL,
//!   completed_at TIMESTAMPTZ,
//!   total_jobs INTEGER NOT NULL,
//!   completed_jobs INTEGER NOT NULL DEFAULT 0,
//!   failed_jobs INTEGER NOT NULL DEFAULT 0,
//!   error_message TEXT
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::constants::ExecutionStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrchestrationRun {
    pub id: Uuid,
    pub status: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub total_jobs: i32,
    pub completed_jobs: i32,
    pub failed_jobs: i32,
    pub error_message: Option<String>,
}

/// Final tallies written when a run ends
#[derive(Debug, Clone, PartialEq)]
pub struct RunFinalization {
    pub status: ExecutionStatus,
    pub completed_jobs: i32,
    pub failed_jobs: i32,
    pub error_message: Option<String>,
}

const COLUMNS: &str =
    "id, status, started_at, completed_at, total_jobs, completed_jobs, failed_jobs, error_message";

impl OrchestrationRun {
    /// Build the in-memory representation of a freshly started run
    pub fn started(total_jobs: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            status: ExecutionStatus::Running.to_string(),
            started_at: Utc::now(),
            completed_at: None,
            total_jobs,
            completed_jobs: 0,
            failed_jobs: 0,
            error_message: None,
        }
    }

    pub fn status(&self) -> Option<ExecutionStatus> {
        self.status.parse().ok()
    }

    /// Apply final tallies; the end time never precedes the start time
    pub fn finalize(&mut self, finalization: &RunFinalization, at: DateTime<Utc>) {
        self.status = finalization.status.to_string();
        self.completed_jobs = finalization.completed_jobs;
        self.failed_jobs = finalization.failed_jobs;
        self.error_message = finalization.error_message.clone();
        self.completed_at = Some(at.max(self.started_at));
    }

    pub async fn insert(pool: &PgPool, run: &OrchestrationRun) -> Result<OrchestrationRun, sqlx::Error> {
        sqlx::query_as::<_, OrchestrationRun>(&format!(
            r#"
            INSERT INTO maintenance_orchestration_runs
                (id, status, started_at, total_jobs, completed_jobs, failed_jobs)
            VALUES ($1, $2, $3, $4, 0, 0)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(run.id)
        .bind(&run.status)
        .bind(run.started_at)
        .bind(run.total_jobs)
        .fetch_one(pool)
        .await
    }

    pub async fn finalize_in_db(
        pool: &PgPool,
        id: Uuid,
        finalization: &RunFinalization,
    ) -> Result<OrchestrationRun, sqlx::Error> {
        sqlx::query_as::<_, OrchestrationRun>(&format!(
            r#"
            UPDATE maintenance_orchestration_runs
            SET status = $2,
                completed_jobs = $3,
                failed_jobs = $4,
                error_message = $5,
                completed_at = GREATEST(NOW(), started_at)
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(finalization.status.as_str())
        .bind(finalization.completed_jobs)
        .bind(finalization.failed_jobs)
        .bind(&finalization.error_message)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<OrchestrationRun>, sqlx::Error> {
        sqlx::query_as::<_, OrchestrationRun>(&format!(
            "SELECT {COLUMNS} FROM maintenance_orchestration_runs WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<OrchestrationRun>, sqlx::Error> {
        sqlx::query_as::<_, OrchestrationRun>(&format!(
            "SELECT {COLUMNS} FROM maintenance_orchestration_runs ORDER BY started_at DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_finalize_never_moves_end_before_start() {
        let mut run = OrchestrationRun::started(4);
        let earlier = run.started_at - Duration::seconds(30);

        run.finalize(
            &RunFinalization {
                status: ExecutionStatus::Failed,
                completed_jobs: 3,
                failed_jobs: 1,
                error_message: None,
            },
            earlier,
        );

        assert_eq!(run.completed_at, Some(run.started_at));
        assert_eq!(run.status(), Some(ExecutionStatus::Failed));
        assert_eq!(run.completed_jobs + run.failed_jobs, 4);
    }
}
