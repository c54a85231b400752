//! # Analysis Result Model
//!
//! Write-once snapshot produced by the crawl and SEO jobs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub id: Uuid,
    pub url: String,
    pub analysis_type: String,
    pub score: i32,
    pub issues: serde_json::Value,
    pub recommendations: serde_json::Value,
    pub raw_data: serde_json::Value,
    pub job_execution_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Analysis produced by a job, before it is bound to its execution
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAnalysisResult {
    pub url: String,
    pub analysis_type: String,
    /// 0..=100
    pub score: i32,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
    pub raw_data: serde_json::Value,
}

impl AnalysisResult {
    pub fn from_new(new: NewAnalysisResult, job_execution_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            url: new.url,
            analysis_type: new.analysis_type,
            score: new.score.clamp(0, 100),
            issues: serde_json::json!(new.issues),
            recommendations: serde_json::json!(new.recommendations),
            raw_data: new.raw_data,
            job_execution_id,
            created_at: Utc::now(),
        }
    }

    pub async fn insert(pool: &PgPool, result: &AnalysisResult) -> Result<AnalysisResult, sqlx::Error> {
        sqlx::query_as::<_, AnalysisResult>(
            r#"
            INSERT INTO maintenance_analysis_results
                (id, url, analysis_type, score, issues, recommendations, raw_data, job_execution_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, url, analysis_type, score, issues, recommendations, raw_data, job_execution_id, created_at
            "#,
        )
        .bind(result.id)
        .bind(&result.url)
        .bind(&result.analysis_type)
        .bind(result.score)
        .bind(&result.issues)
        .bind(&result.recommendations)
        .bind(&result.raw_data)
        .bind(result.job_execution_id)
        .bind(result.created_at)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_job_execution(
        pool: &PgPool,
        job_execution_id: Uuid,
    ) -> Result<Vec<AnalysisResult>, sqlx::Error> {
        sqlx::query_as::<_, AnalysisResult>(
            r#"
            SELECT id, url, analysis_type, score, issues, recommendations, raw_data, job_execution_id, created_at
            FROM maintenance_analysis_results
            WHERE job_execution_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(job_execution_id)
        .fetch_all(pool)
        .await
    }
}
