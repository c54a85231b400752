//! # Maintenance Jobs
//!
//! The four units of work run by the orchestrator. Every job implements
//! [`MaintenanceJob`]; the [`runner::JobRunner`] wraps each invocation with
//! the job-execution bookkeeping (create `running`, finish `completed` with a
//! result payload or `failed` with an error string).
//!
//! ## Jobs
//!
//! - [`article_generation`] - writes one blog article through a [`content::ContentGenerator`]
//! - [`website_crawl`] - sequential crawl of the fixed site pages with a reachability score
//! - [`knowledge_base`] - placeholder statistics over local blog metadata
//! - [`seo_optimization`] - on-page SEO heuristics over the main pages

pub mod article_generation;
pub mod content;
pub mod fetcher;
pub mod html;
pub mod knowledge_base;
pub mod runner;
pub mod seo_optimization;
pub mod website_crawl;

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::constants::JobName;
use crate::database::MaintenanceStore;
use crate::error::Result;

pub use runner::{JobRegistry, JobRunOutcome, JobRunner};

/// Handles available to a job while it runs
#[derive(Clone)]
pub struct JobContext {
    pub job_execution_id: Uuid,
    pub orchestration_id: Option<Uuid>,
    pub store: Arc<dyn MaintenanceStore>,
}

impl std::fmt::Debug for JobContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobContext")
            .field("job_execution_id", &self.job_execution_id)
            .field("orchestration_id", &self.orchestration_id)
            .finish()
    }
}

#[async_trait]
pub trait MaintenanceJob: Send + Sync {
    fn name(&self) -> JobName;

    /// Perform the unit of work and return the result payload.
    ///
    /// The payload must be a JSON object; its fields are also merged into the
    /// job endpoint's response body.
    async fn execute(&self, ctx: &JobContext) -> Result<serde_json::Value>;
}
