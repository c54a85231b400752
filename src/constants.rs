//! # System Constants
//!
//! Job names, execution states and the fixed defaults that define the
//! maintenance pipeline's operational boundaries.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The four maintenance jobs, in the order the orchestrator runs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobName {
    AutomatedArticleGeneration,
    WebsiteCrawlingAnalysis,
    UpdateKnowledgeBase,
    SeoOptimization,
}

impl JobName {
    /// Fixed execution order of a maintenance run
    pub const SEQUENCE: [JobName; 4] = [
        JobName::AutomatedArticleGeneration,
        JobName::WebsiteCrawlingAnalysis,
        JobName::UpdateKnowledgeBase,
        JobName::SeoOptimization,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AutomatedArticleGeneration => "automated-article-generation",
            Self::WebsiteCrawlingAnalysis => "website-crawling-analysis",
            Self::UpdateKnowledgeBase => "update-knowledge-base",
            Self::SeoOptimization => "seo-optimization",
        }
    }

    /// Endpoint path used for sibling calls and route registration
    pub fn endpoint_path(&self) -> String {
        format!("/api/cron/{}", self.as_str())
    }
}

impl fmt::Display for JobName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for JobName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "automated-article-generation" => Ok(Self::AutomatedArticleGeneration),
            "website-crawling-analysis" => Ok(Self::WebsiteCrawlingAnalysis),
            "update-knowledge-base" => Ok(Self::UpdateKnowledgeBase),
            "seo-optimization" => Ok(Self::SeoOptimization),
            _ => Err(format!("Unknown maintenance job: {s}")),
        }
    }
}

/// Lifecycle state shared by orchestration runs and job executions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Running,
    Completed,
    Failed,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExecutionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(Self::Running),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("Invalid execution status: {s}")),
        }
    }
}

/// Analysis type tags written to `maintenance_analysis_results`
pub mod analysis_types {
    pub const WEBSITE_CRAWL: &str = "website_crawl";
    pub const SEO: &str = "seo";
}

/// System-wide defaults
pub mod system {
    /// Path of the orchestrator trigger endpoint
    pub const ORCHESTRATE_ENDPOINT: &str = "/api/cron/orchestrate-maintenance";

    /// Default pause between jobs of one run
    pub const DEFAULT_INTER_JOB_DELAY_MS: u64 = 5_000;

    /// Default pause between crawl targets
    pub const DEFAULT_INTER_TARGET_DELAY_MS: u64 = 2_000;

    /// Recommendation attached to a crawl that had failing targets
    pub const CRAWL_FAILURE_RECOMMENDATION: &str =
        "Investigate the pages that failed to load and fix broken routes or server errors to keep the site crawlable";

    /// Pages crawled when no explicit list is configured
    pub const DEFAULT_CRAWL_PATHS: [&str; 5] = ["/", "/services", "/blog", "/gallery", "/contact"];

    pub const USER_AGENT: &str = concat!("maintenance-core/", env!("CARGO_PKG_VERSION"));
}
