//! # Data Layer
//!
//! Row types for the maintenance tables, each with the SQL used to persist it.

pub mod analysis_result;
pub mod generated_article;
pub mod job_execution;
pub mod orchestration_run;

pub use analysis_result::{AnalysisResult, NewAnalysisResult};
pub use generated_article::GeneratedArticle;
pub use job_execution::{JobExecution, JobExecutionOutcome};
pub use orchestration_run::{OrchestrationRun, RunFinalization};
