//! # Orchestration Engine
//!
//! Runs the maintenance jobs as one sequential chain and records the run.
//!
//! ## Core Components
//!
//! - [`orchestrator::MaintenanceOrchestrator`] - the run loop: create the run
//!   record, invoke each job in order with a pause in between, apply the
//!   failure policy, finalise the run
//! - [`job_client`] - how a job is reached (HTTP endpoint or in process)
//! - [`pacing::Pacer`] - configurable delay between consecutive calls
//! - [`types`] - failure policy, dispatch mode and run outcome types
//!
//! Jobs never run concurrently within one run. Two runs triggered at the same
//! time are not excluded from each other; each writes its own records.

pub mod job_client;
pub mod orchestrator;
pub mod pacing;
pub mod types;

pub use job_client::{HttpJobInvoker, JobInvoker, LocalJobInvoker};
pub use orchestrator::MaintenanceOrchestrator;
pub use pacing::Pacer;
pub use types::{
    DispatchMode, FailurePolicy, JobCallReply, JobResult, OrchestrationOutcome,
    OrchestrationSummary,
};
