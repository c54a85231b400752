//! # Web API Handlers
//!
//! - [`orchestration`] - maintenance trigger and run history
//! - [`jobs`] - the per-job endpoints
//! - [`health`] - liveness and readiness probes

pub mod health;
pub mod jobs;
pub mod orchestration;
