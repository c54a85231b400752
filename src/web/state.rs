//! # Web API Application State
//!
//! Shared handles cloned into every request: configuration, the store, the
//! orchestrator and the in-process job runner.

use std::sync::Arc;

use crate::config::MaintenanceConfig;
use crate::database::MaintenanceStore;
use crate::jobs::JobRunner;
use crate::orchestration::MaintenanceOrchestrator;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<MaintenanceConfig>,
    pub store: Arc<dyn MaintenanceStore>,
    pub orchestrator: Arc<MaintenanceOrchestrator>,
    pub job_runner: Arc<JobRunner>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("orchestrator", &self.orchestrator)
            .field("job_runner", &self.job_runner)
            .finish()
    }
}

impl AppState {
    /// The shared secret expected in `Authorization: Bearer ...`
    pub fn internal_api_key(&self) -> &str {
        &self.config.auth.internal_api_key
    }
}
