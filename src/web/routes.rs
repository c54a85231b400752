//! # Web API Route Definitions

use axum::body::Bytes;
use axum::extract::State;
use axum::routing::{get, post};
use axum::Router;

use crate::constants::{system, JobName};
use crate::web::handlers;
use crate::web::state::AppState;

/// Internal endpoints, all behind the bearer gate
///
/// - `POST /api/cron/orchestrate-maintenance`
/// - `POST /api/cron/{job}` for each of the four jobs
/// - `GET /api/orchestrations`, `GET /api/orchestrations/:id`
pub fn internal_routes() -> Router<AppState> {
    let mut router = Router::new()
        .route(
            system::ORCHESTRATE_ENDPOINT,
            post(handlers::orchestration::trigger_orchestration),
        )
        .route(
            "/api/orchestrations",
            get(handlers::orchestration::list_orchestrations),
        )
        .route(
            "/api/orchestrations/:id",
            get(handlers::orchestration::get_orchestration),
        );

    for job in JobName::SEQUENCE {
        router = router.route(
            &job.endpoint_path(),
            post(move |State(state): State<AppState>, body: Bytes| async move {
                handlers::jobs::run_job(state, job, body).await
            }),
        );
    }

    router
}

/// Probe endpoints, never authenticated
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::basic_health))
        .route("/ready", get(handlers::health::readiness_probe))
}
