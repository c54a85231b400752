//! # Web API Module
//!
//! Axum HTTP surface of the maintenance service: the orchestrator trigger,
//! the four job endpoints, run history views and health probes.
//!
//! ## Core Components
//!
//! - [`routes`] - route table
//! - [`handlers`] - request handlers
//! - [`middleware`] - bearer authentication and the shared layer stack
//! - [`state`] - shared application state
//! - [`errors`] - API error type and its JSON rendering

pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::Router;
use std::time::Duration;

pub use errors::{ApiError, ApiResult};
pub use state::AppState;

/// Create the Axum application with all routes and middleware
pub fn create_app(app_state: AppState) -> Router {
    let request_timeout = Duration::from_millis(app_state.config.server.request_timeout_ms);

    let protected_routes = routes::internal_routes().layer(
        axum::middleware::from_fn_with_state(
            app_state.clone(),
            middleware::auth::require_internal_api_key,
        ),
    );

    let router = Router::new()
        .merge(routes::health_routes())
        .merge(protected_routes)
        .with_state(app_state);

    middleware::apply_middleware_stack(router, request_timeout)
}
