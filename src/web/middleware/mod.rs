//! # Web API Middleware
//!
//! Bearer authentication for the internal endpoints plus the shared layer
//! stack (tracing, CORS, request timeout).

pub mod auth;

use axum::Router;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Apply the middleware stack shared by every route
///
/// Order, outermost first: request tracing, CORS, request timeout (408).
pub fn apply_middleware_stack(router: Router, request_timeout: Duration) -> Router {
    router
        .layer(TimeoutLayer::new(request_timeout))
        .layer(create_cors_layer())
        .layer(TraceLayer::new_for_http())
}

fn create_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}
