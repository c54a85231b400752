//! # Authentication Middleware
//!
//! Bearer-credential gate for the internal `/api` endpoints. The token must
//! equal the configured `INTERNAL_API_KEY`; the request is rejected before any
//! handler runs, so a refused call writes no records.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, warn};

use crate::web::errors::ApiError;
use crate::web::state::AppState;

pub async fn require_internal_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let expected = state.internal_api_key();
    if expected.is_empty() {
        warn!("INTERNAL_API_KEY is not configured; rejecting internal request");
        return Err(ApiError::Unauthorized);
    }

    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(extract_bearer_token);

    match token {
        Some(token) if constant_time_eq(token.as_bytes(), expected.as_bytes()) => {
            debug!(path = %request.uri().path(), "Internal request authenticated");
            Ok(next.run(request).await)
        }
        Some(_) => {
            warn!(path = %request.uri().path(), "Rejected request with wrong bearer token");
            Err(ApiError::Unauthorized)
        }
        None => {
            warn!(path = %request.uri().path(), "Rejected request without bearer token");
            Err(ApiError::Unauthorized)
        }
    }
}

/// Token part of a `Bearer <token>` header value
fn extract_bearer_token(header: &str) -> Option<&str> {
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
