//! Service-token authentication middleware.
//!
//! The API is consumed by trusted frontends, not browsers; callers present a
//! shared bearer token (`SHIPLANE_SERVICE_TOKEN`). End-user sessions are the
//! frontend's concern. The payment webhook is mounted outside this layer
//! because it authenticates via its HMAC signature instead.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use secrecy::ExposeSecret;

use crate::error::AppError;
use crate::payments::constant_time_compare;
use crate::state::AppState;

/// Middleware requiring `Authorization: Bearer <service token>`.
///
/// # Errors
///
/// Returns `AppError::Unauthorized` if the header is missing, malformed, or
/// the token does not match.
pub async fn require_service_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("missing authorization header".to_string()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("expected bearer token".to_string()))?;

    let expected = state.config().service_token.expose_secret();
    if !constant_time_compare(token.as_bytes(), expected.as_bytes()) {
        return Err(AppError::Unauthorized("invalid service token".to_string()));
    }

    Ok(next.run(request).await)
}
