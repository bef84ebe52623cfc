//! # Curator Authentication Middleware
//!
//! Protects the `/api/admin/*` routes with Bearer token authentication.
//! Tokens are curator sessions minted by `POST /api/auth/session` and
//! validated server-side; errors conform to the envelope contract.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::api::state::AppState;

use super::response::{ApiResponse, ErrorCode};

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

/// Axum middleware that enforces curator sessions on admin routes.
///
/// # Behavior
///
/// - If no curator passwords are configured → 401. The server still
///   starts, but admin routes are locked down.
/// - If the `Authorization: Bearer <token>` header is missing or
///   malformed → 401.
/// - If the token is not a live curator session → 401.
/// - Otherwise the request passes through to the handler.
pub async fn curator_auth_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !state.auth.is_configured() {
        return ApiResponse::<()>::error(
            ErrorCode::Unauthorized,
            "Curator mode is not configured. Set KEEPSAKE_CURATOR_PASSWORDS to enable it.",
        )
        .into_response();
    }

    let Some(token) = bearer_token(request.headers()) else {
        return ApiResponse::<()>::error(
            ErrorCode::Unauthorized,
            "Missing or malformed authorization header. Expected: Bearer <token>",
        )
        .into_response();
    };

    if state.auth.validate(token) {
        next.run(request).await
    } else {
        ApiResponse::<()>::error(ErrorCode::Unauthorized, "Invalid or expired session token")
            .into_response()
    }
}
