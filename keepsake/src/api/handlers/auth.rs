//! Curator session handler.

use axum::extract::State;

use crate::api::dto::{CreateSessionRequest, SessionResponse};
use crate::api::response::{ApiError, ApiResponse, ErrorCode};
use crate::api::AppState;

/// `POST /api/auth/session`
///
/// Exchanges a curator password for an expiring bearer token. The password
/// check and every later authorization decision happen server-side.
#[utoipa::path(
    post,
    path = "/api/auth/session",
    tag = "auth",
    operation_id = "auth.createSession",
    request_body = CreateSessionRequest,
    responses(
        (status = 201, description = "Session created", body = SessionResponse),
        (status = 401, description = "Wrong password or curator mode unconfigured", body = ApiError),
    )
)]
pub async fn create_session(
    State(state): State<AppState>,
    axum::Json(req): axum::Json<CreateSessionRequest>,
) -> ApiResponse<SessionResponse> {
    if req.password.is_empty() {
        return ApiResponse::error(ErrorCode::InvalidRequest, "Password cannot be empty");
    }

    if !state.auth.is_configured() {
        return ApiResponse::error(
            ErrorCode::Unauthorized,
            "Curator mode is not configured. Set KEEPSAKE_CURATOR_PASSWORDS to enable it.",
        );
    }

    match state.auth.login(&req.password) {
        Some(session) => ApiResponse::created(SessionResponse::from(session)),
        None => ApiResponse::error(ErrorCode::Unauthorized, "Invalid curator password"),
    }
}
