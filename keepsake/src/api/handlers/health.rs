use axum::extract::State;
use serde::Serialize;

use crate::api::response::ApiResponse;
use crate::api::state::AppState;

/// Health data returned inside the envelope.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub blob: BlobStatus,
    pub cdn: CdnStatus,
    pub verification: VerificationStatus,
    pub curator: CuratorStatus,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct BlobStatus {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct CdnStatus {
    /// Whether destroy credentials are configured. Delivery URLs work
    /// either way.
    pub configured: bool,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct VerificationStatus {
    /// `"enforced"` with a secret configured, `"pass-open"` without.
    pub mode: String,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct CuratorStatus {
    pub configured: bool,
}

/// `GET /api/health`
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses(
        (status = 200, description = "Service health status", body = HealthData),
    )
)]
pub async fn health_check(State(state): State<AppState>) -> ApiResponse<HealthData> {
    let blob_status = match state.blob.list("health/", None).await {
        Ok(_) => BlobStatus {
            status: "ok".to_string(),
        },
        Err(_) => BlobStatus {
            status: "error".to_string(),
        },
    };

    let verification_mode = if state.verifier.is_configured() {
        "enforced"
    } else {
        "pass-open"
    };

    ApiResponse::success(HealthData {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        blob: blob_status,
        cdn: CdnStatus {
            configured: state.cdn.is_configured(),
        },
        verification: VerificationStatus {
            mode: verification_mode.to_string(),
        },
        curator: CuratorStatus {
            configured: state.auth.is_configured(),
        },
    })
}
