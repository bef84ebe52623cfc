//! Admin handlers. All routes here sit behind the curator middleware.

use axum::extract::State;

use crate::api::dto::{BulkPurgeResponse, BulkSeedRequest, BulkSeedResponse, IndexRepairResponse};
use crate::api::response::{ApiError, ApiResponse};
use crate::api::AppState;

const DEFAULT_SEED_COUNT: u32 = 25;
const MAX_SEED_COUNT: u32 = 500;

/// `POST /api/admin/bulk-memories`
#[utoipa::path(
    post,
    path = "/api/admin/bulk-memories",
    tag = "admin",
    operation_id = "admin.bulkSeed",
    request_body = BulkSeedRequest,
    responses(
        (status = 201, description = "Test data created", body = BulkSeedResponse),
        (status = 401, description = "Curator session required", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn bulk_seed(
    State(state): State<AppState>,
    body: Option<axum::Json<BulkSeedRequest>>,
) -> ApiResponse<BulkSeedResponse> {
    let count = body
        .and_then(|b| b.0.count)
        .unwrap_or(DEFAULT_SEED_COUNT)
        .clamp(1, MAX_SEED_COUNT);

    match state.seeder.seed(count).await {
        Ok(ids) => ApiResponse::created(BulkSeedResponse {
            created: ids.len() as u32,
            ids,
        }),
        Err(e) => e.into(),
    }
}

/// `DELETE /api/admin/bulk-memories`
#[utoipa::path(
    delete,
    path = "/api/admin/bulk-memories",
    tag = "admin",
    operation_id = "admin.bulkPurge",
    responses(
        (status = 200, description = "Seeded data purged", body = BulkPurgeResponse),
        (status = 401, description = "Curator session required", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn bulk_purge(State(state): State<AppState>) -> ApiResponse<BulkPurgeResponse> {
    match state.seeder.purge().await {
        Ok(deleted) => ApiResponse::success(BulkPurgeResponse { deleted }),
        Err(e) => e.into(),
    }
}

/// `POST /api/admin/index:repair`
#[utoipa::path(
    post,
    path = "/api/admin/index:repair",
    tag = "admin",
    operation_id = "admin.repairIndex",
    responses(
        (status = 200, description = "Repair pass completed", body = IndexRepairResponse),
        (status = 401, description = "Curator session required", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn repair_index(State(state): State<AppState>) -> ApiResponse<IndexRepairResponse> {
    match state.janitor.run_once().await {
        Ok(report) => ApiResponse::success(IndexRepairResponse {
            scanned: report.scanned,
            repaired: report.repaired,
        }),
        Err(e) => e.into(),
    }
}
