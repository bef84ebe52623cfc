use axum::Json;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use super::dto;
use super::handlers;
use super::response;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Keepsake API",
        version = "0.1.0",
        description = "Memorial tribute service. Visitors share memories and photos; curators moderate.",
    ),
    paths(
        handlers::health::health_check,
        handlers::memories::create_memory,
        handlers::memories::get_memory,
        handlers::memories::update_memory,
        handlers::memories::delete_memory,
        handlers::memories::list_memories,
        handlers::auth::create_session,
        handlers::admin::bulk_seed,
        handlers::admin::bulk_purge,
        handlers::admin::repair_index,
    ),
    components(schemas(
        // Response envelope
        response::ErrorCode,
        response::ApiError,
        response::ResponseMeta,
        // Memories
        dto::memories::PhotoInputDto,
        dto::memories::CreateMemoryRequest,
        dto::memories::UpdateMemoryRequest,
        dto::memories::DeleteMemoryRequest,
        dto::memories::CreateMemoryResponse,
        dto::memories::PhotoResponse,
        dto::memories::MemoryResponse,
        dto::memories::MemorySummaryResponse,
        dto::memories::ListMemoriesResponse,
        dto::memories::DeleteMemoryResponse,
        // Auth
        dto::auth::CreateSessionRequest,
        dto::auth::SessionResponse,
        // Admin
        dto::admin::BulkSeedRequest,
        dto::admin::BulkSeedResponse,
        dto::admin::BulkPurgeResponse,
        dto::admin::IndexRepairResponse,
        // Health (handler-local types)
        handlers::health::HealthData,
        handlers::health::BlobStatus,
        handlers::health::CdnStatus,
        handlers::health::VerificationStatus,
        handlers::health::CuratorStatus,
    )),
    tags(
        (name = "health", description = "Health check"),
        (name = "memories", description = "Memory CRUD and listing"),
        (name = "auth", description = "Curator session exchange"),
        (name = "admin", description = "Administrative operations (curator session required)"),
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            utoipa::openapi::security::SecurityScheme::Http(utoipa::openapi::security::Http::new(
                utoipa::openapi::security::HttpAuthScheme::Bearer,
            )),
        );
    }
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn redoc_router<S: Clone + Send + Sync + 'static>() -> axum::Router<S> {
    Redoc::with_url("/docs", ApiDoc::openapi()).into()
}
