//! Memory handlers.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use validator::Validate;

use crate::api::dto::{
    CreateMemoryRequest, CreateMemoryResponse, DeleteMemoryRequest, DeleteMemoryResponse,
    ListMemoriesResponse, MemoryResponse, MemorySummaryResponse, UpdateMemoryRequest,
};
use crate::api::middleware::bearer_token;
use crate::api::response::{ApiError, ApiResponse, ErrorCode, ResponseMeta};
use crate::api::AppState;
use crate::models::{Actor, MemoryPatch, NewMemory};

/// Resolve who is acting: a valid curator bearer token wins; otherwise a
/// submitted edit token is checked against the document downstream.
fn resolve_actor(state: &AppState, headers: &HeaderMap, edit_token: Option<String>) -> Option<Actor> {
    if let Some(token) = bearer_token(headers) {
        if state.auth.validate(token) {
            return Some(Actor::Curator);
        }
    }
    edit_token
        .filter(|t| !t.trim().is_empty())
        .map(Actor::EditToken)
}

/// `POST /api/memory`
#[utoipa::path(
    post,
    path = "/api/memory",
    tag = "memories",
    operation_id = "memories.create",
    request_body = CreateMemoryRequest,
    responses(
        (status = 201, description = "Memory created", body = CreateMemoryResponse),
        (status = 400, description = "Invalid request", body = ApiError),
    )
)]
pub async fn create_memory(
    State(state): State<AppState>,
    axum::Json(req): axum::Json<CreateMemoryRequest>,
) -> ApiResponse<CreateMemoryResponse> {
    if let Err(e) = req.validate() {
        return ApiResponse::error(ErrorCode::InvalidRequest, format!("Invalid request: {e}"));
    }

    if req.name.trim().is_empty() {
        return ApiResponse::error(ErrorCode::InvalidRequest, "Name cannot be empty");
    }

    if req.body.trim().is_empty() {
        return ApiResponse::error(ErrorCode::InvalidRequest, "Body cannot be empty");
    }

    let max_len = state.config.memory.body_max_len;
    if req.body.chars().count() > max_len {
        return ApiResponse::error(
            ErrorCode::InvalidRequest,
            format!("Body exceeds the {max_len} character limit"),
        );
    }

    let token = req.verification_token.as_deref().unwrap_or_default();
    match state.verifier.verify(token).await {
        Ok(true) => {}
        Ok(false) => {
            return ApiResponse::error(ErrorCode::InvalidRequest, "Anti-bot verification failed")
        }
        Err(e) => return e.into(),
    }

    let new = NewMemory {
        name: req.name,
        email: req.email,
        title: req.title,
        date: req.date,
        body: req.body,
        photos: req.photos.into_iter().map(Into::into).collect(),
        seeded: false,
    };

    match state.memories.create(new).await {
        Ok(doc) => ApiResponse::created(CreateMemoryResponse {
            id: doc.id,
            edit_token: doc.edit_token,
        }),
        Err(e) => e.into(),
    }
}

/// `GET /api/memory/{id}`
#[utoipa::path(
    get,
    path = "/api/memory/{id}",
    tag = "memories",
    operation_id = "memories.get",
    params(("id" = String, Path, description = "Memory ID")),
    responses(
        (status = 200, description = "Memory found", body = MemoryResponse),
        (status = 404, description = "Memory not found", body = ApiError),
    )
)]
pub async fn get_memory(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResponse<MemoryResponse> {
    match state.memories.detail(&id).await {
        Ok(Some(doc)) => ApiResponse::success(MemoryResponse::from(doc)),
        Ok(None) => ApiResponse::error(ErrorCode::NotFound, format!("Memory {id} not found")),
        Err(e) => e.into(),
    }
}

/// `GET /api/memories`
///
/// The assembled list view, newest first, capped at the configured index
/// cap. No pagination parameters; the cap bounds the response size.
#[utoipa::path(
    get,
    path = "/api/memories",
    tag = "memories",
    operation_id = "memories.list",
    responses(
        (status = 200, description = "Memories listed", body = ListMemoriesResponse),
    )
)]
pub async fn list_memories(State(state): State<AppState>) -> ApiResponse<ListMemoriesResponse> {
    let items = match state.memories.list().await {
        Ok(items) => items,
        Err(e) => return e.into(),
    };

    let memories: Vec<MemorySummaryResponse> = items
        .into_iter()
        .map(|item| MemorySummaryResponse::from_item(item, &state.cdn))
        .collect();

    let meta = ResponseMeta {
        total: Some(memories.len() as u64),
    };

    ApiResponse::success_with_meta(ListMemoriesResponse { memories }, meta)
}

/// `PATCH /api/memory/{id}`
#[utoipa::path(
    patch,
    path = "/api/memory/{id}",
    tag = "memories",
    operation_id = "memories.update",
    params(("id" = String, Path, description = "Memory ID")),
    request_body = UpdateMemoryRequest,
    responses(
        (status = 200, description = "Memory updated", body = MemoryResponse),
        (status = 401, description = "No credentials", body = ApiError),
        (status = 403, description = "Edit token mismatch", body = ApiError),
        (status = 404, description = "Memory not found", body = ApiError),
    )
)]
pub async fn update_memory(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    axum::Json(req): axum::Json<UpdateMemoryRequest>,
) -> ApiResponse<MemoryResponse> {
    if let Err(e) = req.validate() {
        return ApiResponse::error(ErrorCode::InvalidRequest, format!("Invalid request: {e}"));
    }

    if let Some(body) = &req.body {
        if body.trim().is_empty() {
            return ApiResponse::error(ErrorCode::InvalidRequest, "Body cannot be empty");
        }
        let max_len = state.config.memory.body_max_len;
        if body.chars().count() > max_len {
            return ApiResponse::error(
                ErrorCode::InvalidRequest,
                format!("Body exceeds the {max_len} character limit"),
            );
        }
    }

    let Some(actor) = resolve_actor(&state, &headers, req.edit_token.clone()) else {
        return ApiResponse::error(
            ErrorCode::Unauthorized,
            "Provide an edit token or a curator session",
        );
    };

    let patch = MemoryPatch {
        title: req.title,
        body: req.body,
        photos: req
            .photos
            .map(|photos| photos.into_iter().map(Into::into).collect()),
    };

    match state.memories.update(&id, patch, &actor).await {
        Ok(doc) => ApiResponse::success(MemoryResponse::from(doc)),
        Err(e) => e.into(),
    }
}

/// `DELETE /api/memory/{id}`
#[utoipa::path(
    delete,
    path = "/api/memory/{id}",
    tag = "memories",
    operation_id = "memories.delete",
    params(("id" = String, Path, description = "Memory ID")),
    request_body(content = DeleteMemoryRequest, description = "Optional edit token"),
    responses(
        (status = 200, description = "Memory deleted", body = DeleteMemoryResponse),
        (status = 401, description = "No credentials", body = ApiError),
        (status = 403, description = "Edit token mismatch", body = ApiError),
        (status = 404, description = "Memory not found", body = ApiError),
    )
)]
pub async fn delete_memory(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Option<axum::Json<DeleteMemoryRequest>>,
) -> ApiResponse<DeleteMemoryResponse> {
    let edit_token = body.and_then(|b| b.0.edit_token);

    let Some(actor) = resolve_actor(&state, &headers, edit_token) else {
        return ApiResponse::error(
            ErrorCode::Unauthorized,
            "Provide an edit token or a curator session",
        );
    };

    match state.memories.delete(&id, &actor).await {
        Ok(report) => ApiResponse::success(DeleteMemoryResponse::from(report)),
        Err(e) => e.into(),
    }
}
