//! Memory request/response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::cdn::CdnClient;
use crate::models;

// ---------------------------------------------------------------------------
// Request DTOs
// ---------------------------------------------------------------------------

/// A photo reference as submitted by clients. Entries without a `publicId`
/// are dropped during normalization.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PhotoInputDto {
    /// Image CDN identifier of the uploaded asset.
    pub public_id: Option<String>,
    pub caption: Option<String>,
    /// When the photo was taken.
    #[schema(value_type = String)]
    pub taken_at: Option<DateTime<Utc>>,
    /// Requested position; missing values fall back to list order.
    pub sort_index: Option<u32>,
}

impl From<PhotoInputDto> for models::PhotoInput {
    fn from(dto: PhotoInputDto) -> Self {
        Self {
            public_id: dto.public_id,
            caption: dto.caption,
            taken_at: dto.taken_at,
            sort_index: dto.sort_index,
        }
    }
}

/// Request body for `POST /api/memory`.
#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMemoryRequest {
    /// Author display name.
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    /// Author email. Used for correspondence only, never displayed.
    #[validate(email)]
    pub email: String,
    /// Optional headline; the UI falls back to `name` when absent.
    #[validate(length(max = 200))]
    pub title: Option<String>,
    /// Display date. Server time is used when absent.
    #[schema(value_type = String)]
    pub date: Option<DateTime<Utc>>,
    /// The memory text.
    pub body: String,
    /// Photo references, normalized server-side.
    #[serde(default)]
    pub photos: Vec<PhotoInputDto>,
    /// Anti-bot verification token from the client widget.
    pub verification_token: Option<String>,
}

/// Request body for `PATCH /api/memory/{id}`.
#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMemoryRequest {
    #[validate(length(max = 200))]
    pub title: Option<String>,
    pub body: Option<String>,
    pub photos: Option<Vec<PhotoInputDto>>,
    /// Per-memory secret from the create response. Not needed with a
    /// curator session.
    pub edit_token: Option<String>,
}

/// Request body for `DELETE /api/memory/{id}`.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMemoryRequest {
    /// Per-memory secret from the create response. Not needed with a
    /// curator session.
    pub edit_token: Option<String>,
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

/// Response for `POST /api/memory`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMemoryResponse {
    /// The new memory id (nanoid, 21 chars).
    pub id: String,
    /// Per-memory secret granting edit/delete. Shown exactly once.
    pub edit_token: String,
}

/// A photo reference in API responses.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PhotoResponse {
    pub public_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = String)]
    pub taken_at: Option<DateTime<Utc>>,
    pub sort_index: u32,
}

impl From<models::Photo> for PhotoResponse {
    fn from(photo: models::Photo) -> Self {
        Self {
            public_id: photo.public_id,
            caption: photo.caption,
            taken_at: photo.taken_at,
            sort_index: photo.sort_index,
        }
    }
}

/// Full memory response for `GET /api/memory/{id}`.
///
/// Never carries `email` or `edit_token`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemoryResponse {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[schema(value_type = String)]
    pub date: DateTime<Utc>,
    pub body: String,
    pub photos: Vec<PhotoResponse>,
    pub photo_count: u32,
    #[schema(value_type = String)]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String)]
    pub updated_at: DateTime<Utc>,
}

impl From<models::MemoryDetail> for MemoryResponse {
    fn from(doc: models::MemoryDetail) -> Self {
        Self {
            id: doc.id,
            name: doc.name,
            title: doc.title,
            date: doc.date,
            body: doc.body,
            photo_count: doc.photos.len() as u32,
            photos: doc.photos.into_iter().map(PhotoResponse::from).collect(),
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

/// One entry of the list view.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemorySummaryResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub name: String,
    /// Body truncated for the list view.
    pub preview: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_public_id: Option<String>,
    /// Ready-to-use thumbnail URL for the cover photo.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    pub photo_count: u32,
    #[schema(value_type = String)]
    pub date: DateTime<Utc>,
    #[schema(value_type = String)]
    pub created_at: DateTime<Utc>,
}

impl MemorySummaryResponse {
    pub fn from_item(item: models::MemoryIndexItem, cdn: &CdnClient) -> Self {
        let cover_url = item.cover_public_id.as_deref().map(|public_id| {
            cdn.delivery_url(
                public_id,
                crate::cdn::LIST_THUMB_WIDTH,
                crate::cdn::LIST_THUMB_HEIGHT,
            )
        });
        Self {
            id: item.id,
            title: item.title,
            name: item.name,
            preview: item.preview,
            cover_public_id: item.cover_public_id,
            cover_url,
            photo_count: item.photo_count,
            date: item.date,
            created_at: item.created_at,
        }
    }
}

/// Memory list response wrapper. The item count is mirrored in the
/// envelope's `meta.total`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListMemoriesResponse {
    pub memories: Vec<MemorySummaryResponse>,
}

/// Response for `DELETE /api/memory/{id}`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMemoryResponse {
    pub id: String,
    pub deleted: bool,
    /// Photos successfully destroyed in the image CDN.
    pub photos_removed: u32,
    /// Photos whose CDN destroy failed; cleanup is best-effort.
    pub photos_failed: u32,
}

impl From<models::DeletionReport> for DeleteMemoryResponse {
    fn from(report: models::DeletionReport) -> Self {
        Self {
            id: report.id,
            deleted: true,
            photos_removed: report.photos_removed,
            photos_failed: report.photos_failed,
        }
    }
}
