use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// A photo reference attached to a memory. The asset itself lives in the
/// external image CDN; only the `public_id` is stored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    pub public_id: String,
    pub caption: Option<String>,
    pub taken_at: Option<DateTime<Utc>>,
    pub sort_index: u32,
}

/// Raw photo data as submitted by clients, before normalization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PhotoInput {
    pub public_id: Option<String>,
    pub caption: Option<String>,
    pub taken_at: Option<DateTime<Utc>>,
    pub sort_index: Option<u32>,
}

/// The full memory record, stored as one JSON document per id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryDetail {
    pub id: String,
    pub name: String,
    /// Authorization-only; never serialized into API responses.
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub date: DateTime<Utc>,
    pub body: String,
    pub photos: Vec<Photo>,
    /// Per-memory secret issued once at creation. Grants owner edit/delete.
    pub edit_token: String,
    /// Set on bulk test-data creation so purge only touches seeded records.
    #[serde(default)]
    pub seeded: bool,
    /// Tombstone. A tombstoned document stays in the store for audit but is
    /// invisible through the API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MemoryDetail {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn cover_public_id(&self) -> Option<&str> {
        self.photos.first().map(|p| p.public_id.as_str())
    }

    /// Derive the denormalized index summary. Rebuilt from the document on
    /// every write, so `cover_public_id` and `photo_count` cannot drift.
    pub fn index_item(&self, preview_len: usize) -> MemoryIndexItem {
        MemoryIndexItem {
            id: self.id.clone(),
            title: self.title.clone(),
            name: self.name.clone(),
            preview: preview(&self.body, preview_len),
            cover_public_id: self.cover_public_id().map(str::to_string),
            photo_count: self.photos.len() as u32,
            date: self.date,
            created_at: self.created_at,
        }
    }
}

/// Denormalized summary of a memory, one small blob per id, used for list
/// views without fetching every full document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryIndexItem {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub name: String,
    pub preview: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_public_id: Option<String>,
    pub photo_count: u32,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a memory, already past DTO validation.
#[derive(Debug, Clone)]
pub struct NewMemory {
    pub name: String,
    pub email: String,
    pub title: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub body: String,
    pub photos: Vec<PhotoInput>,
    pub seeded: bool,
}

/// Partial in-place update. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct MemoryPatch {
    pub title: Option<String>,
    pub body: Option<String>,
    pub photos: Option<Vec<PhotoInput>>,
}

/// Who is acting on a memory. All authorization decisions are made
/// server-side against this.
#[derive(Debug, Clone)]
pub enum Actor {
    /// Holder of a valid curator session; may edit or delete any memory.
    Curator,
    /// Holder of a per-memory edit token; must match the document's.
    EditToken(String),
}

/// Outcome of a delete, including best-effort CDN cleanup counts.
#[derive(Debug, Clone)]
pub struct DeletionReport {
    pub id: String,
    pub photos_removed: u32,
    pub photos_failed: u32,
}

/// Normalize submitted photos: drop entries without a `public_id`, order by
/// submitted `sort_index` (falling back to list position), then reassign a
/// dense 0..n-1 ordering.
pub fn normalize_photos(inputs: Vec<PhotoInput>) -> Vec<Photo> {
    let mut keyed: Vec<(u32, Photo)> = inputs
        .into_iter()
        .enumerate()
        .filter_map(|(pos, input)| {
            let public_id = input.public_id.filter(|id| !id.trim().is_empty())?;
            Some((
                input.sort_index.unwrap_or(pos as u32),
                Photo {
                    public_id,
                    caption: input.caption,
                    taken_at: input.taken_at,
                    sort_index: 0,
                },
            ))
        })
        .collect();

    keyed.sort_by_key(|(key, _)| *key);

    keyed
        .into_iter()
        .enumerate()
        .map(|(index, (_, mut photo))| {
            photo.sort_index = index as u32;
            photo
        })
        .collect()
}

/// Truncate a body for list previews. Bodies of at most `max_graphemes`
/// characters are returned verbatim; longer ones are cut to exactly
/// `max_graphemes` characters plus a trailing ellipsis. Grapheme-aware so a
/// multi-byte character is never split.
pub fn preview(body: &str, max_graphemes: usize) -> String {
    let mut graphemes = body.graphemes(true);
    let head: String = graphemes.by_ref().take(max_graphemes).collect();
    if graphemes.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}
