use chrono::Utc;
use futures::stream::{self, StreamExt};
use nanoid::nanoid;
use uuid::Uuid;

use crate::cdn::CdnClient;
use crate::config::MemorySettings;
use crate::error::{KeepsakeError, Result};
use crate::models::{
    normalize_photos, Actor, DeletionReport, MemoryDetail, MemoryIndexItem, MemoryPatch, NewMemory,
};
use crate::services::ListCache;
use crate::store::{IndexStore, MemoryDocumentStore};

/// Orchestrates the memory lifecycle: document writes, index maintenance,
/// list assembly, CDN cleanup, and cache invalidation.
#[derive(Clone)]
pub struct MemoryService {
    docs: MemoryDocumentStore,
    index: IndexStore,
    cdn: CdnClient,
    cache: ListCache,
    settings: MemorySettings,
}

impl MemoryService {
    pub fn new(
        docs: MemoryDocumentStore,
        index: IndexStore,
        cdn: CdnClient,
        cache: ListCache,
        settings: MemorySettings,
    ) -> Self {
        Self {
            docs,
            index,
            cdn,
            cache,
            settings,
        }
    }

    /// Create a memory: write the full document, then its derived index
    /// item, then invalidate cached list views. There is no transaction
    /// spanning the two writes; a failed index write leaves the document
    /// orphaned until the next successful write of the same id.
    pub async fn create(&self, new: NewMemory) -> Result<MemoryDetail> {
        let now = Utc::now();
        let mut doc = MemoryDetail {
            id: nanoid!(),
            name: new.name.trim().to_string(),
            email: new.email.trim().to_string(),
            title: normalize_title(new.title),
            date: new.date.unwrap_or(now),
            body: new.body,
            photos: normalize_photos(new.photos),
            edit_token: Uuid::new_v4().to_string(),
            seeded: new.seeded,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };

        self.docs.write(&mut doc).await?;
        self.index
            .write_item(&doc.index_item(self.settings.preview_len))
            .await?;
        self.cache.invalidate();

        Ok(doc)
    }

    /// Fetch a memory by id. Tombstoned documents are reported as absent.
    pub async fn detail(&self, id: &str) -> Result<Option<MemoryDetail>> {
        Ok(self.docs.read(id).await?.filter(|doc| !doc.is_deleted()))
    }

    /// Assemble the list view. Aggregates the index, then re-reads each
    /// full document with bounded concurrency to recompute the preview and
    /// drop entries whose document is gone or tombstoned. Served from the
    /// list cache while warm.
    pub async fn list(&self) -> Result<Vec<MemoryIndexItem>> {
        if let Some(cached) = self.cache.get() {
            return Ok(cached);
        }

        let items = self.index.aggregate().await?;
        let preview_len = self.settings.preview_len;

        let hydrated: Vec<Option<MemoryIndexItem>> = stream::iter(items)
            .map(|item| {
                let docs = self.docs.clone();
                async move {
                    match docs.read(&item.id).await {
                        Ok(Some(doc)) if !doc.is_deleted() => Some(doc.index_item(preview_len)),
                        Ok(_) => {
                            tracing::debug!(id = %item.id, "Dropping index item without a live document");
                            None
                        }
                        Err(e) => {
                            tracing::warn!(id = %item.id, error = %e, "Failed to hydrate memory");
                            None
                        }
                    }
                }
            })
            .buffered(self.settings.hydrate_concurrency.max(1))
            .collect()
            .await;

        let list: Vec<MemoryIndexItem> = hydrated.into_iter().flatten().collect();
        self.cache.put(list.clone());
        Ok(list)
    }

    /// In-place update of an existing memory. The id never changes; the
    /// index item is rebuilt from the updated document.
    pub async fn update(&self, id: &str, patch: MemoryPatch, actor: &Actor) -> Result<MemoryDetail> {
        let mut doc = self
            .docs
            .read(id)
            .await?
            .filter(|d| !d.is_deleted())
            .ok_or_else(|| KeepsakeError::NotFound(format!("Memory {id} not found")))?;

        authorize(&doc, actor)?;

        if let Some(title) = patch.title {
            doc.title = normalize_title(Some(title));
        }
        if let Some(body) = patch.body {
            doc.body = body;
        }
        if let Some(photos) = patch.photos {
            doc.photos = normalize_photos(photos);
        }

        self.docs.write(&mut doc).await?;
        self.index
            .write_item(&doc.index_item(self.settings.preview_len))
            .await?;
        self.cache.invalidate();

        Ok(doc)
    }

    /// Delete a memory: best-effort destroy of its CDN photos (partial
    /// failures are logged and swallowed), tombstone the document, remove
    /// the index item, invalidate cached lists. The document blob is kept
    /// for audit.
    pub async fn delete(&self, id: &str, actor: &Actor) -> Result<DeletionReport> {
        let mut doc = self
            .docs
            .read(id)
            .await?
            .filter(|d| !d.is_deleted())
            .ok_or_else(|| KeepsakeError::NotFound(format!("Memory {id} not found")))?;

        authorize(&doc, actor)?;

        let outcomes: Vec<bool> = stream::iter(doc.photos.clone())
            .map(|photo| {
                let cdn = self.cdn.clone();
                async move {
                    match cdn.destroy(&photo.public_id).await {
                        Ok(()) => true,
                        Err(e) => {
                            tracing::warn!(
                                public_id = %photo.public_id,
                                error = %e,
                                "Failed to destroy photo, continuing"
                            );
                            false
                        }
                    }
                }
            })
            .buffer_unordered(self.settings.photo_delete_concurrency.max(1))
            .collect()
            .await;

        let photos_removed = outcomes.iter().filter(|ok| **ok).count() as u32;
        let photos_failed = outcomes.len() as u32 - photos_removed;

        doc.deleted_at = Some(Utc::now());
        self.docs.write(&mut doc).await?;
        self.index.delete_item(&doc.id).await?;
        self.cache.invalidate();

        Ok(DeletionReport {
            id: doc.id,
            photos_removed,
            photos_failed,
        })
    }
}

fn normalize_title(title: Option<String>) -> Option<String> {
    title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

fn authorize(doc: &MemoryDetail, actor: &Actor) -> Result<()> {
    match actor {
        Actor::Curator => Ok(()),
        Actor::EditToken(token) if *token == doc.edit_token => Ok(()),
        Actor::EditToken(_) => Err(KeepsakeError::Forbidden(
            "Edit token does not match this memory".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CdnConfig, MemorySettings};
    use crate::models::PhotoInput;
    use crate::store::{BlobStore, MemoryBlobStore};
    use std::sync::Arc;

    fn settings() -> MemorySettings {
        MemorySettings {
            body_max_len: 5000,
            preview_len: 200,
            index_cap: 500,
            hydrate_concurrency: 4,
            photo_delete_concurrency: 2,
            janitor_interval_secs: 3600,
            list_cache_capacity: 4,
        }
    }

    fn cdn() -> CdnClient {
        // Unconfigured: destroys fail and are swallowed by the delete path.
        CdnClient::new(&CdnConfig {
            delivery_base_url: "https://cdn.example.com/image".to_string(),
            api_base_url: "https://api.example.com/v1/image".to_string(),
            api_key: None,
            api_secret: None,
            timeout_secs: 5,
        })
        .unwrap()
    }

    fn service() -> (Arc<MemoryBlobStore>, MemoryService) {
        let blob = Arc::new(MemoryBlobStore::new(100));
        let docs = MemoryDocumentStore::new(blob.clone());
        let index = IndexStore::new(blob.clone(), &settings());
        let cache = ListCache::new(4);
        let service = MemoryService::new(docs, index, cdn(), cache, settings());
        (blob, service)
    }

    fn new_memory(name: &str, body: &str) -> NewMemory {
        NewMemory {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            title: None,
            date: None,
            body: body.to_string(),
            photos: Vec::new(),
            seeded: false,
        }
    }

    #[tokio::test]
    async fn create_then_detail_read_after_write() {
        let (_, service) = service();
        let created = service.create(new_memory("Ada", "hello")).await.unwrap();

        let detail = service.detail(&created.id).await.unwrap().unwrap();
        assert_eq!(detail.body, "hello");
        assert!(!detail.edit_token.is_empty());
    }

    #[tokio::test]
    async fn create_normalizes_photos() {
        let (_, service) = service();
        let mut req = new_memory("Ada", "hello");
        req.photos = vec![
            PhotoInput {
                public_id: Some("late".to_string()),
                sort_index: Some(5),
                ..Default::default()
            },
            PhotoInput {
                public_id: None,
                sort_index: Some(0),
                ..Default::default()
            },
            PhotoInput {
                public_id: Some("early".to_string()),
                sort_index: Some(1),
                ..Default::default()
            },
        ];

        let created = service.create(req).await.unwrap();
        assert_eq!(created.photos.len(), 2);
        assert_eq!(created.photos[0].public_id, "early");
        assert_eq!(created.photos[0].sort_index, 0);
        assert_eq!(created.photos[1].public_id, "late");
        assert_eq!(created.photos[1].sort_index, 1);
        assert_eq!(created.cover_public_id(), Some("early"));
    }

    #[tokio::test]
    async fn list_reflects_creates_and_recomputes_previews() {
        let (_, service) = service();
        let long_body = "m".repeat(300);
        service.create(new_memory("Ada", &long_body)).await.unwrap();

        let list = service.list().await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].preview.chars().count(), 201);
        assert!(list[0].preview.ends_with('…'));
    }

    #[tokio::test]
    async fn list_drops_items_whose_document_is_missing() {
        let (blob, service) = service();
        let created = service.create(new_memory("Ada", "hello")).await.unwrap();

        // Simulate a document lost out-of-band; the index item remains.
        blob.delete(&format!("memories/{}.json", created.id))
            .await
            .unwrap();
        service.cache.invalidate();

        let list = service.list().await.unwrap();
        assert!(list.is_empty());
    }

    #[tokio::test]
    async fn update_with_matching_edit_token() {
        let (_, service) = service();
        let created = service.create(new_memory("Ada", "before")).await.unwrap();

        let actor = Actor::EditToken(created.edit_token.clone());
        let patch = MemoryPatch {
            body: Some("after".to_string()),
            ..Default::default()
        };
        let updated = service.update(&created.id, patch, &actor).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.body, "after");

        let list = service.list().await.unwrap();
        assert_eq!(list[0].preview, "after");
    }

    #[tokio::test]
    async fn update_with_wrong_edit_token_is_forbidden() {
        let (_, service) = service();
        let created = service.create(new_memory("Ada", "hello")).await.unwrap();

        let actor = Actor::EditToken("wrong".to_string());
        let result = service
            .update(&created.id, MemoryPatch::default(), &actor)
            .await;
        assert!(matches!(result, Err(KeepsakeError::Forbidden(_))));
    }

    #[tokio::test]
    async fn curator_can_update_any_memory() {
        let (_, service) = service();
        let created = service.create(new_memory("Ada", "hello")).await.unwrap();

        let patch = MemoryPatch {
            title: Some("Remembered".to_string()),
            ..Default::default()
        };
        let updated = service
            .update(&created.id, patch, &Actor::Curator)
            .await
            .unwrap();
        assert_eq!(updated.title.as_deref(), Some("Remembered"));
    }

    #[tokio::test]
    async fn delete_tombstones_and_removes_from_list() {
        let (blob, service) = service();
        let created = service.create(new_memory("Ada", "hello")).await.unwrap();

        let report = service.delete(&created.id, &Actor::Curator).await.unwrap();
        assert_eq!(report.id, created.id);

        assert!(service.detail(&created.id).await.unwrap().is_none());
        assert!(service.list().await.unwrap().is_empty());

        // The document blob is kept for audit, tombstoned.
        let raw = blob
            .get_json(&format!("memories/{}.json", created.id))
            .await
            .unwrap()
            .expect("document kept");
        assert!(raw.get("deleted_at").is_some());
    }

    #[tokio::test]
    async fn delete_reports_swallowed_photo_failures() {
        let (_, service) = service();
        let mut req = new_memory("Ada", "hello");
        req.photos = vec![PhotoInput {
            public_id: Some("p1".to_string()),
            ..Default::default()
        }];
        let created = service.create(req).await.unwrap();

        // CDN is unconfigured, so the destroy fails but the delete succeeds.
        let report = service.delete(&created.id, &Actor::Curator).await.unwrap();
        assert_eq!(report.photos_removed, 0);
        assert_eq!(report.photos_failed, 1);
    }

    #[tokio::test]
    async fn delete_twice_is_not_found() {
        let (_, service) = service();
        let created = service.create(new_memory("Ada", "hello")).await.unwrap();
        service.delete(&created.id, &Actor::Curator).await.unwrap();

        let result = service.delete(&created.id, &Actor::Curator).await;
        assert!(matches!(result, Err(KeepsakeError::NotFound(_))));
    }

    #[tokio::test]
    async fn update_missing_memory_is_not_found() {
        let (_, service) = service();
        let result = service
            .update("absent", MemoryPatch::default(), &Actor::Curator)
            .await;
        assert!(matches!(result, Err(KeepsakeError::NotFound(_))));
    }
}
