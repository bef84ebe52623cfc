use std::sync::Arc;

use futures::stream::{self, StreamExt};

use crate::config::MemorySettings;
use crate::error::Result;
use crate::models::MemoryIndexItem;
use crate::store::BlobStore;

const INDEX_PREFIX: &str = "index/";

/// Store for denormalized memory summaries, one small JSON blob per memory,
/// plus the read-time aggregator that assembles them into the list view.
#[derive(Clone)]
pub struct IndexStore {
    blob: Arc<dyn BlobStore>,
    fetch_concurrency: usize,
    cap: usize,
}

impl IndexStore {
    pub fn new(blob: Arc<dyn BlobStore>, settings: &MemorySettings) -> Self {
        Self {
            blob,
            fetch_concurrency: settings.hydrate_concurrency.max(1),
            cap: settings.index_cap,
        }
    }

    fn key(id: &str) -> String {
        format!("{INDEX_PREFIX}{id}.json")
    }

    fn id_from_key(key: &str) -> Option<&str> {
        key.strip_prefix(INDEX_PREFIX)?.strip_suffix(".json")
    }

    pub async fn write_item(&self, item: &MemoryIndexItem) -> Result<()> {
        self.blob
            .put_json(&Self::key(&item.id), serde_json::to_value(item)?)
            .await
    }

    pub async fn delete_item(&self, id: &str) -> Result<()> {
        self.blob.delete(&Self::key(id)).await
    }

    /// All index item ids, uncapped. Used by the janitor and for repair.
    pub async fn list_ids(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = self.blob.list(INDEX_PREFIX, cursor.as_deref()).await?;
            ids.extend(
                page.keys
                    .iter()
                    .filter_map(|key| Self::id_from_key(key))
                    .map(str::to_string),
            );
            match page.cursor {
                Some(c) => cursor = Some(c),
                None => break,
            }
        }
        Ok(ids)
    }

    /// Assemble the list view: page through every index blob, fetch each
    /// with bounded concurrency, discard items that are missing or fail to
    /// parse, sort the survivors newest-first, and cap the result.
    pub async fn aggregate(&self) -> Result<Vec<MemoryIndexItem>> {
        let mut keys = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = self.blob.list(INDEX_PREFIX, cursor.as_deref()).await?;
            keys.extend(page.keys);
            match page.cursor {
                Some(c) => cursor = Some(c),
                None => break,
            }
        }

        let mut items: Vec<MemoryIndexItem> = stream::iter(keys)
            .map(|key| {
                let blob = self.blob.clone();
                async move {
                    match blob.get_json(&key).await {
                        Ok(Some(value)) => match serde_json::from_value(value) {
                            Ok(item) => Some(item),
                            Err(e) => {
                                tracing::warn!(key = %key, error = %e, "Discarding unparseable index item");
                                None
                            }
                        },
                        Ok(None) => None,
                        Err(e) => {
                            tracing::warn!(key = %key, error = %e, "Failed to fetch index item");
                            None
                        }
                    }
                }
            })
            .buffer_unordered(self.fetch_concurrency)
            .filter_map(|item| async move { item })
            .collect()
            .await;

        items.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        items.truncate(self.cap);
        Ok(items)
    }
}
