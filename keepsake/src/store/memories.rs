use std::sync::Arc;

use chrono::Utc;

use crate::error::Result;
use crate::models::MemoryDetail;
use crate::store::BlobStore;

const DOCUMENT_PREFIX: &str = "memories/";

/// Store for full memory documents, one JSON blob per id.
#[derive(Clone)]
pub struct MemoryDocumentStore {
    blob: Arc<dyn BlobStore>,
}

impl MemoryDocumentStore {
    pub fn new(blob: Arc<dyn BlobStore>) -> Self {
        Self { blob }
    }

    fn key(id: &str) -> String {
        format!("{DOCUMENT_PREFIX}{id}.json")
    }

    fn id_from_key(key: &str) -> Option<&str> {
        key.strip_prefix(DOCUMENT_PREFIX)?.strip_suffix(".json")
    }

    /// Read a document by id. `None` means the blob is absent; a blob that
    /// exists but fails to parse is an error, not a miss.
    pub async fn read(&self, id: &str) -> Result<Option<MemoryDetail>> {
        match self.blob.get_json(&Self::key(id)).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Write a document, stamping `updated_at` server-side.
    pub async fn write(&self, doc: &mut MemoryDetail) -> Result<()> {
        doc.updated_at = Utc::now();
        self.blob
            .put_json(&Self::key(&doc.id), serde_json::to_value(&doc)?)
            .await
    }

    /// Hard-delete a document blob. Regular deletes tombstone instead; this
    /// is for purging seeded test data.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.blob.delete(&Self::key(id)).await
    }

    /// All document ids currently in the store, walked page by page.
    pub async fn list_ids(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = self.blob.list(DOCUMENT_PREFIX, cursor.as_deref()).await?;
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
}
