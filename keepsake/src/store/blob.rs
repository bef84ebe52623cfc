use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use nanoid::nanoid;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use crate::config::BlobConfig;
use crate::error::{KeepsakeError, Result};

/// One page of a prefix listing.
#[derive(Debug, Clone)]
pub struct BlobPage {
    pub keys: Vec<String>,
    /// Opaque cursor for the next page. `None` means the listing is done.
    pub cursor: Option<String>,
}

/// Key-addressed JSON blob storage.
///
/// Reads fail open: a missing credential, missing blob, or non-OK upstream
/// response all surface as `Ok(None)`, so callers must treat `None` as
/// "not found" rather than an error signal. Writes fail loud when no write
/// credential is configured. There are no retries and no versioning;
/// concurrent writers to the same key race with last-write-wins.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn get_json(&self, key: &str) -> Result<Option<Value>>;
    async fn put_json(&self, key: &str, value: Value) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<()>;
    async fn list(&self, prefix: &str, cursor: Option<&str>) -> Result<BlobPage>;
}

// ---------------------------------------------------------------------------
// HTTP backend
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    blobs: Vec<ListedBlob>,
    cursor: Option<String>,
    #[serde(default)]
    has_more: bool,
}

#[derive(Deserialize)]
struct ListedBlob {
    pathname: String,
}

/// Blob storage over an external key-addressed HTTP service.
#[derive(Clone)]
pub struct HttpBlobStore {
    client: Client,
    base_url: String,
    read_token: Option<String>,
    write_token: Option<String>,
    list_page_size: u32,
    cache_bust: bool,
}

impl HttpBlobStore {
    pub fn new(config: &BlobConfig) -> Result<Self> {
        url::Url::parse(&config.base_url)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| KeepsakeError::Blob(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            read_token: config.read_token.clone(),
            write_token: config.write_token.clone(),
            list_page_size: config.list_page_size,
            cache_bust: config.cache_bust,
        })
    }

    fn blob_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }

    fn write_token(&self) -> Result<&str> {
        self.write_token.as_deref().ok_or_else(|| {
            KeepsakeError::Blob("No write credential configured for the blob store".to_string())
        })
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn get_json(&self, key: &str) -> Result<Option<Value>> {
        let Some(token) = self.read_token.as_deref() else {
            tracing::debug!(key, "Blob read skipped: no read credential configured");
            return Ok(None);
        };

        let mut request = self.client.get(self.blob_url(key)).bearer_auth(token);
        if self.cache_bust {
            request = request.query(&[("cb", nanoid!(10))]);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            tracing::debug!(key, status = %response.status(), "Blob read returned non-OK");
            return Ok(None);
        }

        Ok(Some(response.json().await?))
    }

    async fn put_json(&self, key: &str, value: Value) -> Result<()> {
        let token = self.write_token()?;

        let response = self
            .client
            .put(self.blob_url(key))
            .bearer_auth(token)
            .json(&value)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(KeepsakeError::Blob(format!(
                "Blob write for '{key}' failed: {status} - {body}"
            )));
        }

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let token = self.write_token()?;

        let response = self
            .client
            .delete(self.blob_url(key))
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(KeepsakeError::Blob(format!(
            "Blob delete for '{key}' failed: {status} - {body}"
        )))
    }

    async fn list(&self, prefix: &str, cursor: Option<&str>) -> Result<BlobPage> {
        let Some(token) = self.read_token.as_deref() else {
            tracing::debug!(prefix, "Blob listing skipped: no read credential configured");
            return Ok(BlobPage {
                keys: Vec::new(),
                cursor: None,
            });
        };

        let mut request = self
            .client
            .get(&self.base_url)
            .bearer_auth(token)
            .query(&[("prefix", prefix)])
            .query(&[("limit", self.list_page_size)]);
        if let Some(cursor) = cursor {
            request = request.query(&[("cursor", cursor)]);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            tracing::debug!(prefix, status = %response.status(), "Blob listing returned non-OK");
            return Ok(BlobPage {
                keys: Vec::new(),
                cursor: None,
            });
        }

        let page: ListResponse = response.json().await?;
        Ok(BlobPage {
            keys: page.blobs.into_iter().map(|b| b.pathname).collect(),
            cursor: if page.has_more { page.cursor } else { None },
        })
    }
}

// ---------------------------------------------------------------------------
// In-memory backend
// ---------------------------------------------------------------------------

/// In-process blob store backed by a `BTreeMap`. Selected by the `memory:`
/// URL scheme; data does not survive a restart.
#[derive(Clone)]
pub struct MemoryBlobStore {
    blobs: Arc<RwLock<BTreeMap<String, Value>>>,
    page_size: usize,
}

impl MemoryBlobStore {
    pub fn new(page_size: usize) -> Self {
        Self {
            blobs: Arc::new(RwLock::new(BTreeMap::new())),
            page_size: page_size.max(1),
        }
    }

    fn encode_cursor(key: &str) -> String {
        STANDARD.encode(key)
    }

    fn decode_cursor(cursor: &str) -> Result<String> {
        let bytes = STANDARD
            .decode(cursor)
            .map_err(|e| KeepsakeError::Validation(format!("Invalid list cursor: {e}")))?;
        String::from_utf8(bytes)
            .map_err(|e| KeepsakeError::Validation(format!("Invalid list cursor: {e}")))
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get_json(&self, key: &str) -> Result<Option<Value>> {
        let blobs = self
            .blobs
            .read()
            .map_err(|_| KeepsakeError::Internal("Blob store lock poisoned".to_string()))?;
        Ok(blobs.get(key).cloned())
    }

    async fn put_json(&self, key: &str, value: Value) -> Result<()> {
        let mut blobs = self
            .blobs
            .write()
            .map_err(|_| KeepsakeError::Internal("Blob store lock poisoned".to_string()))?;
        blobs.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut blobs = self
            .blobs
            .write()
            .map_err(|_| KeepsakeError::Internal("Blob store lock poisoned".to_string()))?;
        blobs.remove(key);
        Ok(())
    }

    async fn list(&self, prefix: &str, cursor: Option<&str>) -> Result<BlobPage> {
        let after = cursor.map(Self::decode_cursor).transpose()?;

        let blobs = self
            .blobs
            .read()
            .map_err(|_| KeepsakeError::Internal("Blob store lock poisoned".to_string()))?;

        let keys: Vec<String> = blobs
            .keys()
            .filter(|key| key.starts_with(prefix))
            .filter(|key| match &after {
                Some(last) => key.as_str() > last.as_str(),
                None => true,
            })
            .take(self.page_size + 1)
            .cloned()
            .collect();

        if keys.len() > self.page_size {
            let page: Vec<String> = keys[..self.page_size].to_vec();
            let cursor = page.last().map(|k| Self::encode_cursor(k));
            Ok(BlobPage { keys: page, cursor })
        } else {
            Ok(BlobPage { keys, cursor: None })
        }
    }
}
