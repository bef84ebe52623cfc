use tracing::{debug, info, warn};

use crate::error::Result;
use crate::services::ListCache;
use crate::store::{IndexStore, MemoryDocumentStore};

/// Outcome of one janitor pass.
#[derive(Debug, Clone, Copy)]
pub struct JanitorReport {
    pub scanned: u64,
    pub repaired: u64,
}

/// Background repair of the "every index item has a live document"
/// invariant: index items whose document is missing or tombstoned are
/// removed. The inverse orphan (document without an index item) never
/// reaches the user-visible list and is left alone.
#[derive(Clone)]
pub struct IndexJanitor {
    docs: MemoryDocumentStore,
    index: IndexStore,
    cache: ListCache,
    interval_secs: u64,
}

impl IndexJanitor {
    pub fn new(
        docs: MemoryDocumentStore,
        index: IndexStore,
        cache: ListCache,
        interval_secs: u64,
    ) -> Self {
        Self {
            docs,
            index,
            cache,
            interval_secs,
        }
    }

    /// Run a single repair pass. Continues past individual read failures;
    /// an item is only removed when its document is positively absent or
    /// tombstoned, never on a transient error.
    pub async fn run_once(&self) -> Result<JanitorReport> {
        info!("Starting index repair pass");

        let ids = self.index.list_ids().await?;
        let scanned = ids.len() as u64;

        if scanned == 0 {
            info!("Index is empty, nothing to repair");
            return Ok(JanitorReport {
                scanned,
                repaired: 0,
            });
        }

        let mut repaired = 0u64;
        for id in ids {
            match self.docs.read(&id).await {
                Ok(Some(doc)) if !doc.is_deleted() => {}
                Ok(_) => {
                    debug!(id = %id, "Removing index item without a live document");
                    match self.index.delete_item(&id).await {
                        Ok(()) => repaired += 1,
                        Err(e) => warn!(id = %id, error = %e, "Failed to remove orphan index item"),
                    }
                }
                Err(e) => {
                    warn!(id = %id, error = %e, "Skipping index item, document read failed");
                }
            }
        }

        if repaired > 0 {
            self.cache.invalidate();
        }

        info!(
            "Index repair complete: {} repaired out of {} scanned",
            repaired, scanned
        );

        Ok(JanitorReport { scanned, repaired })
    }

    pub fn interval_secs(&self) -> u64 {
        self.interval_secs
    }
}
