use chrono::{Duration, Utc};
use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::error::Result;
use crate::models::NewMemory;
use crate::services::{ListCache, MemoryService};
use crate::store::{IndexStore, MemoryDocumentStore};

const SEED_CONCURRENCY: usize = 4;

const SEED_NAMES: &[&str] = &[
    "Amelia Hart",
    "Tomás Rivera",
    "Priya Nair",
    "Jonas Lindqvist",
    "Mei Tanaka",
    "Samuel Osei",
];

const SEED_BODIES: &[&str] = &[
    "She taught me how to fish at the lake house. I still hear her laugh every time a line goes taut.",
    "We shared an office for eleven years. He never once let a birthday pass without cake for the whole floor.",
    "Grandma's kitchen always smelled of cardamom. Sundays will never be the same without her braided bread.",
    "He drove three hours in a snowstorm to see my first recital. That was just who he was.",
    "Every summer she organized the street picnic. The whole neighborhood showed up, every single year.",
    "My first bicycle, my first tent, my first terrible pun. All of them came from him.",
];

const SEED_TITLES: &[Option<&str>] = &[
    Some("The lake house summers"),
    None,
    Some("Sunday bread"),
    None,
    Some("Our street picnic"),
    None,
];

/// Bulk test-data creation and deletion. Seeded memories carry a flag so
/// purge never touches real submissions.
#[derive(Clone)]
pub struct SeedService {
    memories: MemoryService,
    docs: MemoryDocumentStore,
    index: IndexStore,
    cache: ListCache,
}

impl SeedService {
    pub fn new(
        memories: MemoryService,
        docs: MemoryDocumentStore,
        index: IndexStore,
        cache: ListCache,
    ) -> Self {
        Self {
            memories,
            docs,
            index,
            cache,
        }
    }

    /// Create `count` sample memories through the regular create path,
    /// spaced one day apart so the list view gets a plausible spread.
    pub async fn seed(&self, count: u32) -> Result<Vec<String>> {
        info!("Seeding {count} test memories");

        let now = Utc::now();
        let ids: Vec<Option<String>> = stream::iter(0..count)
            .map(|i| {
                let memories = self.memories.clone();
                async move {
                    let slot = i as usize % SEED_NAMES.len();
                    let new = NewMemory {
                        name: SEED_NAMES[slot].to_string(),
                        email: format!("seed-{i}@keepsake.invalid"),
                        title: SEED_TITLES[slot].map(str::to_string),
                        date: Some(now - Duration::days(i as i64)),
                        body: SEED_BODIES[slot].to_string(),
                        photos: Vec::new(),
                        seeded: true,
                    };
                    match memories.create(new).await {
                        Ok(doc) => Some(doc.id),
                        Err(e) => {
                            warn!(error = %e, "Failed to seed memory, continuing");
                            None
                        }
                    }
                }
            })
            .buffer_unordered(SEED_CONCURRENCY)
            .collect()
            .await;

        let ids: Vec<String> = ids.into_iter().flatten().collect();
        info!("Seeded {} of {count} memories", ids.len());
        Ok(ids)
    }

    /// Hard-delete every seeded memory: document blob and index item both.
    /// Walks the document prefix directly so index orphans cannot hide
    /// seeded records.
    pub async fn purge(&self) -> Result<u64> {
        info!("Purging seeded memories");

        let ids = self.docs.list_ids().await?;
        let mut deleted = 0u64;

        for id in ids {
            let doc = match self.docs.read(&id).await {
                Ok(Some(doc)) => doc,
                Ok(None) => continue,
                Err(e) => {
                    warn!(id = %id, error = %e, "Skipping unreadable document during purge");
                    continue;
                }
            };

            if !doc.seeded {
                continue;
            }

            self.index.delete_item(&id).await?;
            self.docs.delete(&id).await?;
            deleted += 1;
        }

        if deleted > 0 {
            self.cache.invalidate();
        }

        info!("Purged {deleted} seeded memories");
        Ok(deleted)
    }
}
