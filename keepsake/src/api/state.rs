use std::sync::Arc;

use crate::auth::CuratorAuth;
use crate::cdn::CdnClient;
use crate::config::Config;
use crate::services::{IndexJanitor, ListCache, MemoryService, SeedService};
use crate::store::{BlobStore, IndexStore, MemoryDocumentStore};
use crate::verify::VerificationClient;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// The raw blob backend, exposed for health probes.
    pub blob: Arc<dyn BlobStore>,
    pub memories: MemoryService,
    pub seeder: SeedService,
    pub janitor: IndexJanitor,
    pub cdn: CdnClient,
    pub verifier: VerificationClient,
    pub auth: CuratorAuth,
}

impl AppState {
    pub fn new(
        config: Config,
        blob: Arc<dyn BlobStore>,
        cdn: CdnClient,
        verifier: VerificationClient,
    ) -> Self {
        let config = Arc::new(config);
        let docs = MemoryDocumentStore::new(blob.clone());
        let index = IndexStore::new(blob.clone(), &config.memory);
        let cache = ListCache::new(config.memory.list_cache_capacity);
        let memories = MemoryService::new(
            docs.clone(),
            index.clone(),
            cdn.clone(),
            cache.clone(),
            config.memory.clone(),
        );
        let seeder = SeedService::new(
            memories.clone(),
            docs.clone(),
            index.clone(),
            cache.clone(),
        );
        let janitor = IndexJanitor::new(docs, index, cache, config.memory.janitor_interval_secs);
        let auth = CuratorAuth::new(&config.server);

        Self {
            config,
            blob,
            memories,
            seeder,
            janitor,
            cdn,
            verifier,
            auth,
        }
    }
}
