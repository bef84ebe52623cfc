use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use crate::models::MemoryIndexItem;

const LIST_VIEW_KEY: &str = "memories";

/// Thread-safe LRU cache for assembled list views.
///
/// The stand-in for the original framework's revalidation tags: reads are
/// served from here while warm, and every write path calls `invalidate()`.
#[derive(Clone)]
pub struct ListCache {
    cache: Arc<Mutex<LruCache<String, Vec<MemoryIndexItem>>>>,
}

impl ListCache {
    /// # Panics
    /// Panics if capacity is 0.
    pub fn new(capacity: usize) -> Self {
        let cache = LruCache::new(NonZeroUsize::new(capacity).expect("Capacity must be non-zero"));
        Self {
            cache: Arc::new(Mutex::new(cache)),
        }
    }

    pub fn get(&self) -> Option<Vec<MemoryIndexItem>> {
        let mut cache = self.cache.lock().unwrap();
        cache.get(LIST_VIEW_KEY).cloned()
    }

    pub fn put(&self, items: Vec<MemoryIndexItem>) {
        let mut cache = self.cache.lock().unwrap();
        cache.put(LIST_VIEW_KEY.to_string(), items);
    }

    /// Drop every cached view. Called after any create, update, or delete.
    pub fn invalidate(&self) {
        let mut cache = self.cache.lock().unwrap();
        cache.clear();
    }
}
