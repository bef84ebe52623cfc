mod janitor;
mod list_cache;
mod memory;
mod seed;

pub use janitor::{IndexJanitor, JanitorReport};
pub use list_cache::ListCache;
pub use memory::MemoryService;
pub use seed::SeedService;
