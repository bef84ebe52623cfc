mod blob;
mod index;
mod memories;

pub use blob::{BlobPage, BlobStore, HttpBlobStore, MemoryBlobStore};
pub use index::IndexStore;
pub use memories::MemoryDocumentStore;
