mod memory;

pub use memory::{
    normalize_photos, preview, Actor, DeletionReport, MemoryDetail, MemoryIndexItem, MemoryPatch,
    NewMemory, Photo, PhotoInput,
};
