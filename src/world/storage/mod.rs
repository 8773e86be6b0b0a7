pub mod core;
pub mod file;
pub mod memory;

pub use self::core::{ChunkStore, SerializedChunk, StoredVoxel};
pub use file::FileChunkStore;
pub use memory::MemoryChunkStore;
