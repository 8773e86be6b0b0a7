use crate::utils::error::StorageError;
use crate::world::chunk::Chunk;
use crate::world::chunk_coord::{ChunkCoord, ChunkDims};
use crate::world::storage::core::{ChunkStore, SerializedChunk};
use parking_lot::Mutex;
use std::collections::HashMap;

/// Keeps serialized chunks in memory. Useful for tests and throwaway worlds.
#[derive(Default)]
pub struct MemoryChunkStore {
    chunks: Mutex<HashMap<ChunkCoord, SerializedChunk>>,
}

impl MemoryChunkStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.chunks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.lock().is_empty()
    }
}

impl ChunkStore for MemoryChunkStore {
    fn has_chunk(&self, coord: ChunkCoord) -> bool {
        self.chunks.lock().contains_key(&coord)
    }

    fn load_chunk(&self, coord: ChunkCoord, dims: ChunkDims) -> Result<Option<Chunk>, StorageError> {
        let stored = self.chunks.lock().get(&coord).cloned();
        stored.map(|serialized| serialized.into_chunk(dims)).transpose()
    }

    fn save_chunk(&self, chunk: &Chunk) -> Result<(), StorageError> {
        let serialized = SerializedChunk::from_chunk(chunk)?;
        self.chunks.lock().insert(chunk.coord(), serialized);
        Ok(())
    }
}
