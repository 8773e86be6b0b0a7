use crate::utils::error::StorageError;
use crate::world::chunk::Chunk;
use crate::world::chunk_coord::{ChunkCoord, ChunkDims};
use crate::world::voxel::Voxel;
use crate::world::voxel_type::VoxelTypeId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Persistence backend consulted before the terrain generator when a chunk is activated.
pub trait ChunkStore: Send {
    fn has_chunk(&self, coord: ChunkCoord) -> bool;

    /// Loads the chunk at `coord`. `Ok(None)` means nothing is stored there.
    fn load_chunk(&self, coord: ChunkCoord, dims: ChunkDims) -> Result<Option<Chunk>, StorageError>;

    fn save_chunk(&self, chunk: &Chunk) -> Result<(), StorageError>;
}

impl<S: ChunkStore + Sync> ChunkStore for Arc<S> {
    fn has_chunk(&self, coord: ChunkCoord) -> bool {
        (**self).has_chunk(coord)
    }

    fn load_chunk(&self, coord: ChunkCoord, dims: ChunkDims) -> Result<Option<Chunk>, StorageError> {
        (**self).load_chunk(coord, dims)
    }

    fn save_chunk(&self, chunk: &Chunk) -> Result<(), StorageError> {
        (**self).save_chunk(chunk)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredVoxel {
    pub index: u32,
    pub kind: u16,
    pub damage: u32,
}

/// On-disk form of a chunk: occupied slots only. Visibility is not stored;
/// a loaded chunk starts dirty and recomputes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedChunk {
    pub coord: ChunkCoord,
    pub width: u32,
    pub height: u32,
    pub voxels: Vec<StoredVoxel>,
}

impl SerializedChunk {
    /// Fails when the chunk has more slots than a `u32` index can address.
    pub fn from_chunk(chunk: &Chunk) -> Result<Self, StorageError> {
        let dims = chunk.dims();
        let volume = dims.checked_volume().unwrap_or(usize::MAX);
        if !dims.is_addressable() {
            return Err(StorageError::VolumeTooLarge {
                coord: chunk.coord(),
                volume,
            });
        }

        let voxels = chunk
            .occupied()
            .map(|(index, voxel)| {
                let index = u32::try_from(index).map_err(|_| StorageError::VolumeTooLarge {
                    coord: chunk.coord(),
                    volume,
                })?;
                Ok(StoredVoxel {
                    index,
                    kind: voxel.kind.raw(),
                    damage: voxel.damage,
                })
            })
            .collect::<Result<Vec<_>, StorageError>>()?;

        Ok(Self {
            coord: chunk.coord(),
            width: dims.width,
            height: dims.height,
            voxels,
        })
    }

    pub fn into_chunk(self, dims: ChunkDims) -> Result<Chunk, StorageError> {
        if (self.width, self.height) != (dims.width, dims.height) {
            return Err(StorageError::DimensionMismatch {
                coord: self.coord,
                expected: (dims.width, dims.height),
                found: (self.width, self.height),
            });
        }

        let mut chunk = Chunk::new(self.coord, dims);
        let volume = dims.volume();
        for stored in self.voxels {
            if stored.index as usize >= volume {
                return Err(StorageError::InvalidIndex {
                    index: stored.index,
                    volume,
                });
            }
            let kind = VoxelTypeId::from_raw(stored.kind).ok_or(StorageError::UnknownVoxelType(stored.kind))?;
            let mut voxel = Voxel::new(kind);
            voxel.damage = stored.damage;
            chunk.set_voxel(dims.coords(stored.index as usize), voxel);
        }
        Ok(chunk)
    }
}
