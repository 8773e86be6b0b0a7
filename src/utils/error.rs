use crate::world::chunk_coord::ChunkCoord;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Chunk encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("Chunk {coord:?} was saved as {found:?}, world uses {expected:?}")]
    DimensionMismatch {
        coord: ChunkCoord,
        expected: (u32, u32),
        found: (u32, u32),
    },

    #[error("Chunk file holds {found:?}, expected {expected:?}")]
    CoordinateMismatch {
        expected: ChunkCoord,
        found: ChunkCoord,
    },

    #[error("Unknown voxel type id: {0}")]
    UnknownVoxelType(u16),

    #[error("Voxel slot {index} outside a chunk of {volume} slots")]
    InvalidIndex { index: u32, volume: usize },

    #[error("Chunk {coord:?} has {volume} slots, more than a stored index can address")]
    VolumeTooLarge { coord: ChunkCoord, volume: usize },
}

#[derive(Debug, Error)]
pub enum WorldError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, WorldError>;
