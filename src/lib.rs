pub mod config;
pub mod utils;
pub mod world;

// Re-export commonly used types
pub use config::{TerrainConfig, WorldConfig, WorldType};
pub use utils::error::{ConfigError, StorageError, WorldError};
pub use utils::math::{Ray, AABB};
pub use world::chunk::Chunk;
pub use world::chunk_coord::{ChunkCoord, ChunkDims};
pub use world::core::{TickReport, World};
pub use world::voxel::Voxel;
pub use world::voxel_type::VoxelTypeId;
