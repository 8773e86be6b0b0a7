pub mod chunk;
pub mod chunk_coord;
pub mod core;
pub mod entity;
pub mod generator;
pub mod grid;
pub mod halo;
pub mod mesh;
pub mod moving;
pub mod raycast;
pub mod request;
pub mod sky;
pub mod storage;
pub mod voxel;
pub mod voxel_type;

// Re-export commonly used types
pub use self::core::{DamageOutcome, SaveSummary, TickReport, World, WorldStats};
pub use chunk::{Chunk, ChunkFlags, PassOutcome};
pub use chunk_coord::{ChunkCoord, ChunkDims};
pub use entity::Entity;
pub use generator::TerrainGenerator;
pub use grid::{ChunkHandle, WorldGrid};
pub use halo::NeighborHalo;
pub use mesh::{ChunkMesh, CollisionSink, FaceMesher, GeometryBuilder, VisibleVoxel};
pub use moving::MovingVoxel;
pub use raycast::VoxelHit;
pub use request::{ChunkRequest, RequestKind, RequestQueue};
pub use sky::Sky;
pub use storage::{ChunkStore, FileChunkStore, MemoryChunkStore, SerializedChunk};
pub use voxel::{Face, FaceMask, Voxel};
pub use voxel_type::{VoxelKind, VoxelTypeId, VOXEL_TYPES};
