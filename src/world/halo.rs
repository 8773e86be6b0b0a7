use crate::world::chunk::Chunk;
use crate::world::chunk_coord::{ChunkCoord, ChunkDims};
use crate::world::grid::WorldGrid;
use crate::world::voxel::Face;
use glam::UVec3;

/// Opacity of the boundary layers of the six chunks around one chunk.
///
/// A visibility pass only needs to know whether the voxel just across a chunk
/// face is opaque, so the halo copies those layers out instead of holding
/// neighbor locks for the length of the pass.
#[derive(Debug, Clone, Default)]
pub struct NeighborHalo {
    layers: [Option<Vec<bool>>; 6],
}

impl NeighborHalo {
    /// A halo where every neighbor is missing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Copies the facing layers of the resident neighbors of `coord`.
    ///
    /// Each neighbor is locked with `try_lock`, one at a time. Returns `None`
    /// when any resident neighbor is currently locked elsewhere.
    pub fn capture(grid: &WorldGrid, coord: ChunkCoord) -> Option<Self> {
        let mut halo = Self::empty();
        for (face, neighbor) in coord.face_neighbors() {
            if let Some(handle) = grid.get(neighbor) {
                let chunk = handle.try_lock()?;
                halo.set(face, chunk.edge_layer(face.opposite()));
            }
        }
        Some(halo)
    }

    /// Builds a halo straight from neighbor chunks, keyed by the face of the center
    /// chunk they touch.
    pub fn from_chunks<'a>(neighbors: impl IntoIterator<Item = (Face, &'a Chunk)>) -> Self {
        let mut halo = Self::empty();
        for (face, chunk) in neighbors {
            halo.set(face, chunk.edge_layer(face.opposite()));
        }
        halo
    }

    pub fn set(&mut self, face: Face, layer: Vec<bool>) {
        self.layers[face.index()] = Some(layer);
    }

    pub fn has_neighbor(&self, face: Face) -> bool {
        self.layers[face.index()].is_some()
    }

    /// Whether the voxel across `face` from the boundary voxel at `local` is opaque.
    /// A missing neighbor chunk counts as empty space.
    pub fn is_opaque(&self, dims: ChunkDims, face: Face, local: UVec3) -> bool {
        self.layers[face.index()]
            .as_ref()
            .and_then(|layer| layer.get(dims.layer_index(face, local)))
            .copied()
            .unwrap_or(false)
    }
}
