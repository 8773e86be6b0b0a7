use crate::utils::math::{Ray, AABB};
use crate::world::chunk_coord::ChunkCoord;
use crate::world::grid::WorldGrid;
use crate::world::voxel::Voxel;
use glam::{I64Vec3, Vec3};

/// Closest voxel struck by a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoxelHit {
    pub near: f32,
    pub far: f32,
    /// Normal of the struck face, pointing back toward the ray origin.
    pub normal: Vec3,
    pub point: Vec3,
    pub chunk: ChunkCoord,
    pub local_index: usize,
    /// World position of the struck voxel.
    pub position: I64Vec3,
    pub voxel: Voxel,
}

impl VoxelHit {
    /// The empty cell in front of the struck face, where a placed voxel would go.
    pub fn place_position(&self) -> I64Vec3 {
        self.position + self.normal.as_i64vec3()
    }
}

pub fn chunk_bounds(grid: &WorldGrid, coord: ChunkCoord) -> AABB {
    let dims = grid.dims();
    let min = dims.chunk_min(coord);
    AABB::new(min, min + dims.extent().as_vec3())
}

/// Finds the nearest visible voxel along `ray` within its `max_distance`.
///
/// Chunks are culled by their bounds first; inside a chunk only voxels in the
/// visible set are tested. With `solid_only`, non-solid voxels such as water
/// are passed through.
pub fn raycast_grid(grid: &WorldGrid, ray: &Ray, solid_only: bool) -> Option<VoxelHit> {
    let mut best: Option<VoxelHit> = None;

    for (coord, handle) in grid.iter() {
        let entry = match ray.intersect_aabb(&chunk_bounds(grid, coord)) {
            Some(hit) if hit.near <= ray.max_distance => hit,
            _ => continue,
        };
        // everything in this chunk lies behind the current best hit
        if best.map_or(false, |best| entry.near > best.near) {
            continue;
        }

        let chunk = handle.lock();
        for index in chunk.visible_indices() {
            let Some(voxel) = chunk.voxel_at_index(index) else {
                continue;
            };
            if solid_only && !voxel.is_solid() {
                continue;
            }

            let position = chunk.dims().local_to_world(coord, voxel.local);
            let Some(hit) = ray.intersect_aabb(&AABB::unit(position.as_vec3())) else {
                continue;
            };
            if hit.near > ray.max_distance || best.map_or(false, |best| hit.near >= best.near) {
                continue;
            }

            best = Some(VoxelHit {
                near: hit.near,
                far: hit.far,
                normal: hit.normal,
                point: hit.point,
                chunk: coord,
                local_index: index,
                position,
                voxel: *voxel,
            });
        }
    }

    best
}
