use crate::world::chunk_coord::ChunkCoord;
use crate::world::voxel::{Face, Voxel};
use crate::world::voxel_type::FaceTextures;
use glam::{I64Vec3, Vec2, Vec3};

/// A voxel with at least one exposed face, as handed to geometry and collision builders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleVoxel {
    pub index: usize,
    pub position: I64Vec3,
    pub voxel: Voxel,
}

/// Builds renderable geometry for a chunk from its visible voxels, ordered by slot index.
pub trait GeometryBuilder: Send + Sync {
    fn build(&self, coord: ChunkCoord, origin: I64Vec3, visible: &[VisibleVoxel]) -> ChunkMesh;
}

/// Receives per-chunk geometry whenever a chunk is remeshed, so a physics layer can
/// rebuild its static collision shape. `remove` fires when the chunk leaves memory.
pub trait CollisionSink: Send + Sync {
    fn rebuild(&self, coord: ChunkCoord, mesh: &ChunkMesh);
    fn remove(&self, coord: ChunkCoord);
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChunkMesh {
    /// World position of the chunk's minimum corner; vertices are relative to it.
    pub origin: I64Vec3,
    pub vertices: Vec<f32>,   // 3D positions (x, y, z)
    pub normals: Vec<f32>,    // Normal vectors (nx, ny, nz)
    pub uvs: Vec<f32>,        // Atlas coordinates (u, v)
    pub voxel_ids: Vec<u32>,  // Voxel type per vertex
    pub indices: Vec<u32>,
    pub vertex_count: usize,
    pub index_count: usize,
}

impl ChunkMesh {
    pub fn new(origin: I64Vec3) -> Self {
        Self {
            origin,
            ..Self::default()
        }
    }

    pub fn add_face(&mut self, positions: &[Vec3; 4], normal: Vec3, uvs: &[Vec2; 4], voxel_id: u32) {
        let base_index = self.vertex_count as u32;

        for (pos, uv) in positions.iter().zip(uvs) {
            self.vertices.extend([pos.x, pos.y, pos.z]);
            self.normals.extend([normal.x, normal.y, normal.z]);
            self.uvs.extend([uv.x, uv.y]);
            self.voxel_ids.push(voxel_id);
            self.vertex_count += 1;
        }

        // two triangles per quad
        self.indices.extend([
            base_index,
            base_index + 1,
            base_index + 2,
            base_index + 2,
            base_index + 3,
            base_index,
        ]);
        self.index_count += 6;
    }

    pub fn face_count(&self) -> usize {
        self.index_count / 6
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_count == 0
    }
}

/// Default geometry builder: one textured quad per visible face.
#[derive(Debug, Clone, Copy, Default)]
pub struct FaceMesher;

impl FaceMesher {
    /// Corners of a unit face, counter-clockwise seen from outside.
    fn corners(face: Face) -> [Vec3; 4] {
        let v = Vec3::new;
        match face {
            Face::PosX => [v(1., 0., 0.), v(1., 1., 0.), v(1., 1., 1.), v(1., 0., 1.)],
            Face::NegX => [v(0., 0., 0.), v(0., 0., 1.), v(0., 1., 1.), v(0., 1., 0.)],
            Face::PosY => [v(0., 1., 0.), v(0., 1., 1.), v(1., 1., 1.), v(1., 1., 0.)],
            Face::NegY => [v(0., 0., 0.), v(1., 0., 0.), v(1., 0., 1.), v(0., 0., 1.)],
            Face::PosZ => [v(0., 0., 1.), v(1., 0., 1.), v(1., 1., 1.), v(0., 1., 1.)],
            Face::NegZ => [v(0., 0., 0.), v(0., 1., 0.), v(1., 1., 0.), v(1., 0., 0.)],
        }
    }

    fn tile_uvs(tile: [u8; 2]) -> [Vec2; 4] {
        let step = 1.0 / f32::from(FaceTextures::ATLAS_TILES);
        let min = Vec2::new(f32::from(tile[0]), f32::from(tile[1])) * step;
        let max = min + Vec2::splat(step);
        [
            Vec2::new(min.x, max.y),
            Vec2::new(min.x, min.y),
            Vec2::new(max.x, min.y),
            Vec2::new(max.x, max.y),
        ]
    }
}

impl GeometryBuilder for FaceMesher {
    fn build(&self, _coord: ChunkCoord, origin: I64Vec3, visible: &[VisibleVoxel]) -> ChunkMesh {
        let mut mesh = ChunkMesh::new(origin);

        for entry in visible {
            let offset = (entry.position - origin).as_vec3();
            let textures = entry.voxel.info().textures;

            for face in Face::ALL {
                if !entry.voxel.visibility.contains(face.mask()) {
                    continue;
                }
                let positions = Self::corners(face).map(|corner| corner + offset);
                let uvs = Self::tile_uvs(textures.tile(face));
                mesh.add_face(&positions, face.normal(), &uvs, u32::from(entry.voxel.kind.raw()));
            }
        }

        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::voxel::FaceMask;
    use crate::world::voxel_type::VoxelTypeId;
    use glam::UVec3;

    fn visible(position: I64Vec3, visibility: FaceMask) -> VisibleVoxel {
        let mut voxel = Voxel::new(VoxelTypeId::STONE);
        voxel.local = UVec3::ZERO;
        voxel.visibility = visibility;
        VisibleVoxel {
            index: 0,
            position,
            voxel,
        }
    }

    #[test]
    fn test_corner_winding_matches_normal() {
        for face in Face::ALL {
            let c = FaceMesher::corners(face);
            let cross = (c[1] - c[0]).cross(c[2] - c[0]);
            assert_eq!(cross, face.normal(), "{face:?}");
        }
    }

    #[test]
    fn test_one_quad_per_visible_face() {
        let origin = I64Vec3::new(16, 0, 16);
        let voxels = [
            visible(I64Vec3::new(17, 2, 16), FaceMask::all()),
            visible(I64Vec3::new(18, 2, 16), FaceMask::POS_Y | FaceMask::NEG_X),
        ];
        let mesh = FaceMesher.build(ChunkCoord::new(1, 0, 1), origin, &voxels);

        assert_eq!(mesh.face_count(), 8);
        assert_eq!(mesh.vertex_count, 32);
        assert_eq!(mesh.indices.len(), 48);
        assert_eq!(mesh.voxel_ids.len(), mesh.vertex_count);
        // first vertex of the first voxel's +X face, chunk-relative
        assert_eq!(&mesh.vertices[0..3], &[2.0, 2.0, 0.0]);
    }

    #[test]
    fn test_empty_input_builds_empty_mesh() {
        let mesh = FaceMesher.build(ChunkCoord::new(0, 0, 0), I64Vec3::ZERO, &[]);
        assert!(mesh.is_empty());
        assert_eq!(mesh.origin, I64Vec3::ZERO);
    }
}
