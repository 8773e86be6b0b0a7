use crate::world::chunk_coord::{ChunkCoord, ChunkDims};
use crate::world::halo::NeighborHalo;
use crate::world::mesh::{ChunkMesh, GeometryBuilder, VisibleVoxel};
use crate::world::voxel::{Face, FaceMask, Voxel};
use bitflags::bitflags;
use glam::{I64Vec3, UVec3};
use std::collections::HashSet;

bitflags! {
    /// Dirty state of a chunk. `MESH_INVALID` is only ever raised while
    /// `DATA_UPDATED` is set, so it never appears on its own.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ChunkFlags: u8 {
        const DATA_UPDATED = 1 << 0;
        const MESH_INVALID = 1 << 1;
    }
}

/// What a call to [`Chunk::request_generate`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// `DATA_UPDATED` was not set.
    Clean,
    /// Visibility was recomputed and matched the last mesh.
    Refreshed,
    /// Visibility changed and the geometry was rebuilt.
    Remeshed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    coord: ChunkCoord,
    dims: ChunkDims,
    voxels: Vec<Option<Voxel>>,
    visible: HashSet<usize>,
    flags: ChunkFlags,
    /// Set when a write dropped a slot from the visible set, which the next
    /// visibility pass cannot detect by itself.
    visible_dirty: bool,
    /// Bumped on every write so a pass can tell whether the data moved underneath it.
    epoch: u64,
    geometry: Option<ChunkMesh>,
}

impl Chunk {
    pub fn new(coord: ChunkCoord, dims: ChunkDims) -> Self {
        Self {
            coord,
            dims,
            voxels: vec![None; dims.volume()],
            visible: HashSet::new(),
            flags: ChunkFlags::DATA_UPDATED,
            visible_dirty: false,
            epoch: 0,
            geometry: None,
        }
    }

    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    pub fn dims(&self) -> ChunkDims {
        self.dims
    }

    pub fn origin(&self) -> I64Vec3 {
        self.dims.chunk_origin(self.coord)
    }

    pub fn flags(&self) -> ChunkFlags {
        self.flags
    }

    pub fn is_dirty(&self) -> bool {
        self.flags.contains(ChunkFlags::DATA_UPDATED)
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn geometry(&self) -> Option<&ChunkMesh> {
        self.geometry.as_ref()
    }

    pub fn voxel(&self, local: UVec3) -> Option<&Voxel> {
        self.voxels.get(self.dims.index(local))?.as_ref()
    }

    pub fn voxel_at_index(&self, index: usize) -> Option<&Voxel> {
        self.voxels.get(index)?.as_ref()
    }

    /// Occupied slots as `(index, voxel)`.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, &Voxel)> + '_ {
        self.voxels
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|voxel| (index, voxel)))
    }

    pub fn is_empty(&self) -> bool {
        self.voxels.iter().all(Option::is_none)
    }

    pub fn is_visible(&self, index: usize) -> bool {
        self.visible.contains(&index)
    }

    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    /// Visible slot indices in ascending order.
    pub fn visible_indices(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = self.visible.iter().copied().collect();
        indices.sort_unstable();
        indices
    }

    pub fn visible_voxels(&self) -> Vec<VisibleVoxel> {
        self.visible_indices()
            .into_iter()
            .filter_map(|index| {
                let voxel = *self.voxel_at_index(index)?;
                Some(VisibleVoxel {
                    index,
                    position: self.dims.local_to_world(self.coord, voxel.local),
                    voxel,
                })
            })
            .collect()
    }

    /// Marks the chunk as needing a visibility pass.
    pub fn mark_dirty(&mut self) {
        self.flags.insert(ChunkFlags::DATA_UPDATED);
        self.epoch = self.epoch.wrapping_add(1);
    }

    /// Writes `voxel` into the slot at `local`, returning the previous occupant.
    /// The stored voxel starts with no visible faces until the next pass.
    pub fn set_voxel(&mut self, local: UVec3, mut voxel: Voxel) -> Option<Voxel> {
        let index = self.dims.index(local);
        voxel.local = local;
        voxel.visibility = FaceMask::empty();

        let previous = self.voxels[index].replace(voxel);
        if self.visible.remove(&index) {
            self.visible_dirty = true;
        }
        self.mark_dirty();
        previous
    }

    pub fn remove_voxel(&mut self, local: UVec3) -> Option<Voxel> {
        let index = self.dims.index(local);
        let previous = self.voxels[index].take();
        if previous.is_some() {
            if self.visible.remove(&index) {
                self.visible_dirty = true;
            }
            self.mark_dirty();
        }
        previous
    }

    /// Applies `edit` to the voxel at `local` in place. The chunk is marked dirty
    /// when `edit` reports a change.
    pub fn update_voxel<F>(&mut self, local: UVec3, edit: F) -> bool
    where
        F: FnOnce(&mut Voxel) -> bool,
    {
        let index = self.dims.index(local);
        let changed = match self.voxels[index].as_mut() {
            Some(voxel) => edit(voxel),
            None => false,
        };
        if changed {
            self.mark_dirty();
        }
        changed
    }

    /// Opacity of the outermost layer on the `side` face, in `ChunkDims::layer_index` order.
    pub fn edge_layer(&self, side: Face) -> Vec<bool> {
        let mut layer = vec![false; self.dims.layer_len(side)];
        for (index, voxel) in self.occupied() {
            let local = self.dims.coords(index);
            if self.dims.on_boundary(local, side) {
                layer[self.dims.layer_index(side, local)] = voxel.is_opaque();
            }
        }
        layer
    }

    fn face_mask(&self, local: UVec3, halo: &NeighborHalo) -> FaceMask {
        let mut mask = FaceMask::empty();
        for face in Face::ALL {
            let covered = match self.dims.step(local, face) {
                Some(next) => self.voxel(next).map_or(false, Voxel::is_opaque),
                None => halo.is_opaque(self.dims, face, local),
            };
            if !covered {
                mask |= face.mask();
            }
        }
        mask
    }

    /// Recomputes every face mask and the visible set. Returns true when
    /// anything differs from the previous pass.
    fn update_visibility(&mut self, halo: &NeighborHalo) -> bool {
        let mut changed = std::mem::take(&mut self.visible_dirty);

        for index in 0..self.voxels.len() {
            let Some(current) = self.voxels[index].map(|voxel| voxel.visibility) else {
                continue;
            };
            let mask = self.face_mask(self.dims.coords(index), halo);

            if mask != current {
                changed = true;
                if let Some(voxel) = self.voxels[index].as_mut() {
                    voxel.visibility = mask;
                }
            }

            let membership_changed = if mask.is_empty() {
                self.visible.remove(&index)
            } else {
                self.visible.insert(index)
            };
            changed |= membership_changed;
        }

        changed
    }

    /// Runs the dirty-flag state machine once: visibility when data changed,
    /// then geometry when visibility changed.
    pub fn request_generate(&mut self, halo: &NeighborHalo, builder: &dyn GeometryBuilder) -> PassOutcome {
        if !self.flags.contains(ChunkFlags::DATA_UPDATED) {
            return PassOutcome::Clean;
        }

        if self.update_visibility(halo) {
            self.flags.insert(ChunkFlags::MESH_INVALID);
        }

        let mut outcome = PassOutcome::Refreshed;
        if self.flags.contains(ChunkFlags::MESH_INVALID) {
            let visible = self.visible_voxels();
            self.geometry = Some(builder.build(self.coord, self.origin(), &visible));
            self.flags.remove(ChunkFlags::MESH_INVALID);
            outcome = PassOutcome::Remeshed;
        }

        self.flags.remove(ChunkFlags::DATA_UPDATED);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::mesh::FaceMesher;
    use crate::world::voxel_type::VoxelTypeId;

    fn test_chunk() -> Chunk {
        Chunk::new(ChunkCoord::new(0, 0, 0), ChunkDims::new(4, 4))
    }

    fn stone() -> Voxel {
        Voxel::new(VoxelTypeId::STONE)
    }

    /// Visible set membership must match non-empty face masks exactly.
    fn assert_visibility_consistent(chunk: &Chunk) {
        for (index, voxel) in chunk.occupied() {
            assert_eq!(chunk.is_visible(index), voxel.is_visible(), "slot {index}");
        }
        for index in chunk.visible_indices() {
            assert!(chunk.voxel_at_index(index).is_some(), "empty slot {index} visible");
        }
    }

    #[test]
    fn test_new_chunk_is_data_updated() {
        let chunk = test_chunk();
        assert_eq!(chunk.flags(), ChunkFlags::DATA_UPDATED);
        assert!(chunk.is_empty());
        assert!(chunk.geometry().is_none());
    }

    #[test]
    fn test_clean_chunk_pass_is_noop() {
        let mut chunk = test_chunk();
        let halo = NeighborHalo::empty();
        assert_eq!(chunk.request_generate(&halo, &FaceMesher), PassOutcome::Refreshed);
        assert_eq!(chunk.request_generate(&halo, &FaceMesher), PassOutcome::Clean);
        assert_eq!(chunk.flags(), ChunkFlags::empty());
    }

    #[test]
    fn test_single_voxel_shows_all_faces() {
        let mut chunk = test_chunk();
        chunk.set_voxel(UVec3::new(1, 1, 1), stone());
        let outcome = chunk.request_generate(&NeighborHalo::empty(), &FaceMesher);

        assert_eq!(outcome, PassOutcome::Remeshed);
        assert_eq!(chunk.flags(), ChunkFlags::empty());
        let voxel = chunk.voxel(UVec3::new(1, 1, 1)).unwrap();
        assert_eq!(voxel.visibility, FaceMask::all());
        assert_eq!(voxel.local, UVec3::new(1, 1, 1));
        assert_eq!(chunk.geometry().unwrap().face_count(), 6);
        assert_visibility_consistent(&chunk);
    }

    #[test]
    fn test_adjacent_opaque_voxels_hide_shared_faces() {
        let mut chunk = test_chunk();
        chunk.set_voxel(UVec3::new(1, 1, 1), stone());
        chunk.set_voxel(UVec3::new(2, 1, 1), stone());
        chunk.request_generate(&NeighborHalo::empty(), &FaceMesher);

        let left = chunk.voxel(UVec3::new(1, 1, 1)).unwrap();
        let right = chunk.voxel(UVec3::new(2, 1, 1)).unwrap();
        assert!(!left.visibility.contains(FaceMask::POS_X));
        assert!(!right.visibility.contains(FaceMask::NEG_X));
        assert_eq!(chunk.geometry().unwrap().face_count(), 10);
        assert_visibility_consistent(&chunk);
    }

    #[test]
    fn test_non_opaque_neighbor_keeps_face_visible() {
        let mut chunk = test_chunk();
        chunk.set_voxel(UVec3::new(1, 1, 1), stone());
        chunk.set_voxel(UVec3::new(1, 2, 1), Voxel::new(VoxelTypeId::GLASS));
        chunk.request_generate(&NeighborHalo::empty(), &FaceMesher);

        let below = chunk.voxel(UVec3::new(1, 1, 1)).unwrap();
        assert!(below.visibility.contains(FaceMask::POS_Y));
        // glass sits on opaque stone, so its bottom face is hidden
        let above = chunk.voxel(UVec3::new(1, 2, 1)).unwrap();
        assert!(!above.visibility.contains(FaceMask::NEG_Y));
    }

    #[test]
    fn test_enclosed_voxel_leaves_visible_set() {
        let mut chunk = test_chunk();
        let center = UVec3::new(1, 1, 1);
        chunk.set_voxel(center, stone());
        for face in Face::ALL {
            let next = chunk.dims().step(center, face).unwrap();
            chunk.set_voxel(next, stone());
        }
        chunk.request_generate(&NeighborHalo::empty(), &FaceMesher);

        let index = chunk.dims().index(center);
        assert!(!chunk.is_visible(index));
        assert!(chunk.voxel(center).unwrap().visibility.is_empty());
        assert_eq!(chunk.visible_count(), 6);
        assert_visibility_consistent(&chunk);

        // opening one side exposes the center again
        chunk.remove_voxel(UVec3::new(1, 2, 1));
        assert!(chunk.is_dirty());
        assert_eq!(chunk.request_generate(&NeighborHalo::empty(), &FaceMesher), PassOutcome::Remeshed);
        assert!(chunk.is_visible(index));
        assert_eq!(chunk.voxel(center).unwrap().visibility, FaceMask::POS_Y);
        assert_visibility_consistent(&chunk);
    }

    #[test]
    fn test_removing_visible_voxel_invalidates_mesh() {
        let mut chunk = test_chunk();
        chunk.set_voxel(UVec3::new(0, 0, 0), stone());
        chunk.request_generate(&NeighborHalo::empty(), &FaceMesher);
        assert_eq!(chunk.visible_count(), 1);

        chunk.remove_voxel(UVec3::new(0, 0, 0));
        assert_eq!(chunk.visible_count(), 0);
        assert_eq!(chunk.request_generate(&NeighborHalo::empty(), &FaceMesher), PassOutcome::Remeshed);
        assert!(chunk.geometry().unwrap().is_empty());
    }

    #[test]
    fn test_removing_empty_slot_leaves_chunk_clean() {
        let mut chunk = test_chunk();
        chunk.request_generate(&NeighborHalo::empty(), &FaceMesher);
        assert!(chunk.remove_voxel(UVec3::new(2, 2, 2)).is_none());
        assert!(!chunk.is_dirty());
    }

    #[test]
    fn test_halo_hides_boundary_faces() {
        let dims = ChunkDims::new(4, 4);
        let mut neighbor = Chunk::new(ChunkCoord::new(1, 0, 0), dims);
        neighbor.set_voxel(UVec3::new(0, 2, 3), stone());

        let mut chunk = test_chunk();
        chunk.set_voxel(UVec3::new(3, 2, 3), stone());
        chunk.set_voxel(UVec3::new(3, 1, 3), stone());

        let halo = NeighborHalo::from_chunks([(Face::PosX, &neighbor)]);
        assert!(halo.has_neighbor(Face::PosX));
        assert!(!halo.has_neighbor(Face::NegX));
        chunk.request_generate(&halo, &FaceMesher);

        let covered = chunk.voxel(UVec3::new(3, 2, 3)).unwrap();
        assert!(!covered.visibility.contains(FaceMask::POS_X));
        let open = chunk.voxel(UVec3::new(3, 1, 3)).unwrap();
        assert!(open.visibility.contains(FaceMask::POS_X));
    }

    #[test]
    fn test_edge_layer_indexing() {
        let dims = ChunkDims::new(4, 2);
        let mut chunk = Chunk::new(ChunkCoord::new(0, 0, 0), dims);
        chunk.set_voxel(UVec3::new(0, 1, 2), stone());
        chunk.set_voxel(UVec3::new(0, 0, 0), Voxel::new(VoxelTypeId::WATER));

        let layer = chunk.edge_layer(Face::NegX);
        assert_eq!(layer.len(), 8);
        assert!(layer[1 + 2 * 2]);
        assert!(!layer[0]);
        assert_eq!(layer.iter().filter(|opaque| **opaque).count(), 1);
        assert!(chunk.edge_layer(Face::PosX).iter().all(|opaque| !opaque));
    }

    #[test]
    fn test_update_voxel_marks_dirty_on_change() {
        let mut chunk = test_chunk();
        chunk.set_voxel(UVec3::new(1, 1, 1), stone());
        chunk.request_generate(&NeighborHalo::empty(), &FaceMesher);
        let epoch = chunk.epoch();

        assert!(!chunk.update_voxel(UVec3::new(1, 1, 1), |_| false));
        assert!(!chunk.update_voxel(UVec3::new(2, 2, 2), |_| true));
        assert!(!chunk.is_dirty());

        assert!(chunk.update_voxel(UVec3::new(1, 1, 1), |voxel| {
            voxel.damage += 1;
            true
        }));
        assert!(chunk.is_dirty());
        assert_ne!(chunk.epoch(), epoch);
        assert_eq!(chunk.voxel(UVec3::new(1, 1, 1)).unwrap().damage, 1);
    }
}
