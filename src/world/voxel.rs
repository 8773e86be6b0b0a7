use crate::world::voxel_type::{VoxelKind, VoxelTypeId};
use bitflags::bitflags;
use glam::{I64Vec3, UVec3, Vec3};
use serde::{Deserialize, Serialize};

bitflags! {
    /// Faces of a voxel that border a non-opaque or missing neighbor.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct FaceMask: u8 {
        const POS_X = 1 << 0;
        const NEG_X = 1 << 1;
        const POS_Y = 1 << 2;
        const NEG_Y = 1 << 3;
        const POS_Z = 1 << 4;
        const NEG_Z = 1 << 5;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::PosX,
        Face::NegX,
        Face::PosY,
        Face::NegY,
        Face::PosZ,
        Face::NegZ,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// 0 for x, 1 for y, 2 for z.
    pub fn axis(self) -> usize {
        self.index() / 2
    }

    pub fn is_positive(self) -> bool {
        matches!(self, Face::PosX | Face::PosY | Face::PosZ)
    }

    pub fn opposite(self) -> Face {
        match self {
            Face::PosX => Face::NegX,
            Face::NegX => Face::PosX,
            Face::PosY => Face::NegY,
            Face::NegY => Face::PosY,
            Face::PosZ => Face::NegZ,
            Face::NegZ => Face::PosZ,
        }
    }

    pub fn offset(self) -> I64Vec3 {
        let mut offset = I64Vec3::ZERO;
        offset[self.axis()] = if self.is_positive() { 1 } else { -1 };
        offset
    }

    pub fn normal(self) -> Vec3 {
        self.offset().as_vec3()
    }

    pub fn mask(self) -> FaceMask {
        FaceMask::from_bits_retain(1 << self.index())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Voxel {
    pub kind: VoxelTypeId,
    /// Position inside the owning chunk; rewritten by the chunk on insertion.
    pub local: UVec3,
    pub damage: u32,
    pub visibility: FaceMask,
}

impl Voxel {
    pub fn new(kind: VoxelTypeId) -> Self {
        Self {
            kind,
            local: UVec3::ZERO,
            damage: 0,
            visibility: FaceMask::empty(),
        }
    }

    pub fn info(&self) -> &'static VoxelKind {
        self.kind.info()
    }

    pub fn is_opaque(&self) -> bool {
        self.info().opaque
    }

    pub fn is_solid(&self) -> bool {
        self.info().solid
    }

    pub fn is_fluid(&self) -> bool {
        self.info().fluid
    }

    pub fn is_visible(&self) -> bool {
        !self.visibility.is_empty()
    }
}

impl From<VoxelTypeId> for Voxel {
    fn from(kind: VoxelTypeId) -> Self {
        Self::new(kind)
    }
}
