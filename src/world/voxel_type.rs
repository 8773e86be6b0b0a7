use crate::world::voxel::{Face, Voxel};

/// Called on a voxel when the neighbor across `face` changed; `neighbor` is the
/// new occupant (`None` after a removal). Returns true when the voxel was modified.
pub type NeighborHook = fn(voxel: &mut Voxel, face: Face, neighbor: Option<&Voxel>) -> bool;

/// Atlas tile coordinates (column, row) in a 16x16 texture atlas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceTextures {
    pub top: [u8; 2],
    pub bottom: [u8; 2],
    pub side: [u8; 2],
}

impl FaceTextures {
    pub const ATLAS_TILES: u8 = 16;

    const fn uniform(tile: [u8; 2]) -> Self {
        Self {
            top: tile,
            bottom: tile,
            side: tile,
        }
    }

    pub fn tile(&self, face: Face) -> [u8; 2] {
        match face {
            Face::PosY => self.top,
            Face::NegY => self.bottom,
            _ => self.side,
        }
    }
}

pub struct VoxelKind {
    pub name: &'static str,
    pub opaque: bool,
    pub fluid: bool,
    pub solid: bool,
    /// Damage needed to destroy the voxel. Zero means indestructible.
    pub hardness: u32,
    pub textures: FaceTextures,
    pub on_neighbor_changed: Option<NeighborHook>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoxelTypeId(u16);

impl VoxelTypeId {
    pub const STONE: Self = Self(0);
    pub const DIRT: Self = Self(1);
    pub const GRASS: Self = Self(2);
    pub const WATER: Self = Self(3);
    pub const SAND: Self = Self(4);
    pub const GLASS: Self = Self(5);
    pub const LOG: Self = Self(6);
    pub const LEAVES: Self = Self(7);

    pub fn from_raw(raw: u16) -> Option<Self> {
        if usize::from(raw) < VOXEL_TYPES.len() {
            Some(Self(raw))
        } else {
            None
        }
    }

    pub fn raw(self) -> u16 {
        self.0
    }

    pub fn by_name(name: &str) -> Option<Self> {
        VOXEL_TYPES
            .iter()
            .position(|kind| kind.name.eq_ignore_ascii_case(name))
            .and_then(|index| u16::try_from(index).ok())
            .map(Self)
    }

    pub fn info(self) -> &'static VoxelKind {
        &VOXEL_TYPES[usize::from(self.0)]
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }
}

/// Grass dies back to dirt once something opaque covers it.
fn grass_neighbor_changed(voxel: &mut Voxel, face: Face, neighbor: Option<&Voxel>) -> bool {
    if face == Face::PosY && neighbor.map_or(false, Voxel::is_opaque) {
        voxel.kind = VoxelTypeId::DIRT;
        return true;
    }
    false
}

/// Built-in voxel types, indexed by `VoxelTypeId`.
pub static VOXEL_TYPES: [VoxelKind; 8] = [
    VoxelKind {
        name: "stone",
        opaque: true,
        fluid: false,
        solid: true,
        hardness: 6,
        textures: FaceTextures::uniform([1, 0]),
        on_neighbor_changed: None,
    },
    VoxelKind {
        name: "dirt",
        opaque: true,
        fluid: false,
        solid: true,
        hardness: 2,
        textures: FaceTextures::uniform([2, 0]),
        on_neighbor_changed: None,
    },
    VoxelKind {
        name: "grass",
        opaque: true,
        fluid: false,
        solid: true,
        hardness: 2,
        textures: FaceTextures {
            top: [0, 0],
            bottom: [2, 0],
            side: [3, 0],
        },
        on_neighbor_changed: Some(grass_neighbor_changed),
    },
    VoxelKind {
        name: "water",
        opaque: false,
        fluid: true,
        solid: false,
        hardness: 0,
        textures: FaceTextures::uniform([13, 12]),
        on_neighbor_changed: None,
    },
    VoxelKind {
        name: "sand",
        opaque: true,
        fluid: false,
        solid: true,
        hardness: 2,
        textures: FaceTextures::uniform([2, 1]),
        on_neighbor_changed: None,
    },
    VoxelKind {
        name: "glass",
        opaque: false,
        fluid: false,
        solid: true,
        hardness: 1,
        textures: FaceTextures::uniform([1, 3]),
        on_neighbor_changed: None,
    },
    VoxelKind {
        name: "log",
        opaque: true,
        fluid: false,
        solid: true,
        hardness: 4,
        textures: FaceTextures {
            top: [5, 1],
            bottom: [5, 1],
            side: [4, 1],
        },
        on_neighbor_changed: None,
    },
    VoxelKind {
        name: "leaves",
        opaque: false,
        fluid: false,
        solid: true,
        hardness: 1,
        textures: FaceTextures::uniform([4, 3]),
        on_neighbor_changed: None,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_name_and_raw() {
        assert_eq!(VoxelTypeId::by_name("grass"), Some(VoxelTypeId::GRASS));
        assert_eq!(VoxelTypeId::by_name("Stone"), Some(VoxelTypeId::STONE));
        assert_eq!(VoxelTypeId::by_name("lava"), None);
        assert_eq!(VoxelTypeId::from_raw(7), Some(VoxelTypeId::LEAVES));
        assert_eq!(VoxelTypeId::from_raw(8), None);
        assert_eq!(VoxelTypeId::WATER.name(), "water");
    }

    #[test]
    fn test_grass_turns_to_dirt_under_opaque() {
        let mut grass = Voxel::new(VoxelTypeId::GRASS);
        let glass = Voxel::new(VoxelTypeId::GLASS);
        let stone = Voxel::new(VoxelTypeId::STONE);
        let hook = VoxelTypeId::GRASS.info().on_neighbor_changed.unwrap();

        assert!(!hook(&mut grass, Face::PosY, Some(&glass)));
        assert!(!hook(&mut grass, Face::PosX, Some(&stone)));
        assert!(!hook(&mut grass, Face::PosY, None));
        assert_eq!(grass.kind, VoxelTypeId::GRASS);

        assert!(hook(&mut grass, Face::PosY, Some(&stone)));
        assert_eq!(grass.kind, VoxelTypeId::DIRT);
    }

    #[test]
    fn test_side_texture_selection() {
        let textures = VoxelTypeId::GRASS.info().textures;
        assert_eq!(textures.tile(Face::PosY), [0, 0]);
        assert_eq!(textures.tile(Face::NegZ), [3, 0]);
    }
}
