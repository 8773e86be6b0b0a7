use crate::world::voxel::Face;
use glam::{I64Vec3, UVec3, Vec3};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkCoord(pub I64Vec3);

impl Serialize for ChunkCoord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (self.0.x, self.0.y, self.0.z).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ChunkCoord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (x, y, z) = <(i64, i64, i64)>::deserialize(deserializer)?;
        Ok(ChunkCoord::new(x, y, z))
    }
}

impl PartialOrd for ChunkCoord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ChunkCoord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .x
            .cmp(&other.0.x)
            .then(self.0.y.cmp(&other.0.y))
            .then(self.0.z.cmp(&other.0.z))
    }
}

impl ChunkCoord {
    pub fn new(x: i64, y: i64, z: i64) -> Self {
        Self(I64Vec3::new(x, y, z))
    }

    pub fn x(&self) -> i64 {
        self.0.x
    }

    pub fn y(&self) -> i64 {
        self.0.y
    }

    pub fn z(&self) -> i64 {
        self.0.z
    }

    pub fn offset(&self, face: Face) -> Self {
        Self(self.0 + face.offset())
    }

    /// The six chunks sharing a face with this one.
    pub fn face_neighbors(&self) -> [(Face, ChunkCoord); 6] {
        Face::ALL.map(|face| (face, self.offset(face)))
    }

    pub fn to_path(&self) -> PathBuf {
        PathBuf::from(format!("chunk_{}_{}_{}.bin", self.0.x, self.0.y, self.0.z))
    }

    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let invalid = |msg: &str| std::io::Error::new(std::io::ErrorKind::InvalidInput, msg.to_string());

        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| invalid("Invalid filename"))?;

        let coords = file_name
            .strip_prefix("chunk_")
            .and_then(|rest| rest.strip_suffix(".bin"))
            .ok_or_else(|| invalid("Invalid chunk file format"))?
            .split('_')
            .map(str::parse::<i64>)
            .collect::<Result<Vec<i64>, _>>()
            .map_err(|_| invalid("Invalid coordinates"))?;

        match coords[..] {
            [x, y, z] => Ok(Self::new(x, y, z)),
            _ => Err(invalid("Invalid coordinate count")),
        }
    }
}

impl From<I64Vec3> for ChunkCoord {
    fn from(vec: I64Vec3) -> Self {
        Self(vec)
    }
}

impl From<ChunkCoord> for I64Vec3 {
    fn from(coord: ChunkCoord) -> Self {
        coord.0
    }
}

/// Voxel dimensions of every chunk in a world: `width` along x and z, `height` along y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkDims {
    pub width: u32,
    pub height: u32,
}

impl ChunkDims {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn volume(&self) -> usize {
        let (w, h) = (self.width as usize, self.height as usize);
        w * h * w
    }

    /// Slot count, or `None` when it overflows `usize`.
    pub fn checked_volume(&self) -> Option<usize> {
        let (w, h) = (self.width as usize, self.height as usize);
        w.checked_mul(h)?.checked_mul(w)
    }

    /// Whether every slot index fits in the `u32` used by stored chunks.
    pub fn is_addressable(&self) -> bool {
        self.checked_volume()
            .map_or(false, |volume| u32::try_from(volume).is_ok())
    }

    pub fn extent(&self) -> UVec3 {
        UVec3::new(self.width, self.height, self.width)
    }

    pub fn contains(&self, local: UVec3) -> bool {
        local.cmplt(self.extent()).all()
    }

    /// Dense slot index, x fastest: `x + y*W + z*W*H`.
    pub fn index(&self, local: UVec3) -> usize {
        let (w, h) = (self.width as usize, self.height as usize);
        local.x as usize + local.y as usize * w + local.z as usize * w * h
    }

    pub fn coords(&self, index: usize) -> UVec3 {
        let (w, h) = (self.width as usize, self.height as usize);
        UVec3::new(
            (index % w) as u32,
            ((index / w) % h) as u32,
            (index / (w * h)) as u32,
        )
    }

    /// Splits a world voxel position into its chunk and the local position inside it.
    /// Uses floor division, so local coordinates are never negative.
    pub fn world_to_chunk(&self, world: I64Vec3) -> (ChunkCoord, UVec3) {
        let (w, h) = (i64::from(self.width), i64::from(self.height));
        let coord = ChunkCoord::new(world.x.div_euclid(w), world.y.div_euclid(h), world.z.div_euclid(w));
        let local = UVec3::new(
            world.x.rem_euclid(w) as u32,
            world.y.rem_euclid(h) as u32,
            world.z.rem_euclid(w) as u32,
        );
        (coord, local)
    }

    pub fn chunk_origin(&self, coord: ChunkCoord) -> I64Vec3 {
        coord.0 * self.extent().as_i64vec3()
    }

    pub fn local_to_world(&self, coord: ChunkCoord, local: UVec3) -> I64Vec3 {
        self.chunk_origin(coord) + local.as_i64vec3()
    }

    pub fn chunk_min(&self, coord: ChunkCoord) -> Vec3 {
        self.chunk_origin(coord).as_vec3()
    }

    /// Neighboring slot across `face`, if it is inside the same chunk.
    pub fn step(&self, local: UVec3, face: Face) -> Option<UVec3> {
        if self.on_boundary(local, face) {
            return None;
        }
        Some((local.as_i64vec3() + face.offset()).as_uvec3())
    }

    /// True when `local` lies in the outermost layer on the `face` side.
    pub fn on_boundary(&self, local: UVec3, face: Face) -> bool {
        let axis = face.axis();
        if face.is_positive() {
            local[axis] + 1 == self.extent()[axis]
        } else {
            local[axis] == 0
        }
    }

    pub fn boundary_faces(&self, local: UVec3) -> impl Iterator<Item = Face> {
        let dims = *self;
        Face::ALL
            .into_iter()
            .filter(move |face| dims.on_boundary(local, *face))
    }

    /// Number of slots in the boundary layer facing `face`.
    pub fn layer_len(&self, face: Face) -> usize {
        let (w, h) = (self.width as usize, self.height as usize);
        match face.axis() {
            1 => w * w,
            _ => w * h,
        }
    }

    /// Position of `local` within a boundary layer perpendicular to `face`.
    /// X layers are indexed `y + z*H`, Y layers `x + z*W`, Z layers `x + y*W`.
    pub fn layer_index(&self, face: Face, local: UVec3) -> usize {
        let (w, h) = (self.width as usize, self.height as usize);
        let (x, y, z) = (local.x as usize, local.y as usize, local.z as usize);
        match face.axis() {
            0 => y + z * h,
            1 => x + z * w,
            _ => x + y * w,
        }
    }
}

impl Default for ChunkDims {
    fn default() -> Self {
        Self::new(16, 16)
    }
}
