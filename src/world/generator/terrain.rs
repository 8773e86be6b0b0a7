use crate::config::terrain::{TerrainConfig, WorldType};
use crate::world::chunk::Chunk;
use crate::world::chunk_coord::{ChunkCoord, ChunkDims};
use crate::world::generator::noise::interpolated_noise;
use crate::world::voxel::Voxel;
use crate::world::voxel_type::VoxelTypeId;
use glam::UVec3;
use log::warn;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;

/// Lattice offsets drawn from the seed stay well inside i32 after frequency scaling.
const SEED_OFFSET_RANGE: i32 = 1 << 16;

/// Fills chunks procedurally. Output depends only on the chunk coordinate and the config.
pub struct TerrainGenerator {
    config: TerrainConfig,
    offset_x: f64,
    offset_z: f64,
    flat_layers: Vec<(VoxelTypeId, u32)>,
}

impl TerrainGenerator {
    pub fn new(config: TerrainConfig) -> Self {
        let mut rng = ChaCha12Rng::seed_from_u64(config.seed);
        let offset_x = f64::from(rng.gen_range(-SEED_OFFSET_RANGE..SEED_OFFSET_RANGE));
        let offset_z = f64::from(rng.gen_range(-SEED_OFFSET_RANGE..SEED_OFFSET_RANGE));

        let flat_layers = config
            .flat_layers
            .iter()
            .filter_map(|layer| match VoxelTypeId::by_name(&layer.voxel) {
                Some(kind) => Some((kind, layer.thickness)),
                None => {
                    warn!("Flat layer voxel '{}' not found in voxel table", layer.voxel);
                    None
                }
            })
            .collect();

        Self {
            config,
            offset_x,
            offset_z,
            flat_layers,
        }
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    /// Sum of the noise octaves at a world column, before vertical scaling.
    fn octave_sum(&self, x: i64, z: i64) -> f64 {
        let mut total = 0.0;
        let mut frequency = self.config.frequency;
        let mut amplitude = 1.0;
        for _ in 0..self.config.octaves {
            total += interpolated_noise(
                x as f64 * frequency + self.offset_x,
                z as f64 * frequency + self.offset_z,
            ) * amplitude;
            frequency *= 2.0;
            amplitude *= self.config.persistence;
        }
        total
    }

    /// Terrain surface height of a world column; voxels below it are solid.
    pub fn surface_height(&self, x: i64, z: i64) -> f64 {
        self.config.base_height + self.octave_sum(x, z) * self.config.amplitude
    }

    /// Voxel type of a column cell at world height `y` under a surface at `height`.
    fn column_voxel(&self, y: i64, height: f64) -> Option<VoxelTypeId> {
        let y = y as f64;
        if y < height - 5.0 {
            Some(VoxelTypeId::STONE)
        } else if y < height - 1.0 {
            Some(VoxelTypeId::DIRT)
        } else if y < height {
            Some(VoxelTypeId::GRASS)
        } else if y < self.config.sea_level as f64 {
            Some(VoxelTypeId::WATER)
        } else {
            None
        }
    }

    fn flat_voxel(&self, y: i64) -> Option<VoxelTypeId> {
        if y < 0 {
            return None;
        }
        let mut top = 0i64;
        for (kind, thickness) in &self.flat_layers {
            top += i64::from(*thickness);
            if y < top {
                return Some(*kind);
            }
        }
        None
    }

    pub fn generate(&self, coord: ChunkCoord, dims: ChunkDims) -> Chunk {
        let mut chunk = Chunk::new(coord, dims);
        if self.config.world_type == WorldType::Void {
            return chunk;
        }

        let origin = dims.chunk_origin(coord);
        for lz in 0..dims.width {
            for lx in 0..dims.width {
                let world_x = origin.x + i64::from(lx);
                let world_z = origin.z + i64::from(lz);
                let height = match self.config.world_type {
                    WorldType::Normal => self.surface_height(world_x, world_z),
                    _ => 0.0,
                };

                for ly in 0..dims.height {
                    let world_y = origin.y + i64::from(ly);
                    let kind = match self.config.world_type {
                        WorldType::Normal => self.column_voxel(world_y, height),
                        WorldType::Flat => self.flat_voxel(world_y),
                        WorldType::Void => None,
                    };
                    if let Some(kind) = kind {
                        chunk.set_voxel(UVec3::new(lx, ly, lz), Voxel::new(kind));
                    }
                }
            }
        }

        chunk
    }
}
