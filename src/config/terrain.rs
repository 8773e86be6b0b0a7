use crate::utils::error::ConfigError;
use crate::world::voxel_type::VoxelTypeId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorldType {
    Normal,
    Flat,
    Void,
}

/// One band of a flat world, stacked upward from y = 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatLayer {
    pub voxel: String,
    pub thickness: u32,
}

impl FlatLayer {
    pub fn new(voxel: &str, thickness: u32) -> Self {
        Self {
            voxel: voxel.to_string(),
            thickness,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    pub seed: u64,
    pub world_type: WorldType,
    pub octaves: u32,
    pub persistence: f64,
    pub frequency: f64,
    pub amplitude: f64,
    pub base_height: f64,
    pub sea_level: i64,
    pub flat_layers: Vec<FlatLayer>,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            world_type: WorldType::Normal,
            octaves: 10,
            persistence: 0.25,
            frequency: 0.05,
            amplitude: 64.0,
            base_height: 64.0,
            sea_level: 64,
            flat_layers: vec![
                FlatLayer::new("stone", 3),
                FlatLayer::new("dirt", 2),
                FlatLayer::new("grass", 1),
            ],
        }
    }
}

impl TerrainConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.octaves == 0 {
            return Err(ConfigError::Invalid("terrain.octaves must be positive".into()));
        }
        if !(self.frequency > 0.0) {
            return Err(ConfigError::Invalid("terrain.frequency must be positive".into()));
        }
        if !(self.persistence > 0.0) {
            return Err(ConfigError::Invalid("terrain.persistence must be positive".into()));
        }
        for layer in &self.flat_layers {
            if VoxelTypeId::by_name(&layer.voxel).is_none() {
                return Err(ConfigError::Invalid(format!(
                    "terrain.flat_layers: unknown voxel type '{}'",
                    layer.voxel
                )));
            }
            if layer.thickness == 0 {
                return Err(ConfigError::Invalid(format!(
                    "terrain.flat_layers: layer '{}' has zero thickness",
                    layer.voxel
                )));
            }
        }
        Ok(())
    }
}
