use crate::config::terrain::TerrainConfig;
use crate::utils::error::ConfigError;
use crate::world::chunk_coord::ChunkDims;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub name: String,
    /// Chunks along each axis of the world cube.
    pub edge_size: u32,
    /// Chunk size along x and z, in voxels.
    pub chunk_width: u32,
    /// Chunk size along y, in voxels.
    pub chunk_height: u32,
    pub max_requests_per_tick: usize,
    pub parallel_updates: bool,
    /// Length of a day/night cycle in seconds.
    pub day_length: f32,
    pub save_dir: Option<PathBuf>,
    pub log_level: String,
    pub terrain: TerrainConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: "world".to_string(),
            edge_size: 16,
            chunk_width: 16,
            chunk_height: 16,
            max_requests_per_tick: 10,
            parallel_updates: false,
            day_length: 1200.0,
            save_dir: None,
            log_level: "info".to_string(),
            terrain: TerrainConfig::default(),
        }
    }
}

impl WorldConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn chunk_dims(&self) -> ChunkDims {
        ChunkDims::new(self.chunk_width, self.chunk_height)
    }

    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("unknown log level '{}'", self.log_level)))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("edge_size", self.edge_size),
            ("chunk_width", self.chunk_width),
            ("chunk_height", self.chunk_height),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{name} must be positive")));
            }
        }
        let edge = self.edge_size as usize;
        if edge.checked_mul(edge).and_then(|slots| slots.checked_mul(edge)).is_none() {
            return Err(ConfigError::Invalid(format!(
                "edge_size {} makes the chunk grid too large",
                self.edge_size
            )));
        }
        if !self.chunk_dims().is_addressable() {
            return Err(ConfigError::Invalid(format!(
                "chunks of {}x{}x{} voxels exceed {} slots",
                self.chunk_width,
                self.chunk_height,
                self.chunk_width,
                u32::MAX
            )));
        }
        if self.max_requests_per_tick == 0 {
            return Err(ConfigError::Invalid("max_requests_per_tick must be positive".into()));
        }
        if !(self.day_length > 0.0 && self.day_length.is_finite()) {
            return Err(ConfigError::Invalid("day_length must be positive".into()));
        }
        self.level_filter()?;
        self.terrain.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::terrain::WorldType;

    #[test]
    fn test_defaults_are_valid() {
        let config = WorldConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_requests_per_tick, 10);
        assert_eq!(config.terrain.octaves, 10);
        assert_eq!(config.chunk_dims(), ChunkDims::new(16, 16));
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config = WorldConfig::from_toml_str(
            r#"
            name = "flatland"
            edge_size = 4
            chunk_height = 32

            [terrain]
            seed = 42
            world_type = "flat"
            flat_layers = [{ voxel = "stone", thickness = 4 }]
            "#,
        )
        .unwrap();

        assert_eq!(config.name, "flatland");
        assert_eq!(config.edge_size, 4);
        assert_eq!(config.chunk_width, 16);
        assert_eq!(config.chunk_height, 32);
        assert_eq!(config.terrain.seed, 42);
        assert_eq!(config.terrain.world_type, WorldType::Flat);
        assert_eq!(config.terrain.flat_layers.len(), 1);
        assert_eq!(config.terrain.persistence, 0.25);
    }

    #[test]
    fn test_zero_dimensions_are_rejected() {
        let result = WorldConfig::from_toml_str("chunk_width = 0");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));

        let config = WorldConfig {
            edge_size: 0,
            ..WorldConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_oversized_dimensions_are_rejected() {
        let wide = WorldConfig {
            chunk_width: 65536,
            chunk_height: 2,
            ..WorldConfig::default()
        };
        assert!(matches!(wide.validate(), Err(ConfigError::Invalid(_))));

        let huge = WorldConfig {
            chunk_width: u32::MAX,
            chunk_height: u32::MAX,
            ..WorldConfig::default()
        };
        assert!(matches!(huge.validate(), Err(ConfigError::Invalid(_))));

        let edge = WorldConfig {
            edge_size: u32::MAX,
            ..WorldConfig::default()
        };
        assert!(matches!(edge.validate(), Err(ConfigError::Invalid(_))));

        let tall = WorldConfig {
            chunk_width: 16,
            chunk_height: 4096,
            ..WorldConfig::default()
        };
        assert!(tall.validate().is_ok());
    }

    #[test]
    fn test_bad_values_are_rejected() {
        assert!(matches!(
            WorldConfig::from_toml_str("log_level = \"loud\""),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            WorldConfig::from_toml_str("[terrain]\nflat_layers = [{ voxel = \"lava\", thickness = 1 }]"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            WorldConfig::from_toml_str("edge_size = \"big\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("world.toml");
        assert!(matches!(WorldConfig::load(&missing), Err(ConfigError::Io { .. })));

        std::fs::write(&missing, "edge_size = 2\nparallel_updates = true\n").unwrap();
        let config = WorldConfig::load(&missing).unwrap();
        assert_eq!(config.edge_size, 2);
        assert!(config.parallel_updates);
    }
}
