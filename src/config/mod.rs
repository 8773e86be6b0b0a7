pub mod terrain;
pub mod world;

pub use terrain::{FlatLayer, TerrainConfig, WorldType};
pub use world::WorldConfig;
