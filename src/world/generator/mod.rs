pub mod noise;
pub mod terrain;

pub use terrain::TerrainGenerator;
