pub mod error;
pub mod math;

pub use error::{ConfigError, Result, StorageError, WorldError};
pub use math::{BoxHit, Ray, AABB};
