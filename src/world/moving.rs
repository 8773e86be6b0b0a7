use crate::world::voxel::Voxel;
use glam::{I64Vec3, Vec3};

/// A voxel travelling between two grid positions. It is out of the grid while in flight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovingVoxel {
    pub voxel: Voxel,
    pub start: I64Vec3,
    pub end: I64Vec3,
    pub current: Vec3,
    pub duration: f32,
    pub remaining: f32,
}

impl MovingVoxel {
    pub fn new(voxel: Voxel, start: I64Vec3, end: I64Vec3, duration: f32) -> Self {
        Self {
            voxel,
            start,
            end,
            current: start.as_vec3(),
            duration,
            remaining: duration,
        }
    }

    /// Advances the animation. Returns true once the voxel has arrived.
    pub fn advance(&mut self, dt: f32) -> bool {
        self.remaining -= dt;
        if self.remaining <= 0.0 {
            self.remaining = 0.0;
            self.current = self.end.as_vec3();
            return true;
        }
        let progress = 1.0 - self.remaining / self.duration;
        self.current = self.start.as_vec3().lerp(self.end.as_vec3(), progress);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::voxel_type::VoxelTypeId;

    #[test]
    fn test_linear_interpolation() {
        let mut moving = MovingVoxel::new(
            Voxel::new(VoxelTypeId::SAND),
            I64Vec3::new(0, 4, 0),
            I64Vec3::new(0, 0, 0),
            2.0,
        );
        assert!(!moving.advance(1.0));
        assert_eq!(moving.current, Vec3::new(0.0, 2.0, 0.0));
        assert!(moving.advance(1.0));
        assert_eq!(moving.current, Vec3::ZERO);
    }

    #[test]
    fn test_zero_duration_lands_on_first_tick() {
        let mut moving = MovingVoxel::new(Voxel::new(VoxelTypeId::SAND), I64Vec3::ZERO, I64Vec3::X, 0.0);
        assert!(moving.advance(0.016));
    }
}
