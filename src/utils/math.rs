use glam::Vec3;

/// Default reach of a pick ray, in world units.
pub const DEFAULT_RAY_DISTANCE: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    pub min: Vec3,
    pub max: Vec3,
}

impl AABB {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Unit cube whose minimum corner sits at `corner`.
    pub fn unit(corner: Vec3) -> Self {
        Self::new(corner, corner + Vec3::ONE)
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn intersects(&self, other: &AABB) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }
}

/// Result of a ray entering a box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxHit {
    /// Distance along the ray to the entry point. Negative when the origin is inside the box.
    pub near: f32,
    /// Distance along the ray to the exit point.
    pub far: f32,
    /// Normal of the entered face, pointing back toward the ray origin.
    pub normal: Vec3,
    pub point: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
    pub max_distance: f32,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
            max_distance: DEFAULT_RAY_DISTANCE,
        }
    }

    pub fn with_max_distance(mut self, max_distance: f32) -> Self {
        self.max_distance = max_distance;
        self
    }

    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }

    /// Slab test against `aabb`.
    ///
    /// An axis the ray runs parallel to (a direction component of exactly zero)
    /// only passes when the origin lies inside the box extent on that axis.
    pub fn intersect_aabb(&self, aabb: &AABB) -> Option<BoxHit> {
        if self.direction == Vec3::ZERO {
            return None;
        }

        let mut near = f32::NEG_INFINITY;
        let mut far = f32::INFINITY;
        let mut normal = Vec3::ZERO;

        for axis in 0..3 {
            let origin = self.origin[axis];
            let direction = self.direction[axis];
            let (min, max) = (aabb.min[axis], aabb.max[axis]);

            if direction == 0.0 {
                if origin < min || origin > max {
                    return None;
                }
                continue;
            }

            let mut t1 = (min - origin) / direction;
            let mut t2 = (max - origin) / direction;
            // entering through the min face unless the slab was crossed backwards
            let mut sign = -1.0;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
                sign = 1.0;
            }

            if t1 > near {
                near = t1;
                normal = Vec3::ZERO;
                normal[axis] = sign;
            }
            if t2 < far {
                far = t2;
            }
            if near > far || far < 0.0 {
                return None;
            }
        }

        Some(BoxHit {
            near,
            far,
            normal,
            point: self.at(near),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> AABB {
        AABB::new(Vec3::ZERO, Vec3::ONE)
    }

    #[test]
    fn test_ray_hits_front_face() {
        let ray = Ray::new(Vec3::new(0.5, 0.5, -5.0), Vec3::Z);
        let hit = ray.intersect_aabb(&unit_box()).unwrap();
        assert_eq!(hit.near, 5.0);
        assert_eq!(hit.far, 6.0);
        assert_eq!(hit.normal, Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(hit.point, Vec3::new(0.5, 0.5, 0.0));
    }

    #[test]
    fn test_ray_near_distance_is_face_distance() {
        let ray = Ray::new(Vec3::new(0.5, 0.5, -4.0), Vec3::Z);
        let hit = ray.intersect_aabb(&unit_box()).unwrap();
        assert_eq!(hit.near, 4.0);
    }

    #[test]
    fn test_ray_from_positive_side_gets_positive_normal() {
        let ray = Ray::new(Vec3::new(0.5, 3.0, 0.5), Vec3::NEG_Y);
        let hit = ray.intersect_aabb(&unit_box()).unwrap();
        assert_eq!(hit.near, 2.0);
        assert_eq!(hit.normal, Vec3::Y);
    }

    #[test]
    fn test_axis_parallel_ray_outside_extent_misses() {
        // parallel to z, but x lies outside [0, 1]
        let ray = Ray::new(Vec3::new(1.5, 0.5, -5.0), Vec3::Z);
        assert!(ray.intersect_aabb(&unit_box()).is_none());

        // exactly on the boundary still counts as inside the slab
        let ray = Ray::new(Vec3::new(1.0, 0.5, -5.0), Vec3::Z);
        assert!(ray.intersect_aabb(&unit_box()).is_some());
    }

    #[test]
    fn test_box_behind_ray_misses() {
        let ray = Ray::new(Vec3::new(0.5, 0.5, 5.0), Vec3::Z);
        assert!(ray.intersect_aabb(&unit_box()).is_none());
    }

    #[test]
    fn test_origin_inside_box() {
        let ray = Ray::new(Vec3::splat(0.5), Vec3::X);
        let hit = ray.intersect_aabb(&unit_box()).unwrap();
        assert!(hit.near < 0.0);
        assert_eq!(hit.far, 0.5);
    }

    #[test]
    fn test_zero_direction_never_hits() {
        let ray = Ray::new(Vec3::splat(0.5), Vec3::ZERO);
        assert!(ray.intersect_aabb(&unit_box()).is_none());
    }

    #[test]
    fn test_aabb_helpers() {
        let aabb = AABB::unit(Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(aabb.center(), Vec3::new(2.5, 0.5, 0.5));
        assert_eq!(aabb.size(), Vec3::ONE);
        assert!(aabb.contains(Vec3::new(2.0, 1.0, 0.5)));
        assert!(aabb.intersects(&AABB::new(Vec3::new(1.5, 0.5, 0.5), Vec3::splat(2.5))));
        assert!(!aabb.intersects(&unit_box()));
    }
}
