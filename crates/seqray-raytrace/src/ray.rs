//! Ray representation.

use seqray_math::{advance, Vec3};

/// A ray: a position and a propagation direction.
///
/// The direction is not required to be unit length. Each surface produces a
/// fresh `Ray`; rays are never updated in place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Position of the ray.
    pub position: Vec3,
    /// Direction of propagation.
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray.
    pub fn new(position: Vec3, direction: Vec3) -> Self {
        Self { position, direction }
    }

    /// Point reached after travelling path length `t`: `position + t * direction`.
    #[inline]
    pub fn at(&self, t: f64) -> Vec3 {
        advance(&self.position, &self.direction, t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seqray_math::vec3;

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(vec3(0.0, 1.0, 2.0), vec3(1.0, 0.0, -1.0));
        assert_eq!(ray.at(0.0), vec3(0.0, 1.0, 2.0));
        assert_eq!(ray.at(2.0), vec3(2.0, 1.0, 0.0));
        assert_eq!(ray.at(-1.0), vec3(-1.0, 1.0, 3.0));
    }
}
