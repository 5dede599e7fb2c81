//! Ray-surface intersection by Newton-Raphson iteration.
//!
//! The ray is first advanced to the vertex plane (local z = 0), then the path
//! length is refined with Newton steps on `F(s) = z(s) - sag(x(s), y(s))`,
//! using the projection of the analytic surface normal on the ray direction
//! as the slope `F'(s)`. For smooth optical conics this converges in a few
//! iterations; there is no convergence guarantee for grazing rays or
//! strongly aspheric shapes.

use log::trace;
use serde::{Deserialize, Serialize};
use seqray_math::{advance, is_finite, Vec3};

use crate::geometry::Geometry;
use crate::Ray;

/// Default convergence tolerance on the Newton path-length update.
pub const DEFAULT_TOLERANCE: f64 = 1e-14;
/// Default Newton iteration cap.
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Updates within this many ulps of the path length count as converged.
const ULP_SLACK: f64 = 4.0;

/// Where a ray meets a surface, in the surface's local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceIntersection {
    /// Intersection point.
    pub point: Vec3,
    /// Surface normal at the intersection (not normalized).
    pub normal: Vec3,
    /// Path length from the ray's starting point, in units of its direction.
    pub path_length: f64,
    /// Newton iterations used.
    pub iterations: usize,
}

/// Why a ray could not be carried through a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailReason {
    /// Iteration cap reached before the update fell below tolerance.
    Unconverged,
    /// Ray runs parallel to the vertex plane, or the normal is (nearly)
    /// perpendicular to the ray, so the Newton step is undefined.
    GrazingIncidence,
    /// Surface shape is undefined at the ray's lateral position.
    OutOfAperture,
    /// Computation produced non-finite coordinates.
    NonFinite,
    /// Surface interaction law is not modelled.
    UnsupportedInteraction,
}

/// Intersect a local-frame ray with a surface shape.
pub fn intersect(
    ray: &Ray,
    geometry: &dyn Geometry,
    tolerance: f64,
    max_iterations: usize,
) -> Result<SurfaceIntersection, FailReason> {
    let s = &ray.direction;
    if s.z.abs() < f64::EPSILON {
        return Err(FailReason::GrazingIncidence);
    }

    // Move to the vertex plane
    let s0 = -ray.position.z / s.z;
    let p1 = advance(&ray.position, s, s0);
    if !is_finite(&p1) {
        return Err(FailReason::NonFinite);
    }

    let mut sj = 0.0;
    for iteration in 1..=max_iterations {
        let pj = advance(&p1, s, sj);
        let (sag, normal) = geometry.sag_normal(pj.x, pj.y);
        if !sag.is_finite() || !is_finite(&normal) {
            return Err(FailReason::OutOfAperture);
        }

        let fp = normal.dot(s);
        if fp.abs() < f64::EPSILON {
            return Err(FailReason::GrazingIncidence);
        }

        let next = sj - (pj.z - sag) / fp;
        let delta = (next - sj).abs();
        sj = next;
        trace!("newton iteration {}: s = {:e}, |ds| = {:e}", iteration, sj, delta);

        // An absolute tolerance below the float spacing of s can never be met.
        let floor = ULP_SLACK * f64::EPSILON * sj.abs().max(s0.abs());
        if delta < tolerance.max(floor) {
            let point = advance(&p1, s, sj);
            let (_, normal) = geometry.sag_normal(point.x, point.y);
            if !is_finite(&point) || !is_finite(&normal) {
                return Err(FailReason::NonFinite);
            }
            return Ok(SurfaceIntersection {
                point,
                normal,
                path_length: s0 + sj,
                iterations: iteration,
            });
        }
    }

    Err(FailReason::Unconverged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Conic, Plane};
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use seqray_math::vec3;

    fn solve(ray: &Ray, geometry: &dyn Geometry) -> Result<SurfaceIntersection, FailReason> {
        intersect(ray, geometry, DEFAULT_TOLERANCE, DEFAULT_MAX_ITERATIONS)
    }

    #[test]
    fn test_plane_along_z() {
        for &z0 in &[0.5, 3.0, 1234.0] {
            let ray = Ray::new(vec3(2.0, -3.0, z0), vec3(0.0, 0.0, 1.0));
            let hit = solve(&ray, &Plane).unwrap();
            assert_eq!(hit.point, vec3(2.0, -3.0, 0.0));
            assert_eq!(hit.normal, vec3(0.0, 0.0, 1.0));
            assert_eq!(hit.path_length, -z0);
            assert_eq!(hit.iterations, 1);
        }
    }

    #[test]
    fn test_plane_oblique() {
        let ray = Ray::new(vec3(0.0, 0.0, -4.0), vec3(0.6, 0.0, 0.8));
        let hit = solve(&ray, &Plane).unwrap();
        assert_relative_eq!(hit.point.x, 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(hit.point.z, 0.0, epsilon = 1e-12);
        assert_relative_eq!(hit.path_length, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_flat_conic_matches_plane() {
        let flat = Conic::new(0.0, 0.7);
        for &(x, y, z) in &[(0.0, 0.0, 1.0), (1.5, -2.0, 10.0), (-4.0, 3.0, -2.0)] {
            let ray = Ray::new(vec3(x, y, z), vec3(0.0, 0.0, 1.0));
            let a = solve(&ray, &flat).unwrap();
            let b = solve(&ray, &Plane).unwrap();
            assert_eq!(a.point, b.point);
            assert_eq!(a.normal, b.normal);
        }
    }

    #[test]
    fn test_paraboloid() {
        let mirror = Conic::new(-0.05, -1.0);
        let ray = Ray::new(vec3(0.0, 1.0, -3.0), vec3(0.0, 0.0, 1.0));
        let hit = solve(&ray, &mirror).unwrap();
        assert_abs_diff_eq!(hit.point.x, 0.0);
        assert_abs_diff_eq!(hit.point.y, 1.0);
        assert_relative_eq!(hit.point.z, -0.025, epsilon = 1e-15);
        assert_relative_eq!(hit.normal.y, 0.05, epsilon = 1e-15);
        assert_relative_eq!(hit.path_length, 2.975, epsilon = 1e-12);
    }

    #[test]
    fn test_tilted_ray_on_sphere_lies_on_surface() {
        let sphere = Conic::from_radius(25.0, 0.0);
        let ray = Ray::new(vec3(-1.0, 2.0, -10.0), vec3(0.05, -0.1, 1.0));
        let hit = solve(&ray, &sphere).unwrap();
        let (sag, _) = sphere.sag_normal(hit.point.x, hit.point.y);
        assert_abs_diff_eq!(hit.point.z, sag, epsilon = 1e-12);
        // The point is on the ray
        let along = ray.at(hit.path_length);
        assert_abs_diff_eq!((along - hit.point).norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_parallel_to_vertex_plane() {
        let ray = Ray::new(vec3(0.0, 0.0, 1.0), vec3(1.0, 0.0, 0.0));
        assert_eq!(solve(&ray, &Plane), Err(FailReason::GrazingIncidence));
    }

    #[test]
    fn test_out_of_aperture() {
        // Radius 1 sphere cannot be evaluated at r = 5
        let sphere = Conic::new(1.0, 0.0);
        let ray = Ray::new(vec3(5.0, 0.0, -1.0), vec3(0.0, 0.0, 1.0));
        assert_eq!(solve(&ray, &sphere), Err(FailReason::OutOfAperture));
    }

    #[test]
    fn test_large_sag_converges_to_float_resolution() {
        // Steep hyperboloid far off axis: sag is about -2000 here, so one ulp
        // of the path length is larger than the default tolerance.
        let hyperboloid = Conic::new(-1e-4, -3.0);
        let ray = Ray::new(vec3(-300.0, 6956.0, -500.0), vec3(0.039, 0.0, 1.0).normalize());
        let hit = solve(&ray, &hyperboloid).unwrap();
        assert!(hit.iterations < DEFAULT_MAX_ITERATIONS);
        let (sag, _) = hyperboloid.sag_normal(hit.point.x, hit.point.y);
        assert_relative_eq!(hit.point.z, sag, max_relative = 1e-12);
        let along = ray.at(hit.path_length);
        assert_abs_diff_eq!((along - hit.point).norm(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_same_surface_in_any_units() {
        // Scaling the whole system scales the intersection
        let (c, k) = (0.02, -0.5);
        let ray = Ray::new(vec3(1.0, -3.0, -10.0), vec3(0.02, 0.05, 1.0));
        let small = solve(&ray, &Conic::new(c, k)).unwrap();
        for scale in [1e3, 1e6] {
            let scaled_ray = Ray::new(ray.position * scale, ray.direction);
            let big = solve(&scaled_ray, &Conic::new(c / scale, k)).unwrap();
            assert_relative_eq!(big.point.y, small.point.y * scale, max_relative = 1e-10);
            assert_relative_eq!(big.point.z, small.point.z * scale, max_relative = 1e-10);
        }
    }

    /// Linear wedge `sag = slope * x`, defined only for `x < limit`.
    #[derive(Debug)]
    struct Wedge {
        slope: f64,
        limit: f64,
    }

    impl Geometry for Wedge {
        fn sag_normal(&self, x: f64, _y: f64) -> (f64, Vec3) {
            let normal = if x < self.limit {
                vec3(-self.slope, 0.0, 1.0)
            } else {
                vec3(f64::NAN, f64::NAN, f64::NAN)
            };
            (self.slope * x, normal)
        }
    }

    #[test]
    fn test_normal_perpendicular_to_oblique_ray() {
        // Ray runs along the wedge face: S.z != 0 but N.S == 0
        let wedge = Wedge { slope: 1.0, limit: f64::INFINITY };
        let ray = Ray::new(vec3(0.0, 0.0, -1.0), vec3(1.0, 0.0, 1.0));
        assert_eq!(solve(&ray, &wedge), Err(FailReason::GrazingIncidence));
    }

    #[test]
    fn test_non_finite_at_converged_point() {
        // A loose tolerance accepts the first step, which lands past the
        // region where the normal is defined.
        let wedge = Wedge { slope: 0.5, limit: 1.0 };
        let ray = Ray::new(vec3(-0.5, 0.0, -1.0), vec3(1.0, 0.0, 1.0));
        assert_eq!(intersect(&ray, &wedge, 1.0, 100), Err(FailReason::NonFinite));
    }

    #[test]
    fn test_iteration_cap() {
        let sphere = Conic::from_radius(25.0, 0.0);
        let ray = Ray::new(vec3(3.0, 4.0, -10.0), vec3(0.0, 0.0, 1.0));
        // One step from the vertex plane cannot settle on a curved surface
        let result = intersect(&ray, &sphere, DEFAULT_TOLERANCE, 1);
        assert_eq!(result, Err(FailReason::Unconverged));
    }
}
