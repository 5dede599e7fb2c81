//! Surface shapes and material capabilities.
//!
//! A surface shape is described by a single pure function of lateral
//! position, `(x, y) -> (sag, normal)`, evaluated in the surface's local
//! frame with the vertex at the origin and the optical axis along +Z.
//! Implementations must not carry interior mutability: the same geometry is
//! evaluated concurrently by every worker of a parallel trace.

use seqray_math::{vec3, Vec3};

/// A surface shape.
pub trait Geometry: Send + Sync + std::fmt::Debug {
    /// Sag (height along Z) and surface normal at lateral position `(x, y)`.
    ///
    /// The normal need not be unit length, but it must be the gradient
    /// direction of `z - sag(x, y)` so the intersection solver can use its
    /// projection on the ray as the Newton slope. Outside the region where
    /// the shape is defined, non-finite values are returned.
    fn sag_normal(&self, x: f64, y: f64) -> (f64, Vec3);

    /// Check the shape parameters, returning a description of the problem
    /// if they are degenerate.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// A flat surface: zero sag with the normal along +Z everywhere.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Plane;

impl Geometry for Plane {
    #[inline]
    fn sag_normal(&self, _x: f64, _y: f64) -> (f64, Vec3) {
        (0.0, vec3(0.0, 0.0, 1.0))
    }
}

/// A rotationally symmetric conic of revolution.
///
/// `sag = c r² / (1 + √(1 − (1+k) c² r²))` with `r² = x² + y²`.
///
/// | k | shape |
/// |---|-------|
/// | 0 | sphere |
/// | -1 | paraboloid |
/// | < -1 | hyperboloid |
/// | (-1, 0) | prolate ellipsoid |
/// | > 0 | oblate ellipsoid |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conic {
    /// Vertex curvature (1 / radius).
    pub c: f64,
    /// Conic constant.
    pub k: f64,
}

impl Conic {
    /// Create a conic from its vertex curvature and conic constant.
    pub fn new(c: f64, k: f64) -> Self {
        Self { c, k }
    }

    /// Create a conic from its vertex radius of curvature.
    ///
    /// An infinite radius gives a flat surface.
    pub fn from_radius(radius: f64, k: f64) -> Self {
        let c = if radius.is_infinite() { 0.0 } else { 1.0 / radius };
        Self { c, k }
    }
}

impl Geometry for Conic {
    fn sag_normal(&self, x: f64, y: f64) -> (f64, Vec3) {
        let c = self.c;
        let rsq = x * x + y * y;
        // Negative kernel is outside the conic's aperture: sqrt yields NaN.
        let kernel = 1.0 - (1.0 + self.k) * c * c * rsq;
        let phi = kernel.sqrt();
        let sag = c * rsq / (1.0 + phi);

        let c_by_phi = c / phi;
        (sag, vec3(-x * c_by_phi, -y * c_by_phi, 1.0))
    }

    fn validate(&self) -> Result<(), String> {
        if !self.c.is_finite() {
            return Err(format!("curvature {} is not finite", self.c));
        }
        if !self.k.is_finite() {
            return Err(format!("conic constant {} is not finite", self.k));
        }
        Ok(())
    }
}

/// Refractive index of a medium as a function of wavelength.
///
/// Carried on surfaces for use by refraction; the tracer itself treats the
/// wavelength as opaque.
pub trait Glass: Send + Sync + std::fmt::Debug {
    /// Refractive index at `wavelength`.
    fn index(&self, wavelength: f64) -> f64;
}

/// A medium with the same index at every wavelength.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantIndex(pub f64);

impl Glass for ConstantIndex {
    fn index(&self, _wavelength: f64) -> f64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_plane_everywhere_flat() {
        for &(x, y) in &[(0.0, 0.0), (3.0, -4.0), (1e6, 1e-6)] {
            let (sag, n) = Plane.sag_normal(x, y);
            assert_eq!(sag, 0.0);
            assert_eq!(n, vec3(0.0, 0.0, 1.0));
        }
    }

    #[test]
    fn test_flat_conic_matches_plane() {
        let flat = Conic::new(0.0, -3.0);
        for &(x, y) in &[(0.0, 0.0), (2.0, -1.0), (-7.5, 11.0)] {
            let (sag, n) = flat.sag_normal(x, y);
            assert_eq!(sag, 0.0);
            assert_eq!(n.x, 0.0);
            assert_eq!(n.y, 0.0);
            assert_eq!(n.z, 1.0);
        }
    }

    #[test]
    fn test_sphere_sag() {
        // Sphere of radius 10: sag = R - sqrt(R² - r²)
        let sphere = Conic::from_radius(10.0, 0.0);
        let (sag, _) = sphere.sag_normal(3.0, 4.0);
        assert_relative_eq!(sag, 10.0 - (100.0f64 - 25.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_paraboloid_sag() {
        // k = -1: sag = c r² / 2 for any r
        let parabola = Conic::new(-0.05, -1.0);
        let (sag, n) = parabola.sag_normal(0.0, 1.0);
        assert_relative_eq!(sag, -0.025, epsilon = 1e-15);
        assert_relative_eq!(n.y, 0.05, epsilon = 1e-15);
        assert_eq!(n.z, 1.0);
    }

    #[test]
    fn test_normal_matches_sag_slope() {
        let conic = Conic::new(0.02, -0.6);
        let (x, y) = (3.0, -2.0);
        let h = 1e-6;
        let (_, n) = conic.sag_normal(x, y);
        let dsdx = (conic.sag_normal(x + h, y).0 - conic.sag_normal(x - h, y).0) / (2.0 * h);
        let dsdy = (conic.sag_normal(x, y + h).0 - conic.sag_normal(x, y - h).0) / (2.0 * h);
        assert_relative_eq!(n.x, -dsdx, epsilon = 1e-8);
        assert_relative_eq!(n.y, -dsdy, epsilon = 1e-8);
    }

    #[test]
    fn test_conic_outside_aperture_not_finite() {
        // Sphere of radius 1 evaluated at r = 2
        let sphere = Conic::new(1.0, 0.0);
        let (sag, n) = sphere.sag_normal(2.0, 0.0);
        assert!(!sag.is_finite());
        assert!(!n.x.is_finite());
    }

    #[test]
    fn test_from_radius_infinite_is_flat() {
        let flat = Conic::from_radius(f64::INFINITY, 0.0);
        assert_eq!(flat.c, 0.0);
    }

    #[test]
    fn test_conic_validate() {
        assert!(Conic::new(0.1, -1.0).validate().is_ok());
        assert!(Conic::new(f64::NAN, 0.0).validate().is_err());
        assert!(Conic::new(0.1, f64::INFINITY).validate().is_err());
        assert!(Plane.validate().is_ok());
    }

    #[test]
    fn test_constant_index() {
        let glass = ConstantIndex(1.5);
        assert_eq!(glass.index(0.6328), 1.5);
        assert_eq!(glass.index(1.064), 1.5);
    }
}
