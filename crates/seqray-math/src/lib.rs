#![warn(missing_docs)]

//! Math types for the seqray sequential ray tracer.
//!
//! Thin wrappers around nalgebra providing the 3-vector and 3x3 rotation
//! primitives used by the tracer: ray positions and directions, surface
//! normals, and the rigid rotations between world and surface-local frames.

use nalgebra::{Matrix3, Vector3};

/// A vector (or point) in 3D space.
pub type Vec3 = Vector3<f64>;

/// A 3x3 matrix. In the tracer this is always a rigid rotation.
pub type Mat3 = Matrix3<f64>;

/// Shorthand constructor for a [`Vec3`].
#[inline]
pub fn vec3(x: f64, y: f64, z: f64) -> Vec3 {
    Vec3::new(x, y, z)
}

/// Sum of squares of the components (squared length).
#[inline]
pub fn sum_sq(v: &Vec3) -> f64 {
    v.x * v.x + v.y * v.y + v.z * v.z
}

/// Advance point `p` along direction `s` by path length `t`: `p + t * s`.
#[inline]
pub fn advance(p: &Vec3, s: &Vec3, t: f64) -> Vec3 {
    s * t + p
}

/// True when every component is finite.
#[inline]
pub fn is_finite(v: &Vec3) -> bool {
    v.x.is_finite() && v.y.is_finite() && v.z.is_finite()
}

/// Build a matrix from nine row-major values.
pub fn mat3_from_rows(m: [f64; 9]) -> Mat3 {
    Mat3::new(m[0], m[1], m[2], m[3], m[4], m[5], m[6], m[7], m[8])
}

/// Flatten a matrix to nine row-major values.
pub fn mat3_to_rows(m: &Mat3) -> [f64; 9] {
    [
        m[(0, 0)], m[(0, 1)], m[(0, 2)],
        m[(1, 0)], m[(1, 1)], m[(1, 2)],
        m[(2, 0)], m[(2, 1)], m[(2, 2)],
    ]
}

/// Rotation about the X axis by `angle` radians.
pub fn rotation_x(angle: f64) -> Mat3 {
    let (s, c) = angle.sin_cos();
    let mut m = Mat3::identity();
    m[(1, 1)] = c;
    m[(1, 2)] = -s;
    m[(2, 1)] = s;
    m[(2, 2)] = c;
    m
}

/// Rotation about the Y axis by `angle` radians.
pub fn rotation_y(angle: f64) -> Mat3 {
    let (s, c) = angle.sin_cos();
    let mut m = Mat3::identity();
    m[(0, 0)] = c;
    m[(0, 2)] = s;
    m[(2, 0)] = -s;
    m[(2, 2)] = c;
    m
}

/// Rotation about the Z axis by `angle` radians.
pub fn rotation_z(angle: f64) -> Mat3 {
    let (s, c) = angle.sin_cos();
    let mut m = Mat3::identity();
    m[(0, 0)] = c;
    m[(0, 1)] = -s;
    m[(1, 0)] = s;
    m[(1, 1)] = c;
    m
}

/// Check that `m` is a proper rotation: orthonormal with determinant +1,
/// both within `tol`.
pub fn is_rotation(m: &Mat3, tol: f64) -> bool {
    if !m.iter().all(|v| v.is_finite()) {
        return false;
    }
    let gram = m.transpose() * m;
    let off = (gram - Mat3::identity()).abs().max();
    off < tol && (m.determinant() - 1.0).abs() < tol
}
