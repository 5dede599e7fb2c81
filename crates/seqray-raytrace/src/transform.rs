//! Conversion between the world frame and a surface's local frame.
//!
//! In the local frame the surface vertex sits at the origin and the surface
//! axis is +Z. A surface's `origin` is its vertex in world coordinates and
//! its `rotation` maps world axes onto local axes.

use seqray_math::{Mat3, Vec3};

use crate::Ray;

/// Express a world-frame ray in the frame of a surface at `origin` with
/// world-to-local `rotation`.
///
/// The origin is subtracted from the position; if a rotation is present it
/// is then applied to both the translated position and the direction.
#[inline]
pub fn to_local(ray: &Ray, origin: &Vec3, rotation: Option<&Mat3>) -> Ray {
    let position = ray.position - origin;
    match rotation {
        Some(r) => Ray::new(r * position, r * ray.direction),
        None => Ray::new(position, ray.direction),
    }
}

/// Inverse of [`to_local`]: return a local-frame ray to the world frame.
///
/// The transpose rotation is applied to position and direction before the
/// origin is added back. Without a rotation the direction passes through
/// untouched.
#[inline]
pub fn to_world(ray: &Ray, origin: &Vec3, rotation: Option<&Mat3>) -> Ray {
    match rotation {
        Some(r) => {
            let rt = r.transpose();
            Ray::new(rt * ray.position + origin, rt * ray.direction)
        }
        None => Ray::new(ray.position + origin, ray.direction),
    }
}
