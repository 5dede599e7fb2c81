//! Direction update laws applied at a surface.

use seqray_math::{sum_sq, Vec3};

use crate::prescription::SurfaceType;

/// Reflect direction `s` about normal `n`.
///
/// `n` need not be unit length: `s' = s - 2 (s·n / n·n) n`.
#[inline]
pub fn reflect(s: &Vec3, n: &Vec3) -> Vec3 {
    let cos_i = s.dot(n) / sum_sq(n);
    s - n * (2.0 * cos_i)
}

/// Outgoing direction after the interaction of `kind` with incoming
/// direction `s` at a point with normal `n`.
///
/// Returns `None` for interactions the tracer does not model (refraction).
#[inline]
pub fn interact(kind: SurfaceType, s: &Vec3, n: &Vec3) -> Option<Vec3> {
    match kind {
        SurfaceType::Reflect => Some(reflect(s, n)),
        SurfaceType::Stop => Some(*s),
        SurfaceType::Refract => None,
    }
}
