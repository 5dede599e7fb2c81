//! Tracing a single ray through a prescription.

use log::trace;
use serde::{Deserialize, Serialize};
use seqray_math::{is_finite, vec3, Vec3};

use crate::buffer::TrajectoryViewMut;
use crate::config::TraceOptions;
use crate::error::{Result, TraceError};
use crate::intersect::{intersect, FailReason};
use crate::interact::interact;
use crate::prescription::{Prescription, Surface};
use crate::transform::{to_local, to_world};
use crate::Ray;

/// Outcome of tracing one ray.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum RayStatus {
    /// Slot has not been written.
    Pending,
    /// Every surface was resolved.
    Traced,
    /// The ray could not be carried through `surface`; trajectory points
    /// after the last resolved surface are NaN.
    Failed {
        /// Index of the surface that failed (0-based).
        surface: usize,
        /// What went wrong.
        reason: FailReason,
    },
}

impl RayStatus {
    /// True when every surface was resolved.
    pub fn is_traced(&self) -> bool {
        matches!(self, RayStatus::Traced)
    }

    /// True when the ray failed at some surface.
    pub fn is_failed(&self) -> bool {
        matches!(self, RayStatus::Failed { .. })
    }
}

/// An owned trajectory.
///
/// `positions[0]`/`directions[0]` is the input ray; index `i` is the state
/// after the interaction at surface `i`, expressed in world coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    /// Positions, one per point.
    pub positions: Vec<Vec3>,
    /// Directions, one per point.
    pub directions: Vec<Vec3>,
    /// Outcome.
    pub status: RayStatus,
}

/// Trace one ray, returning an owned trajectory of `surfaces + 1` points.
pub fn trace_ray(prescription: &Prescription, ray: &Ray, options: &TraceOptions) -> Trace {
    let len = prescription.trajectory_len() * 3;
    let mut positions = vec![f64::NAN; len];
    let mut directions = vec![f64::NAN; len];
    let mut status = RayStatus::Pending;
    trace_into(
        prescription,
        ray,
        options,
        TrajectoryViewMut::new(&mut positions, &mut directions, &mut status),
    );
    Trace {
        positions: to_points(&positions),
        directions: to_points(&directions),
        status,
    }
}

fn to_points(flat: &[f64]) -> Vec<Vec3> {
    flat.chunks_exact(3).map(|c| vec3(c[0], c[1], c[2])).collect()
}

/// Trace one ray into caller-provided trajectory slots.
///
/// Surfaces are visited strictly in order. At each one the ray is moved into
/// the surface frame, intersected, redirected by the surface's interaction
/// law and moved back to world coordinates. If a surface cannot be resolved
/// the remaining points are set to NaN and the failure is recorded in the
/// returned status.
///
/// `out` must hold exactly `prescription.len() + 1` points; any other length
/// is rejected with [`TraceError::BufferShape`] before anything is written.
pub fn trace_ray_into(
    prescription: &Prescription,
    ray: &Ray,
    options: &TraceOptions,
    out: TrajectoryViewMut<'_>,
) -> Result<RayStatus> {
    if out.len() != prescription.trajectory_len() {
        return Err(TraceError::BufferShape {
            rays: 1,
            surfaces: prescription.len(),
            got_rays: 1,
            got_surfaces: out.len().saturating_sub(1),
        });
    }
    Ok(trace_into(prescription, ray, options, out))
}

/// [`trace_ray_into`] for callers that have already checked the view length.
pub(crate) fn trace_into(
    prescription: &Prescription,
    ray: &Ray,
    options: &TraceOptions,
    mut out: TrajectoryViewMut<'_>,
) -> RayStatus {
    debug_assert_eq!(out.len(), prescription.trajectory_len());

    out.set(0, &ray.position, &ray.direction);
    let mut current = *ray;

    for (index, surface) in prescription.surfaces().iter().enumerate() {
        match step(surface, &current, options) {
            Ok(next) => {
                out.set(index + 1, &next.position, &next.direction);
                current = next;
            }
            Err(reason) => {
                trace!("ray failed at surface {}: {:?}", index, reason);
                out.invalidate_from(index + 1);
                let status = RayStatus::Failed { surface: index, reason };
                out.set_status(status);
                return status;
            }
        }
    }

    out.set_status(RayStatus::Traced);
    RayStatus::Traced
}

/// Carry a world-frame ray through one surface.
fn step(
    surface: &Surface,
    ray: &Ray,
    options: &TraceOptions,
) -> std::result::Result<Ray, FailReason> {
    let rotation = surface.rotation.as_ref();
    let local = to_local(ray, &surface.origin, rotation);
    let hit = intersect(
        &local,
        surface.geometry.as_ref(),
        options.tolerance,
        options.max_iterations,
    )?;
    let direction = interact(surface.kind, &local.direction, &hit.normal)
        .ok_or(FailReason::UnsupportedInteraction)?;
    if !is_finite(&direction) {
        return Err(FailReason::NonFinite);
    }
    Ok(to_world(&Ray::new(hit.point, direction), &surface.origin, rotation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Conic, Plane};
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use seqray_math::rotation_x;

    fn options() -> TraceOptions {
        TraceOptions::default()
    }

    #[test]
    fn test_single_stop_plane() {
        let rx = Prescription::new(vec![Surface::stop(vec3(0.0, 0.0, 7.0), Plane)]).unwrap();
        let ray = Ray::new(vec3(1.5, -2.0, 0.0), vec3(0.0, 0.0, 1.0));
        let trace = trace_ray(&rx, &ray, &options());

        assert_eq!(trace.status, RayStatus::Traced);
        assert_eq!(trace.positions.len(), 2);
        assert_eq!(trace.positions[0], ray.position);
        assert_eq!(trace.directions[0], ray.direction);
        assert_eq!(trace.positions[1], vec3(1.5, -2.0, 7.0));
        assert_eq!(trace.directions[1], ray.direction);
    }

    #[test]
    fn test_trajectory_length() {
        let surfaces = (1..=4)
            .map(|i| Surface::stop(vec3(0.0, 0.0, i as f64), Plane))
            .collect();
        let rx = Prescription::new(surfaces).unwrap();
        let trace = trace_ray(&rx, &Ray::new(Vec3::zeros(), vec3(0.0, 0.0, 1.0)), &options());
        assert_eq!(trace.positions.len(), 5);
        assert_eq!(trace.directions.len(), 5);
        for (i, p) in trace.positions.iter().enumerate() {
            assert_eq!(p.z, i as f64);
        }
    }

    #[test]
    fn test_flat_mirror_reverses_direction() {
        let rx = Prescription::new(vec![
            Surface::reflect(vec3(0.0, 0.0, 10.0), Plane),
            Surface::stop(vec3(0.0, 0.0, 0.0), Plane),
        ])
        .unwrap();
        let ray = Ray::new(vec3(0.0, 0.0, 0.0), vec3(0.0, 0.6, 0.8));
        let trace = trace_ray(&rx, &ray, &options());
        assert!(trace.status.is_traced());
        assert_relative_eq!(trace.positions[1].y, 7.5, epsilon = 1e-12);
        assert_relative_eq!(trace.directions[1].z, -0.8, epsilon = 1e-15);
        assert_relative_eq!(trace.positions[2].y, 15.0, epsilon = 1e-12);
        assert_abs_diff_eq!(trace.positions[2].z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_tilted_stop_plane() {
        // A plane tilted 45 degrees about X, through (0, 0, 5)
        let tilt = rotation_x(std::f64::consts::FRAC_PI_4);
        let rx = Prescription::new(vec![
            Surface::stop(vec3(0.0, 0.0, 5.0), Plane).with_rotation(tilt),
        ])
        .unwrap();
        let ray = Ray::new(vec3(0.0, 1.0, 0.0), vec3(0.0, 0.0, 1.0));
        let trace = trace_ray(&rx, &ray, &options());
        assert!(trace.status.is_traced());
        let hit = trace.positions[1];
        // Lies on the tilted plane: local z = 0
        let local = tilt * (hit - vec3(0.0, 0.0, 5.0));
        assert_abs_diff_eq!(local.z, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(hit.y, 1.0, epsilon = 1e-12);
        // Direction returned to world frame unchanged
        assert_abs_diff_eq!((trace.directions[1] - ray.direction).norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_failure_is_local_and_marked() {
        let rx = Prescription::new(vec![
            Surface::stop(vec3(0.0, 0.0, 1.0), Plane),
            Surface::reflect(vec3(0.0, 0.0, 2.0), Conic::new(1.0, 0.0)),
            Surface::stop(vec3(0.0, 0.0, 0.0), Plane),
        ])
        .unwrap();
        let ray = Ray::new(vec3(0.0, 5.0, 0.0), vec3(0.0, 0.0, 1.0));
        let trace = trace_ray(&rx, &ray, &options());

        assert_eq!(
            trace.status,
            RayStatus::Failed { surface: 1, reason: FailReason::OutOfAperture }
        );
        assert!(trace.status.is_failed());
        assert_eq!(trace.positions[1], vec3(0.0, 5.0, 1.0));
        assert!(trace.positions[2].x.is_nan());
        assert!(trace.positions[3].x.is_nan());
        assert!(trace.directions[3].z.is_nan());
    }

    #[test]
    fn test_grazing_ray_fails() {
        let rx = Prescription::new(vec![Surface::stop(vec3(0.0, 0.0, 1.0), Plane)]).unwrap();
        let ray = Ray::new(Vec3::zeros(), vec3(1.0, 0.0, 0.0));
        let trace = trace_ray(&rx, &ray, &options());
        assert_eq!(
            trace.status,
            RayStatus::Failed { surface: 0, reason: FailReason::GrazingIncidence }
        );
    }

    #[test]
    fn test_into_caller_storage() {
        let rx = Prescription::new(vec![Surface::stop(vec3(0.0, 0.0, 3.0), Plane)]).unwrap();
        let ray = Ray::new(vec3(0.0, 1.0, 0.0), vec3(0.0, 0.0, 1.0));
        let mut positions = [f64::NAN; 6];
        let mut directions = [f64::NAN; 6];
        let mut status = RayStatus::Pending;
        let view = TrajectoryViewMut::new(&mut positions, &mut directions, &mut status);
        let result = trace_ray_into(&rx, &ray, &options(), view).unwrap();
        assert_eq!(result, RayStatus::Traced);
        assert_eq!(status, RayStatus::Traced);
        assert_eq!(positions, [0.0, 1.0, 0.0, 0.0, 1.0, 3.0]);
    }

    #[test]
    fn test_wrong_view_length_rejected() {
        let rx = Prescription::new(vec![
            Surface::stop(vec3(0.0, 0.0, 1.0), Plane),
            Surface::stop(vec3(0.0, 0.0, 2.0), Plane),
        ])
        .unwrap();
        let ray = Ray::new(Vec3::zeros(), vec3(0.0, 0.0, 1.0));

        // Two points where three are needed
        let mut positions = [0.0; 6];
        let mut directions = [0.0; 6];
        let mut status = RayStatus::Pending;
        let short = TrajectoryViewMut::new(&mut positions, &mut directions, &mut status);
        let err = trace_ray_into(&rx, &ray, &options(), short).unwrap_err();
        assert!(matches!(
            err,
            TraceError::BufferShape { surfaces: 2, got_surfaces: 1, .. }
        ));
        assert_eq!(status, RayStatus::Pending);
        assert_eq!(positions, [0.0; 6]);

        // Four points where three are needed
        let mut positions = [0.0; 12];
        let mut directions = [0.0; 12];
        let long = TrajectoryViewMut::new(&mut positions, &mut directions, &mut status);
        let err = trace_ray_into(&rx, &ray, &options(), long).unwrap_err();
        assert!(matches!(err, TraceError::BufferShape { got_surfaces: 3, .. }));
    }

    #[test]
    fn test_status_serde() {
        let status = RayStatus::Failed { surface: 2, reason: FailReason::Unconverged };
        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(json, r#"{"status":"failed","surface":2,"reason":"unconverged"}"#);
        let back: RayStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, status);
    }
}
