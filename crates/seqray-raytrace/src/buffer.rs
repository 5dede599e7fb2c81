//! Contiguous output storage for traced trajectories.
//!
//! Positions and directions each live in one flat `Vec<f64>` laid out as
//! `[ray][point][xyz]` (row-major, no padding). A ray's whole trajectory is
//! contiguous and adjacent rays are adjacent in memory, so sequential writers
//! stream through the buffer and parallel writers each own one contiguous
//! block.

use seqray_math::{vec3, Vec3};

use crate::trace::{RayStatus, Trace};

/// Preallocated positions, directions and per-ray status for a batch.
#[derive(Debug, Clone)]
pub struct TraceBuffers {
    rays: usize,
    surfaces: usize,
    positions: Vec<f64>,
    directions: Vec<f64>,
    status: Vec<RayStatus>,
}

impl TraceBuffers {
    /// Allocate storage for `rays` trajectories through `surfaces` surfaces.
    ///
    /// Coordinates start as NaN and every status as [`RayStatus::Pending`].
    pub fn allocate(rays: usize, surfaces: usize) -> Self {
        let len = rays * (surfaces + 1) * 3;
        Self {
            rays,
            surfaces,
            positions: vec![f64::NAN; len],
            directions: vec![f64::NAN; len],
            status: vec![RayStatus::Pending; rays],
        }
    }

    /// Number of rays.
    pub fn rays(&self) -> usize {
        self.rays
    }

    /// Number of surfaces.
    pub fn surfaces(&self) -> usize {
        self.surfaces
    }

    /// Number of reals per ray in each output array.
    pub fn stride(&self) -> usize {
        (self.surfaces + 1) * 3
    }

    /// Flat positions, `rays x (surfaces + 1) x 3`.
    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    /// Flat directions, `rays x (surfaces + 1) x 3`.
    pub fn directions(&self) -> &[f64] {
        &self.directions
    }

    /// Status of every ray.
    pub fn statuses(&self) -> &[RayStatus] {
        &self.status
    }

    /// Read-only view of ray `index`.
    pub fn ray(&self, index: usize) -> Option<TrajectoryView<'_>> {
        if index >= self.rays {
            return None;
        }
        let stride = self.stride();
        let span = index * stride..(index + 1) * stride;
        Some(TrajectoryView {
            positions: &self.positions[span.clone()],
            directions: &self.directions[span],
            status: self.status[index],
        })
    }

    /// Mutable view of ray `index`.
    pub fn ray_mut(&mut self, index: usize) -> Option<TrajectoryViewMut<'_>> {
        if index >= self.rays {
            return None;
        }
        let stride = self.stride();
        let span = index * stride..(index + 1) * stride;
        Some(TrajectoryViewMut {
            positions: &mut self.positions[span.clone()],
            directions: &mut self.directions[span],
            status: &mut self.status[index],
        })
    }

    /// Mutable region covering every ray, for splitting among writers.
    pub fn region_mut(&mut self) -> BufferRegion<'_> {
        BufferRegion {
            stride: (self.surfaces + 1) * 3,
            positions: &mut self.positions,
            directions: &mut self.directions,
            status: &mut self.status,
        }
    }

    /// Copy every trajectory out as owned [`Trace`] values.
    pub fn to_traces(&self) -> Vec<Trace> {
        (0..self.rays)
            .filter_map(|i| self.ray(i))
            .map(|view| view.to_trace())
            .collect()
    }
}

/// A contiguous run of rays inside a [`TraceBuffers`], mutably borrowed.
///
/// Regions split without overlap, so each one can be handed to a different
/// worker.
#[derive(Debug)]
pub struct BufferRegion<'a> {
    stride: usize,
    positions: &'a mut [f64],
    directions: &'a mut [f64],
    status: &'a mut [RayStatus],
}

impl<'a> BufferRegion<'a> {
    /// Number of rays in the region.
    pub fn len(&self) -> usize {
        self.status.len()
    }

    /// True when the region holds no rays.
    pub fn is_empty(&self) -> bool {
        self.status.is_empty()
    }

    /// Split into the first `mid` rays and the rest.
    ///
    /// # Panics
    ///
    /// Panics if `mid > self.len()`.
    pub fn split_at(self, mid: usize) -> (BufferRegion<'a>, BufferRegion<'a>) {
        let BufferRegion { stride, positions, directions, status } = self;
        let at = mid * stride;
        let (p_head, p_tail) = positions.split_at_mut(at);
        let (d_head, d_tail) = directions.split_at_mut(at);
        let (s_head, s_tail) = status.split_at_mut(mid);
        (
            BufferRegion {
                stride,
                positions: p_head,
                directions: d_head,
                status: s_head,
            },
            BufferRegion {
                stride,
                positions: p_tail,
                directions: d_tail,
                status: s_tail,
            },
        )
    }

    /// Per-ray mutable views, in order.
    pub fn into_rays(self) -> impl Iterator<Item = TrajectoryViewMut<'a>> {
        let BufferRegion { stride, positions, directions, status } = self;
        // Every trajectory holds at least the input ray, so stride >= 3.
        positions
            .chunks_exact_mut(stride)
            .zip(directions.chunks_exact_mut(stride))
            .zip(status.iter_mut())
            .map(|((positions, directions), status)| TrajectoryViewMut {
                positions,
                directions,
                status,
            })
    }
}

/// One ray's trajectory inside a [`TraceBuffers`].
#[derive(Debug, Clone, Copy)]
pub struct TrajectoryView<'a> {
    positions: &'a [f64],
    directions: &'a [f64],
    status: RayStatus,
}

impl<'a> TrajectoryView<'a> {
    /// Number of points (surfaces + 1).
    pub fn len(&self) -> usize {
        self.positions.len() / 3
    }

    /// Always false: a trajectory holds at least the input ray.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Outcome of the trace.
    pub fn status(&self) -> RayStatus {
        self.status
    }

    /// Position at point `i`.
    pub fn position(&self, i: usize) -> Vec3 {
        read(self.positions, i)
    }

    /// Direction at point `i`.
    pub fn direction(&self, i: usize) -> Vec3 {
        read(self.directions, i)
    }

    /// Flat positions of this ray.
    pub fn positions(&self) -> &'a [f64] {
        self.positions
    }

    /// Flat directions of this ray.
    pub fn directions(&self) -> &'a [f64] {
        self.directions
    }

    /// Copy out as an owned [`Trace`].
    pub fn to_trace(&self) -> Trace {
        Trace {
            positions: (0..self.len()).map(|i| self.position(i)).collect(),
            directions: (0..self.len()).map(|i| self.direction(i)).collect(),
            status: self.status,
        }
    }
}

/// One ray's writable trajectory slots.
#[derive(Debug)]
pub struct TrajectoryViewMut<'a> {
    positions: &'a mut [f64],
    directions: &'a mut [f64],
    status: &'a mut RayStatus,
}

impl<'a> TrajectoryViewMut<'a> {
    /// Wrap caller-owned storage of `3 * points` reals per array.
    ///
    /// # Panics
    ///
    /// Panics if the slices differ in length or are not a multiple of three.
    pub fn new(
        positions: &'a mut [f64],
        directions: &'a mut [f64],
        status: &'a mut RayStatus,
    ) -> Self {
        assert_eq!(positions.len(), directions.len(), "position and direction slots differ");
        assert_eq!(positions.len() % 3, 0, "trajectory slots must hold whole 3-vectors");
        Self { positions, directions, status }
    }

    /// Number of points (surfaces + 1).
    pub fn len(&self) -> usize {
        self.positions.len() / 3
    }

    /// True when there are no slots.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Write point `i`.
    #[inline]
    pub fn set(&mut self, i: usize, position: &Vec3, direction: &Vec3) {
        write(self.positions, i, position);
        write(self.directions, i, direction);
    }

    /// Fill points `from..` with NaN.
    pub fn invalidate_from(&mut self, from: usize) {
        let start = (from * 3).min(self.positions.len());
        self.positions[start..].fill(f64::NAN);
        self.directions[start..].fill(f64::NAN);
    }

    /// Record the outcome of the trace.
    pub fn set_status(&mut self, status: RayStatus) {
        *self.status = status;
    }
}

#[inline]
fn read(buf: &[f64], i: usize) -> Vec3 {
    vec3(buf[3 * i], buf[3 * i + 1], buf[3 * i + 2])
}

#[inline]
fn write(buf: &mut [f64], i: usize, v: &Vec3) {
    buf[3 * i..3 * i + 3].copy_from_slice(&[v.x, v.y, v.z]);
}
