//! Sequential tracing of many rays into preallocated buffers.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::buffer::{BufferRegion, TraceBuffers};
use crate::config::TraceOptions;
use crate::error::{Result, TraceError};
use crate::prescription::Prescription;
use crate::trace::trace_into;
use crate::Ray;

/// Counts of ray outcomes in a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Rays resolved at every surface.
    pub traced: usize,
    /// Rays that failed at some surface.
    pub failed: usize,
}

impl BatchSummary {
    /// Total rays accounted for.
    pub fn total(&self) -> usize {
        self.traced + self.failed
    }

    /// Combine the counts of two disjoint batches.
    pub fn merge(self, other: BatchSummary) -> BatchSummary {
        BatchSummary {
            traced: self.traced + other.traced,
            failed: self.failed + other.failed,
        }
    }
}

/// Trace `rays` in order, writing ray `i` into slot `i` of `buffers`.
///
/// `buffers` must have been allocated for `rays.len()` rays and
/// `prescription.len()` surfaces. A failing ray is recorded in its own slot
/// and never affects the others.
pub fn trace_batch(
    prescription: &Prescription,
    rays: &[Ray],
    options: &TraceOptions,
    buffers: &mut TraceBuffers,
) -> Result<BatchSummary> {
    options.validate()?;
    check_shape(prescription, rays, buffers)?;

    let summary = trace_region(prescription, rays, options, buffers.region_mut());
    debug!(
        "traced {} rays through {} surfaces: {} ok, {} failed",
        rays.len(),
        prescription.len(),
        summary.traced,
        summary.failed
    );
    if summary.failed > 0 {
        warn!("{} of {} rays failed", summary.failed, rays.len());
    }
    Ok(summary)
}

/// Trace `rays` into a region holding exactly as many rays.
pub(crate) fn trace_region(
    prescription: &Prescription,
    rays: &[Ray],
    options: &TraceOptions,
    region: BufferRegion<'_>,
) -> BatchSummary {
    debug_assert_eq!(rays.len(), region.len());

    let mut summary = BatchSummary::default();
    for (ray, out) in rays.iter().zip(region.into_rays()) {
        if trace_into(prescription, ray, options, out).is_traced() {
            summary.traced += 1;
        } else {
            summary.failed += 1;
        }
    }
    summary
}

pub(crate) fn check_shape(
    prescription: &Prescription,
    rays: &[Ray],
    buffers: &TraceBuffers,
) -> Result<()> {
    if buffers.rays() != rays.len() || buffers.surfaces() != prescription.len() {
        return Err(TraceError::BufferShape {
            rays: rays.len(),
            surfaces: prescription.len(),
            got_rays: buffers.rays(),
            got_surfaces: buffers.surfaces(),
        });
    }
    Ok(())
}
