//! Fork-join tracing across a fixed number of workers.
//!
//! Rays are split into contiguous ranges, one per worker. Each worker owns
//! the matching contiguous block of the output buffers and runs the
//! sequential batch loop over it, so no locking is needed and every ray lands
//! in the same slot it would occupy in a sequential trace. The call returns
//! only after every worker has finished.

use std::ops::Range;

use log::debug;

use crate::batch::{check_shape, trace_region, BatchSummary};
use crate::buffer::TraceBuffers;
use crate::config::TraceOptions;
use crate::error::{Result, TraceError};
use crate::prescription::Prescription;
use crate::Ray;

/// Split `n` items into `workers` contiguous ranges.
///
/// The first `workers - 1` ranges hold `n / workers` items each and the last
/// holds the remainder. Returns no ranges when `workers` is zero.
pub fn partition(n: usize, workers: usize) -> Vec<Range<usize>> {
    if workers == 0 {
        return Vec::new();
    }
    let share = n / workers;
    let mut ranges: Vec<Range<usize>> = (0..workers - 1)
        .map(|w| w * share..(w + 1) * share)
        .collect();
    ranges.push((workers - 1) * share..n);
    ranges
}

/// Trace `rays` on `workers` threads, writing ray `i` into slot `i`.
///
/// Produces bit-identical output to [`trace_batch`](crate::trace_batch)
/// for any worker count. Per-ray failures are recorded in the buffers and
/// never stop other rays or workers.
pub fn trace_parallel(
    prescription: &Prescription,
    rays: &[Ray],
    options: &TraceOptions,
    workers: usize,
    buffers: &mut TraceBuffers,
) -> Result<BatchSummary> {
    if workers == 0 {
        return Err(TraceError::InvalidOptions("workers must be at least 1".into()));
    }
    options.validate()?;
    check_shape(prescription, rays, buffers)?;

    let ranges = partition(rays.len(), workers);
    debug!(
        "tracing {} rays on {} workers, {} per worker (last {})",
        rays.len(),
        workers,
        rays.len() / workers,
        ranges.last().map_or(0, |r| r.len())
    );

    let mut regions = Vec::with_capacity(workers);
    let mut rest = buffers.region_mut();
    for range in &ranges {
        let (head, tail) = rest.split_at(range.len());
        regions.push(head);
        rest = tail;
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("seqray-trace-{i}"))
        .build()?;

    let mut summaries = vec![BatchSummary::default(); workers];
    pool.scope(|scope| {
        for ((range, region), summary) in ranges.iter().zip(regions).zip(summaries.iter_mut()) {
            let chunk = &rays[range.clone()];
            scope.spawn(move |_| {
                *summary = trace_region(prescription, chunk, options, region);
            });
        }
    });

    let summary = summaries
        .into_iter()
        .fold(BatchSummary::default(), BatchSummary::merge);
    debug!("parallel trace done: {} ok, {} failed", summary.traced, summary.failed);
    Ok(summary)
}
