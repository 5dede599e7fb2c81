//! Conversions between trace buffers and [`Array`]s.
//!
//! Trace buffers export as `[rays, surfaces + 1, 3]` float arrays, matching
//! their in-memory layout. Input rays are read from a pair of `[n, 3]` arrays.

use seqray_array::Array;
use seqray_math::vec3;
use seqray_raytrace::{Ray, TraceBuffers};

use crate::{Result, SeqrayError};

fn trajectory_shape(buffers: &TraceBuffers) -> Vec<usize> {
    vec![buffers.rays(), buffers.surfaces() + 1, 3]
}

/// Positions of every trajectory as a `[rays, surfaces + 1, 3]` array.
pub fn positions_array(buffers: &TraceBuffers) -> Result<Array> {
    Ok(Array::from_f64_shaped(trajectory_shape(buffers), buffers.positions())?)
}

/// Directions of every trajectory as a `[rays, surfaces + 1, 3]` array.
pub fn directions_array(buffers: &TraceBuffers) -> Result<Array> {
    Ok(Array::from_f64_shaped(trajectory_shape(buffers), buffers.directions())?)
}

/// Split rays into `[n, 3]` position and direction arrays.
pub fn rays_to_arrays(rays: &[Ray]) -> Result<(Array, Array)> {
    let mut positions = Vec::with_capacity(rays.len() * 3);
    let mut directions = Vec::with_capacity(rays.len() * 3);
    for ray in rays {
        positions.extend_from_slice(ray.position.as_slice());
        directions.extend_from_slice(ray.direction.as_slice());
    }
    let shape = vec![rays.len(), 3];
    Ok((
        Array::from_f64_shaped(shape.clone(), &positions)?,
        Array::from_f64_shaped(shape, &directions)?,
    ))
}

/// Build input rays from `[n, 3]` position and direction arrays.
pub fn rays_from_arrays(positions: &Array, directions: &Array) -> Result<Vec<Ray>> {
    let p = ray_rows(positions)?;
    let d = ray_rows(directions)?;
    if p.len() != d.len() {
        return Err(SeqrayError::RayCount { positions: p.len(), directions: d.len() });
    }
    Ok(p.chunks_exact(3)
        .zip(d.chunks_exact(3))
        .map(|(p, d)| Ray::new(vec3(p[0], p[1], p[2]), vec3(d[0], d[1], d[2])))
        .collect())
}

// Flat values of an `[n, 3]` float array; length is a multiple of three.
fn ray_rows(array: &Array) -> Result<Vec<f64>> {
    if array.ndim() != 2 || array.shape()[1] != 3 {
        return Err(SeqrayError::RayShape(array.shape().to_vec()));
    }
    Ok(array.as_f64_vec()?)
}
