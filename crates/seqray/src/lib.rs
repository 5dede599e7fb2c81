#![warn(missing_docs)]

//! seqray: sequential optical ray tracing.
//!
//! Re-exports the workspace crates under one roof:
//!
//! - [`math`]: vectors and rotations
//! - [`raytrace`]: prescriptions, the Newton-Raphson intersection solver, and
//!   the single, batch and parallel tracers
//! - [`thinfilm`]: multilayer coating reflectance
//! - [`array`]: typed buffers for numeric tooling
//!
//! The [`interchange`] module moves trace buffers in and out of arrays.
//!
//! # Example
//!
//! ```rust
//! use seqray::raytrace::{
//!     trace_parallel, Plane, Prescription, Ray, Surface, TraceBuffers, TraceOptions,
//! };
//! use seqray::math::vec3;
//! use seqray::interchange::positions_array;
//!
//! let prescription = Prescription::new(vec![Surface::stop(vec3(0.0, 0.0, 10.0), Plane)])?;
//! let rays: Vec<Ray> = (0..4)
//!     .map(|i| Ray::new(vec3(i as f64, 0.0, 0.0), vec3(0.0, 0.0, 1.0)))
//!     .collect();
//! let mut buffers = TraceBuffers::allocate(rays.len(), prescription.len());
//! trace_parallel(&prescription, &rays, &TraceOptions::default(), 2, &mut buffers)?;
//!
//! let positions = positions_array(&buffers)?;
//! assert_eq!(positions.shape(), &[4, 2, 3]);
//! # Ok::<(), seqray::SeqrayError>(())
//! ```

pub mod interchange;

pub use seqray_array as array;
pub use seqray_math as math;
pub use seqray_raytrace as raytrace;
pub use seqray_thinfilm as thinfilm;

use thiserror::Error;

/// Errors from any part of the workspace.
#[derive(Error, Debug)]
pub enum SeqrayError {
    /// Tracing or prescription error.
    #[error(transparent)]
    Trace(#[from] raytrace::TraceError),
    /// Thin-film calculation error.
    #[error(transparent)]
    Film(#[from] thinfilm::FilmError),
    /// Array interchange error.
    #[error(transparent)]
    Array(#[from] array::ArrayError),
    /// Ray arrays must have shape `[n, 3]`.
    #[error("ray array has shape {0:?}, expected [n, 3]")]
    RayShape(Vec<usize>),
    /// Position and direction arrays hold different ray counts.
    #[error("{positions} ray positions but {directions} directions")]
    RayCount {
        /// Rows in the position array.
        positions: usize,
        /// Rows in the direction array.
        directions: usize,
    },
}

/// Result type for facade operations.
pub type Result<T> = std::result::Result<T, SeqrayError>;
