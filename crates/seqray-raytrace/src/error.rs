//! Error types for the ray tracer.

use thiserror::Error;

use crate::prescription::SurfaceType;

/// Errors raised at the API boundary, before any ray is traced.
///
/// Failures of individual rays are not errors; they are recorded as
/// [`RayStatus::Failed`](crate::RayStatus::Failed) in the output.
#[derive(Error, Debug)]
pub enum TraceError {
    /// Prescription has no surfaces.
    #[error("prescription is empty")]
    EmptyPrescription,

    /// Surface uses an interaction law the tracer does not model.
    #[error("surface {surface}: {kind:?} interaction is not supported")]
    UnsupportedInteraction {
        /// Index of the offending surface.
        surface: usize,
        /// Its interaction type.
        kind: SurfaceType,
    },

    /// Surface geometry parameters are degenerate.
    #[error("surface {surface}: degenerate geometry: {reason}")]
    DegenerateGeometry {
        /// Index of the offending surface.
        surface: usize,
        /// What is wrong with it.
        reason: String,
    },

    /// Surface origin has non-finite components.
    #[error("surface {0}: origin is not finite")]
    InvalidOrigin(usize),

    /// Surface rotation is not a proper rigid rotation.
    #[error("surface {0}: rotation is not orthonormal with determinant +1")]
    InvalidRotation(usize),

    /// Invalid trace options.
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    /// Output buffers do not match the rays or the prescription.
    #[error("output buffers hold {got_rays} rays x {got_surfaces} surfaces, expected {rays} x {surfaces}")]
    BufferShape {
        /// Rays the call needs.
        rays: usize,
        /// Surfaces the call needs.
        surfaces: usize,
        /// Rays the buffers hold.
        got_rays: usize,
        /// Surfaces the buffers hold.
        got_surfaces: usize,
    },

    /// Worker pool could not be created.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Prescription description could not be parsed.
    #[error("invalid prescription description: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for ray tracer operations.
pub type Result<T> = std::result::Result<T, TraceError>;
