#![warn(missing_docs)]

//! Sequential ray tracing through optical prescriptions.
//!
//! A prescription is an ordered list of surfaces (mirrors, stops, ...). Each
//! ray visits the surfaces strictly in order: it is moved into the surface's
//! local frame, intersected with the surface shape by Newton-Raphson
//! iteration, redirected by the surface's interaction law, and moved back to
//! world coordinates.
//!
//! # Architecture
//!
//! - [`geometry`] - Surface shapes as pure `(x, y) -> (sag, normal)` functions
//! - [`transform`] - World/local frame conversion
//! - [`intersect`] - Newton-Raphson ray-surface solver
//! - [`interact`] - Reflection and stop laws
//! - [`trace_ray`] - One ray through the whole prescription
//! - [`trace_batch`] / [`trace_parallel`] - Many rays, sequentially or fork-join
//! - [`TraceBuffers`] - Contiguous output storage
//!
//! # Example
//!
//! ```
//! use seqray_math::vec3;
//! use seqray_raytrace::{trace_ray, Conic, Plane, Prescription, Ray, Surface, TraceOptions};
//!
//! let rx = Prescription::new(vec![
//!     Surface::reflect(vec3(0.0, 0.0, 5.0), Conic::new(-0.05, -1.0)),
//!     Surface::stop(vec3(0.0, 0.0, -5.0), Plane),
//! ])?;
//!
//! let ray = Ray::new(vec3(0.0, 1.0, 2.0), vec3(0.0, 0.0, 1.0));
//! let trace = trace_ray(&rx, &ray, &TraceOptions::default());
//! assert!(trace.status.is_traced());
//! assert!(trace.directions[1].z < 0.0);
//! # Ok::<(), seqray_raytrace::TraceError>(())
//! ```

mod ray;
pub mod batch;
pub mod buffer;
pub mod config;
pub mod error;
pub mod geometry;
pub mod interact;
pub mod intersect;
pub mod parallel;
pub mod prescription;
pub mod trace;
pub mod transform;

pub use batch::{trace_batch, BatchSummary};
pub use buffer::{BufferRegion, TraceBuffers, TrajectoryView, TrajectoryViewMut};
pub use config::{GeometrySpec, PrescriptionSpec, SurfaceSpec, TraceOptions};
pub use error::{Result, TraceError};
pub use geometry::{Conic, ConstantIndex, Geometry, Glass, Plane};
pub use intersect::{FailReason, SurfaceIntersection};
pub use parallel::{partition, trace_parallel};
pub use prescription::{Prescription, Surface, SurfaceType};
pub use ray::Ray;
pub use trace::{trace_ray, trace_ray_into, RayStatus, Trace};
