//! Surfaces and the ordered prescription a ray traverses.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use seqray_math::{is_finite, is_rotation, Mat3, Vec3};

use crate::error::{Result, TraceError};
use crate::geometry::{Geometry, Glass};

/// Tolerance for accepting a surface rotation as rigid.
const ROTATION_TOLERANCE: f64 = 1e-9;

/// How a ray interacts with a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceType {
    /// Mirror: the direction is reflected about the surface normal.
    Reflect,
    /// Refracting interface between two media. Not modelled by the tracer;
    /// prescriptions containing it are rejected.
    Refract,
    /// Aperture or image plane: the ray is located on the surface and its
    /// direction is left unchanged.
    Stop,
}

impl SurfaceType {
    /// Whether the tracer implements this interaction law.
    pub fn is_supported(self) -> bool {
        !matches!(self, SurfaceType::Refract)
    }
}

/// One element of a prescription.
#[derive(Debug, Clone)]
pub struct Surface {
    /// Interaction law applied at the surface.
    pub kind: SurfaceType,
    /// Position of the surface vertex in world coordinates.
    pub origin: Vec3,
    /// World-to-local rotation. `None` is the identity.
    pub rotation: Option<Mat3>,
    /// Shape of the surface.
    pub geometry: Arc<dyn Geometry>,
    /// Medium behind the surface, if any.
    pub glass: Option<Arc<dyn Glass>>,
}

impl Surface {
    /// Create an unrotated surface with no glass.
    pub fn new(kind: SurfaceType, origin: Vec3, geometry: impl Geometry + 'static) -> Self {
        Self {
            kind,
            origin,
            rotation: None,
            geometry: Arc::new(geometry),
            glass: None,
        }
    }

    /// A mirror at `origin`.
    pub fn reflect(origin: Vec3, geometry: impl Geometry + 'static) -> Self {
        Self::new(SurfaceType::Reflect, origin, geometry)
    }

    /// A stop (aperture or image plane) at `origin`.
    pub fn stop(origin: Vec3, geometry: impl Geometry + 'static) -> Self {
        Self::new(SurfaceType::Stop, origin, geometry)
    }

    /// Set the world-to-local rotation.
    pub fn with_rotation(mut self, rotation: Mat3) -> Self {
        self.rotation = Some(rotation);
        self
    }

    /// Set the medium behind the surface.
    pub fn with_glass(mut self, glass: impl Glass + 'static) -> Self {
        self.glass = Some(Arc::new(glass));
        self
    }

    fn validate(&self, index: usize) -> Result<()> {
        if !self.kind.is_supported() {
            return Err(TraceError::UnsupportedInteraction {
                surface: index,
                kind: self.kind,
            });
        }
        if !is_finite(&self.origin) {
            return Err(TraceError::InvalidOrigin(index));
        }
        if let Some(r) = &self.rotation {
            if !is_rotation(r, ROTATION_TOLERANCE) {
                return Err(TraceError::InvalidRotation(index));
            }
        }
        self.geometry
            .validate()
            .map_err(|reason| TraceError::DegenerateGeometry { surface: index, reason })
    }
}

/// An ordered, validated sequence of surfaces.
///
/// A `Prescription` can only be built through [`Prescription::new`], so every
/// instance has at least one surface and only supported interactions. It is
/// immutable once built and is shared by reference across all rays of a
/// trace.
#[derive(Debug, Clone)]
pub struct Prescription {
    surfaces: Vec<Surface>,
}

impl Prescription {
    /// Validate and wrap an ordered list of surfaces.
    pub fn new(surfaces: Vec<Surface>) -> Result<Self> {
        if surfaces.is_empty() {
            return Err(TraceError::EmptyPrescription);
        }
        for (index, surface) in surfaces.iter().enumerate() {
            surface.validate(index)?;
        }
        Ok(Self { surfaces })
    }

    /// Surfaces in trace order.
    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    /// Number of surfaces.
    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    /// Always false: empty prescriptions are rejected at construction.
    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// Length of every trajectory traced through this prescription.
    pub fn trajectory_len(&self) -> usize {
        self.surfaces.len() + 1
    }
}
