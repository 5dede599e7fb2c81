//! Trace options and serializable prescription descriptions.

use serde::{Deserialize, Serialize};
use seqray_math::{mat3_from_rows, Vec3};

use crate::error::{Result, TraceError};
use crate::geometry::{Conic, ConstantIndex, Plane};
use crate::intersect::{DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE};
use crate::prescription::{Prescription, Surface, SurfaceType};

/// Solver and medium parameters shared by every ray of a trace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceOptions {
    /// Newton convergence tolerance on the path-length update.
    pub tolerance: f64,
    /// Newton iteration cap per surface.
    pub max_iterations: usize,
    /// Wavelength, passed through to glass models. Units are the caller's.
    pub wavelength: f64,
    /// Refractive index of the ambient medium, passed through.
    pub ambient_index: f64,
}

impl Default for TraceOptions {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            wavelength: 0.6328,
            ambient_index: 1.0,
        }
    }
}

impl TraceOptions {
    /// Validate options.
    pub fn validate(&self) -> Result<()> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(TraceError::InvalidOptions(
                "tolerance must be positive and finite".into(),
            ));
        }
        if self.max_iterations == 0 {
            return Err(TraceError::InvalidOptions(
                "max_iterations must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Serializable surface shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GeometrySpec {
    /// [`Plane`].
    Plane,
    /// [`Conic`] with curvature `c` and conic constant `k`.
    Conic {
        /// Vertex curvature.
        c: f64,
        /// Conic constant.
        #[serde(default)]
        k: f64,
    },
}

/// Serializable surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSpec {
    /// Interaction law.
    pub kind: SurfaceType,
    /// Vertex position in world coordinates.
    pub origin: [f64; 3],
    /// World-to-local rotation as nine row-major values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<[f64; 9]>,
    /// Surface shape.
    pub geometry: GeometrySpec,
    /// Constant refractive index of the medium behind the surface.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<f64>,
}

/// Serializable prescription, e.g. loaded from a JSON file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrescriptionSpec {
    /// Surfaces in trace order.
    pub surfaces: Vec<SurfaceSpec>,
}

impl From<&SurfaceSpec> for Surface {
    fn from(spec: &SurfaceSpec) -> Surface {
        let [x, y, z] = spec.origin;
        let origin = Vec3::new(x, y, z);
        let mut surface = match spec.geometry {
            GeometrySpec::Plane => Surface::new(spec.kind, origin, Plane),
            GeometrySpec::Conic { c, k } => Surface::new(spec.kind, origin, Conic::new(c, k)),
        };
        if let Some(rows) = spec.rotation {
            surface = surface.with_rotation(mat3_from_rows(rows));
        }
        if let Some(n) = spec.index {
            surface = surface.with_glass(ConstantIndex(n));
        }
        surface
    }
}

impl Prescription {
    /// Build and validate a prescription from its description.
    pub fn from_spec(spec: &PrescriptionSpec) -> Result<Self> {
        Prescription::new(spec.surfaces.iter().map(Surface::from).collect())
    }

    /// Parse a JSON prescription description and build it.
    pub fn from_json(json: &str) -> Result<Self> {
        let spec: PrescriptionSpec = serde_json::from_str(json)?;
        Self::from_spec(&spec)
    }
}
