#![warn(missing_docs)]

//! Thin-film multilayer optics.
//!
//! Computes the complex amplitude reflection and transmission coefficients of
//! a stack of thin films using characteristic (transfer) matrices. Each layer
//! contributes a 2x2 complex matrix; the stack matrix is the ordered product,
//! bracketed by the ambient (front) and substrate (back) boundary matrices.
//!
//! The last layer of the stack is the exit medium: its index terminates the
//! stack and a large thickness makes it behave as a substrate.
//!
//! This crate shares no state with the ray tracer and can be evaluated from
//! any number of threads.
//!
//! # Example
//!
//! ```
//! use seqray_thinfilm::{multilayer_rt, reflectance, Complex64, Layer, Polarization};
//!
//! let stack = [
//!     Layer::new(0.15, Complex64::new(1.3698, 0.0)),      // MgF2
//!     Layer::new(10_000.0, Complex64::new(1.458461, 0.0)), // fused silica
//! ];
//! let (r, _t) = multilayer_rt(Polarization::P, 0.587725, &stack, 0.0, true)?;
//! assert!((reflectance(r) - 0.022).abs() < 1e-3);
//! # Ok::<(), seqray_thinfilm::FilmError>(())
//! ```

pub mod error;

pub use error::{FilmError, Result};

use std::f64::consts::PI;

use nalgebra::Matrix2;

/// Complex number used for refractive indices and amplitudes.
pub type Complex64 = nalgebra::Complex<f64>;

/// 2x2 complex characteristic matrix.
pub type Mat2C = Matrix2<Complex64>;

/// `-i`, the phase factor of the off-diagonal matrix terms.
const NEG_I: Complex64 = Complex64::new(0.0, -1.0);

/// Polarization state of the incident light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Polarization {
    /// Electric field perpendicular to the plane of incidence (TE).
    S,
    /// Electric field in the plane of incidence (TM).
    P,
}

/// One film in a stack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layer {
    /// Physical thickness, in the same units as the wavelength.
    pub thickness: f64,
    /// Complex refractive index `n + ik`.
    pub index: Complex64,
}

impl Layer {
    /// Create a layer.
    pub fn new(thickness: f64, index: Complex64) -> Self {
        Self { thickness, index }
    }

    /// Create a non-absorbing layer.
    pub fn real(thickness: f64, n: f64) -> Self {
        Self::new(thickness, Complex64::new(n, 0.0))
    }
}

/// Characteristic matrix of a layer for s-polarized light.
///
/// `theta` is the (complex) propagation angle inside the layer.
pub fn characteristic_matrix_s(
    wavelength: f64,
    thickness: f64,
    n: Complex64,
    theta: Complex64,
) -> Mat2C {
    let cos_t = theta.cos();
    let beta = Complex64::new(2.0 * PI / wavelength, 0.0) * n * thickness * cos_t;
    let (sin_b, cos_b) = (beta.sin(), beta.cos());
    Mat2C::new(
        cos_b,
        NEG_I * sin_b / (n * cos_t),
        NEG_I * n * cos_t * sin_b,
        cos_b,
    )
}

/// Characteristic matrix of a layer for p-polarized light.
pub fn characteristic_matrix_p(
    wavelength: f64,
    thickness: f64,
    n: Complex64,
    theta: Complex64,
) -> Mat2C {
    let cos_t = theta.cos();
    let beta = Complex64::new(2.0 * PI / wavelength, 0.0) * n * thickness * cos_t;
    let (sin_b, cos_b) = (beta.sin(), beta.cos());
    Mat2C::new(
        cos_b,
        NEG_I * sin_b * cos_t / n,
        NEG_I * n * sin_b / cos_t,
        cos_b,
    )
}

/// Refraction angle from Snell's law, `n0 sin(theta) = n1 sin(theta')`.
pub fn snell_angle(n0: Complex64, n1: Complex64, theta: Complex64) -> Complex64 {
    (n0 / n1 * theta.sin()).asin()
}

/// Amplitude reflection coefficient of a full system matrix.
pub fn total_r(m: &Mat2C) -> Complex64 {
    m[(1, 0)] / m[(0, 0)]
}

/// Amplitude transmission coefficient of a full system matrix.
pub fn total_t(m: &Mat2C) -> Complex64 {
    Complex64::new(1.0, 0.0) / m[(0, 0)]
}

/// Power reflectance `|r|²` from an amplitude coefficient.
pub fn reflectance(r: Complex64) -> f64 {
    r.norm_sqr()
}

/// Amplitude reflection and transmission coefficients `(r, t)` of a stack.
///
/// `aoi_deg` is the angle of incidence in degrees. With `vacuum_ambient` the
/// light arrives from a medium of index 1; otherwise the first layer's index
/// is used as the ambient medium.
pub fn multilayer_rt(
    polarization: Polarization,
    wavelength: f64,
    stack: &[Layer],
    aoi_deg: f64,
    vacuum_ambient: bool,
) -> Result<(Complex64, Complex64)> {
    if stack.is_empty() {
        return Err(FilmError::EmptyStack);
    }
    if !(wavelength.is_finite() && wavelength > 0.0) {
        return Err(FilmError::InvalidWavelength(wavelength));
    }
    if let Some((index, layer)) = stack
        .iter()
        .enumerate()
        .find(|(_, l)| !(l.thickness.is_finite() && l.thickness >= 0.0))
    {
        return Err(FilmError::InvalidThickness { index, thickness: layer.thickness });
    }

    let one = Complex64::new(1.0, 0.0);
    let zero = Complex64::new(0.0, 0.0);

    let aoi = aoi_deg.to_radians();
    let ambient = if vacuum_ambient { one } else { stack[0].index };
    let cos0 = Complex64::new(aoi.cos(), 0.0);
    let scale = one / (2.0 * ambient * cos0);

    let mut n0 = ambient;
    let mut n1 = ambient;
    let mut theta = Complex64::new(aoi, 0.0);
    let mut product = Mat2C::identity();
    for layer in stack {
        n1 = layer.index;
        let theta1 = snell_angle(n0, n1, theta);
        let m = match polarization {
            Polarization::S => characteristic_matrix_s(wavelength, layer.thickness, n1, theta1),
            Polarization::P => characteristic_matrix_p(wavelength, layer.thickness, n1, theta1),
        };
        product *= m;
        theta = theta1;
        n0 = n1;
    }

    let cos1 = theta.cos();
    let (front, back) = match polarization {
        Polarization::S => {
            let n0_cos0 = ambient * cos0;
            (
                Mat2C::new(n0_cos0, one, n0_cos0, -one),
                Mat2C::new(one, zero, n1 * cos1, zero),
            )
        }
        Polarization::P => (
            Mat2C::new(ambient, cos0, ambient, -cos0),
            Mat2C::new(cos1, zero, n1, zero),
        ),
    };

    let system = front * product * back * scale;
    Ok((total_r(&system), total_t(&system)))
}
