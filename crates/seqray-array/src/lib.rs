#![warn(missing_docs)]

//! Array interchange for seqray.
//!
//! An [`Array`] is a dtype tag, a shape, and the raw element bytes in
//! row-major order with no padding. It is the exchange format between the
//! tracer's flat buffers and external numeric tooling.
//!
//! The wire form is a MessagePack map with keys `type` (`"float64"` or
//! `"complex128"`), `shape` and `data` (a binary blob), readable by
//! msgpack-numpy style peers. JSON is available for inspection.
//!
//! Bytes are stored in the platform's native order (little-endian on every
//! supported target).
//!
//! ```
//! use seqray_array::Array;
//!
//! let a = Array::from_f64_matrix(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0])?;
//! assert_eq!(a.shape(), &[2, 3]);
//! assert_eq!(a.as_f64_rows()?[1], vec![4.0, 5.0, 6.0]);
//! # Ok::<(), seqray_array::ArrayError>(())
//! ```

pub mod error;

pub use error::{ArrayError, Result};

use std::fmt;

use nalgebra::{Complex, DMatrix};
use serde::{Deserialize, Serialize};

/// Element type of an [`Array`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dtype {
    /// 64-bit IEEE float.
    Float64,
    /// Pair of 64-bit floats (real, imaginary).
    Complex128,
}

impl Dtype {
    /// Size of one element in bytes.
    pub fn size(self) -> usize {
        match self {
            Dtype::Float64 => 8,
            Dtype::Complex128 => 16,
        }
    }
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dtype::Float64 => f.write_str("float64"),
            Dtype::Complex128 => f.write_str("complex128"),
        }
    }
}

/// A typed, shaped, row-major buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Array {
    #[serde(rename = "type")]
    dtype: Dtype,
    shape: Vec<usize>,
    #[serde(with = "serde_bytes")]
    data: Vec<u8>,
}

impl Array {
    /// Build an array from raw parts, checking that the byte length matches
    /// the shape.
    pub fn from_raw(dtype: Dtype, shape: Vec<usize>, data: Vec<u8>) -> Result<Self> {
        let array = Self { dtype, shape, data };
        array.validate()?;
        Ok(array)
    }

    /// 1-D float array.
    pub fn from_f64_slice(values: &[f64]) -> Self {
        Self {
            dtype: Dtype::Float64,
            shape: vec![values.len()],
            data: bytemuck::cast_slice(values).to_vec(),
        }
    }

    /// Float array of any shape from row-major values.
    pub fn from_f64_shaped(shape: Vec<usize>, values: &[f64]) -> Result<Self> {
        Self::from_raw(Dtype::Float64, shape, bytemuck::cast_slice(values).to_vec())
    }

    /// 2-D float array from row-major values.
    pub fn from_f64_matrix(rows: usize, cols: usize, values: &[f64]) -> Result<Self> {
        Self::from_f64_shaped(vec![rows, cols], values)
    }

    /// 1-D complex array.
    pub fn from_c128_slice(values: &[Complex<f64>]) -> Self {
        let flat: Vec<f64> = values.iter().flat_map(|c| [c.re, c.im]).collect();
        Self {
            dtype: Dtype::Complex128,
            shape: vec![values.len()],
            data: bytemuck::cast_slice(&flat).to_vec(),
        }
    }

    /// Element type.
    pub fn dtype(&self) -> Dtype {
        self.dtype
    }

    /// Dimensions, outermost first.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of dimensions.
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Number of elements implied by the shape.
    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    /// True when the array holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw element bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Check that the data length matches shape and dtype.
    pub fn validate(&self) -> Result<()> {
        let expected = self.len() * self.dtype.size();
        if expected != self.data.len() {
            return Err(ArrayError::ShapeMismatch {
                shape: self.shape.clone(),
                expected,
                got: self.data.len(),
            });
        }
        Ok(())
    }

    /// Flattened float values, any shape.
    pub fn as_f64_vec(&self) -> Result<Vec<f64>> {
        self.expect_dtype(Dtype::Float64)?;
        Ok(self.f64_values())
    }

    /// Rows of a 2-D float array.
    pub fn as_f64_rows(&self) -> Result<Vec<Vec<f64>>> {
        self.expect_dtype(Dtype::Float64)?;
        self.expect_ndim(2)?;
        let cols = self.shape[1];
        let values = self.f64_values();
        if cols == 0 {
            return Ok(vec![Vec::new(); self.shape[0]]);
        }
        Ok(values.chunks_exact(cols).map(<[f64]>::to_vec).collect())
    }

    /// A 2-D float array as an nalgebra matrix.
    pub fn as_f64_matrix(&self) -> Result<DMatrix<f64>> {
        self.expect_dtype(Dtype::Float64)?;
        self.expect_ndim(2)?;
        Ok(DMatrix::from_row_slice(self.shape[0], self.shape[1], &self.f64_values()))
    }

    /// Flattened complex values, any shape.
    pub fn as_c128_vec(&self) -> Result<Vec<Complex<f64>>> {
        self.expect_dtype(Dtype::Complex128)?;
        let values = self.f64_values();
        Ok(values
            .chunks_exact(2)
            .map(|pair| Complex::new(pair[0], pair[1]))
            .collect())
    }

    /// Encode as a MessagePack map.
    pub fn to_msgpack(&self) -> Result<Vec<u8>> {
        Ok(rmp_serde::to_vec_named(self)?)
    }

    /// Decode from MessagePack and validate.
    pub fn from_msgpack(bytes: &[u8]) -> Result<Self> {
        let array: Array = rmp_serde::from_slice(bytes)?;
        array.validate()?;
        Ok(array)
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from JSON and validate.
    pub fn from_json(json: &str) -> Result<Self> {
        let array: Array = serde_json::from_str(json)?;
        array.validate()?;
        Ok(array)
    }

    fn expect_dtype(&self, expected: Dtype) -> Result<()> {
        if self.dtype != expected {
            return Err(ArrayError::WrongDtype { expected, got: self.dtype });
        }
        self.validate()
    }

    fn expect_ndim(&self, expected: usize) -> Result<()> {
        if self.ndim() != expected {
            return Err(ArrayError::WrongNdim { expected, got: self.ndim() });
        }
        Ok(())
    }

    // Data may come from an unaligned source, so read element-wise.
    fn f64_values(&self) -> Vec<f64> {
        self.data
            .chunks_exact(8)
            .map(bytemuck::pod_read_unaligned::<f64>)
            .collect()
    }
}
