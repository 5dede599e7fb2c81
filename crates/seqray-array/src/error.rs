//! Error types for array interchange.

use thiserror::Error;

use crate::Dtype;

/// Errors raised when building or reading an [`Array`](crate::Array).
#[derive(Debug, Error)]
pub enum ArrayError {
    /// The array holds a different element type than requested.
    #[error("wrong dtype: expected {expected}, got {got}")]
    WrongDtype {
        /// Requested element type.
        expected: Dtype,
        /// Element type stored in the array.
        got: Dtype,
    },

    /// The array has a different number of dimensions than requested.
    #[error("wrong number of dimensions: expected {expected}, got {got}")]
    WrongNdim {
        /// Requested dimension count.
        expected: usize,
        /// Dimension count of the array.
        got: usize,
    },

    /// The data length does not match the shape.
    #[error("shape {shape:?} needs {expected} bytes, data has {got}")]
    ShapeMismatch {
        /// Declared shape.
        shape: Vec<usize>,
        /// Byte length implied by the shape and dtype.
        expected: usize,
        /// Actual byte length.
        got: usize,
    },

    /// MessagePack encoding failed.
    #[error("MessagePack encode error: {0}")]
    MsgpackEncode(#[from] rmp_serde::encode::Error),

    /// MessagePack decoding failed.
    #[error("MessagePack decode error: {0}")]
    MsgpackDecode(#[from] rmp_serde::decode::Error),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for array operations.
pub type Result<T> = std::result::Result<T, ArrayError>;
