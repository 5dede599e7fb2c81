//! Error types for thin-film calculations.

use thiserror::Error;

/// Errors that can occur evaluating a film stack.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilmError {
    /// Stack has no layers.
    #[error("film stack is empty")]
    EmptyStack,

    /// Wavelength is not positive and finite.
    #[error("invalid wavelength: {0}")]
    InvalidWavelength(f64),

    /// Layer thickness is negative or not finite.
    #[error("layer {index}: invalid thickness {thickness}")]
    InvalidThickness {
        /// Index of the layer in the stack.
        index: usize,
        /// The offending thickness.
        thickness: f64,
    },
}

/// Result type for thin-film operations.
pub type Result<T> = std::result::Result<T, FilmError>;
