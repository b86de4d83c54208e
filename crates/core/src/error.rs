//! Error types for the fresco toolkit.

use thiserror::Error;

/// Errors produced by toolkit and sketch operations.
#[derive(Debug, Error)]
pub enum FrescoError {
    /// Width or height was zero (or overflowed) when creating a field or canvas.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// A requested parameter name was not found in the params object.
    #[error("parameter not found: {0}")]
    ParamNotFound(String),

    /// A parameter existed but had the wrong JSON type.
    #[error("parameter type mismatch for '{name}': expected {expected}, got {got}")]
    ParamTypeMismatch {
        name: String,
        expected: String,
        got: String,
    },

    /// An (x, y) coordinate was outside the bounds of a non-wrapping grid.
    #[error("index ({x}, {y}) out of bounds for grid of size ({width}, {height})")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    /// Two grids had incompatible dimensions for an element-wise operation.
    #[error("dimension mismatch: ({lhs_w}, {lhs_h}) vs ({rhs_w}, {rhs_h})")]
    DimensionMismatch {
        lhs_w: usize,
        lhs_h: usize,
        rhs_w: usize,
        rhs_h: usize,
    },

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// A palette could not be constructed or looked up.
    #[error("invalid palette: {0}")]
    InvalidPalette(String),

    /// A shape was asked for fewer vertices than it can hold.
    #[error("invalid resolution {got}: at least {min} vertices required")]
    InvalidResolution { got: usize, min: usize },

    /// A shape has no extent (zero perimeter or too few vertices).
    #[error("degenerate shape: {0}")]
    DegenerateShape(String),

    /// No sketch is registered under the given name.
    #[error("unknown sketch: {0}")]
    UnknownSketch(String),

    /// An I/O failure while writing output.
    #[error("i/o error: {0}")]
    Io(String),
}
