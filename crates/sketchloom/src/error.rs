//! Error types for sketch generation.
//!
//! Only two conditions ever come out of the point generators:
//! an unsolvable linkage and a degenerate direction vector. Both are
//! recovered locally (freeze or skip) by the sketches; callers see them
//! through [`crate::SketchStatus`] or as a skipped element.
//!
//! Out-of-range parameter values are never errors. They are clamped at
//! the point of use by each sketch's `clamped()` parameters.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SketchError {
    /// Two constraint circles do not meet.
    #[error("linkage unsolvable: centers {distance:.3} apart, radii {r1:.3} and {r2:.3}")]
    LinkageUnsolvable { distance: f64, r1: f64, r2: f64 },

    /// A tangent or normal vector is too short to normalize.
    #[error("degenerate direction: magnitude {magnitude:e}")]
    DegenerateDirection { magnitude: f64 },

    #[error("unknown sketch: {0}")]
    UnknownSketch(String),

    #[error("unknown parameter '{name}' for {sketch}")]
    UnknownParameter { sketch: &'static str, name: String },

    #[error("invalid value for '{name}': {reason}")]
    InvalidParameterValue { name: String, reason: String },
}

pub type Result<T> = std::result::Result<T, SketchError>;
