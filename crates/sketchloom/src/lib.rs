//! # sketchloom
//!
//! Parametric curve and point generators for generative-art sketches.
//!
//! Data flows one direction:
//!
//! ```text
//! parameters -> point generator -> path accumulator -> drawing (renderer reads it)
//!                        \-> transform/layer engine -/
//! ```
//!
//! Nothing in this crate draws. Every sketch exposes a [`Drawing`] of plain
//! point sequences which the CLI turns into SVG, JSON or a terminal preview.
//!
//! ## Rust Lesson #7: Modules
//!
//! Every module is declared explicitly below. `pub use` re-exports the
//! types most callers need so they can write `sketchloom::Sketch` instead of
//! `sketchloom::sketches::Sketch`.

pub mod config;
pub mod curves;
pub mod drawing;
pub mod error;
pub mod field;
pub mod geometry;
pub mod linkage;
pub mod params;
pub mod path;
pub mod rng;
pub mod sketches;
pub mod spline;
pub mod transform;

// Re-export common types at crate root for convenience.
pub use config::SketchConfig;
pub use drawing::{DrawLayer, Drawing, Stroke};
pub use error::{Result, SketchError};
pub use geometry::{Line, Point, Point3};
pub use params::{ParamKind, ParamSpec, ParamValue, ParameterSet};
pub use path::{Accumulation, GenerationMode, Path};
pub use sketches::{Sketch, SketchKind, SketchStatus};
pub use transform::{View, ViewPreset};
