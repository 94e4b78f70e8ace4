//! CLI command implementations.
//!
//! This module contains the implementations for the various CLI subcommands:
//! - `render` - Regenerate one sketch and export SVG, JSON or PNG
//! - `sketches` - List available sketches
//! - `params` - List a sketch's parameters or dump its default config
//! - `recipe` - Compose several sketches on one canvas from YAML
//! - `benchmark` - Time sketch generation

pub mod benchmark;
pub mod common;
pub mod error;
pub mod params;
pub mod recipe;
pub mod render;

pub use benchmark::cmd_benchmark;
pub use error::{CliError, CliResult};
pub use params::{cmd_params, cmd_sketches};
pub use recipe::cmd_recipe;
pub use render::cmd_render;
