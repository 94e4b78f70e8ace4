//! Errors surfaced by CLI commands.

use std::path::PathBuf;

use sketchloom::SketchError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Sketch(#[from] SketchError),

    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },

    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: std::io::Error },

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),

    #[error("rasterizing failed: {0}")]
    Raster(String),

    #[error("{0}")]
    Usage(String),
}

impl CliError {
    pub fn usage(message: impl Into<String>) -> Self {
        CliError::Usage(message.into())
    }
}

pub type CliResult<T = ()> = Result<T, CliError>;
