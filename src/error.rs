use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

use crate::xpt::XptError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("cannot open {path:?}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot decode SAS transport file {path:?}: {source}")]
    Transport { path: PathBuf, source: XptError },
    #[error("unsupported input format {path:?}")]
    InputFormat { path: PathBuf },
    #[error("invalid config {path:?}: {source}")]
    Config {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("plot {name} failed: {message}")]
    Plot { name: String, message: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Polars(#[from] PolarsError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
