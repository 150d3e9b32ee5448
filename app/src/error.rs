use std::path::PathBuf;

use pcd_core::{label::LabelError, pointcloud::point::ShapeError};
use pcd_dataset::DatasetError;
use pcd_parser::{ReadError, WriteError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Read(#[from] ReadError),
    #[error(transparent)]
    Write(#[from] WriteError),
    #[error(transparent)]
    Label(#[from] LabelError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("failed to access {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid glob pattern '{pattern}'")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
    #[error("invalid label file {}: {message}", path.display())]
    Labels { path: PathBuf, message: String },
    #[error("cannot reshape {}", path.display())]
    Shape {
        path: PathBuf,
        #[source]
        source: ShapeError,
    },
    #[error("no input files matched")]
    NoInputs,
}

pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> AppError {
    let path = path.into();
    move |source| AppError::Io { path, source }
}
