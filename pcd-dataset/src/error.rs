use std::{io, path::PathBuf};

use pcd_core::label::LabelError;
use pcd_parser::ReadError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("dataset root {} does not exist or is not a directory", .0.display())]
    RootNotFound(PathBuf),
    #[error("failed to list {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{} does not follow the scene<N> naming convention", path.display())]
    InvalidSceneName { path: PathBuf },
    #[error("{} has no '{folder}' folder", scene.display())]
    MissingSensorFolder { scene: PathBuf, folder: String },
    #[error("the scan index is empty")]
    EmptyDataset,
    #[error("{} has {columns} columns, at least 4 are required (x, y, z, attribute)", path.display())]
    MalformedScan { path: PathBuf, columns: usize },
    #[error(transparent)]
    Read(#[from] ReadError),
    #[error(transparent)]
    Label(#[from] LabelError),
    #[error("invalid dataset configuration: {0}")]
    Config(String),
    #[error("failed to read config {}: {source}", path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unknown dataset type '{name}' (registered: {registered})")]
    UnknownDataset { name: String, registered: String },
}

impl DatasetError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
