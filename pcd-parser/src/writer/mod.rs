pub mod pcd;

use std::path::{Path, PathBuf};

use pcd_core::pointcloud::point::RawScan;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to write {}: {message}", path.display())]
    Codec { path: PathBuf, message: String },
    #[error("scan has {columns} columns, at least {required} are needed (x, y, z, intensity)")]
    TooFewColumns { columns: usize, required: usize },
    #[error("label channel '{channel}' has {found} values for {expected} points")]
    LabelCount {
        channel: String,
        expected: usize,
        found: usize,
    },
    #[error("label channel '{channel}' holds {value} at point {point}, outside 0..=65535")]
    LabelRange {
        channel: String,
        point: usize,
        value: i64,
    },
    #[error("field '{0}' is written more than once")]
    DuplicateField(String),
}

impl WriteError {
    pub(crate) fn codec(path: &Path, err: impl std::fmt::Display) -> Self {
        Self::Codec {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

/// One per-point label column attached to an exported scan.
#[derive(Debug, Clone, Copy)]
pub struct LabelChannel<'a> {
    pub name: &'a str,
    pub values: &'a [i64],
}

impl<'a> LabelChannel<'a> {
    pub fn new(name: &'a str, values: &'a [i64]) -> Self {
        Self { name, values }
    }
}

/// Writes a previously read scan together with externally supplied labels.
pub trait ScanWriter {
    fn write_scan(
        &self,
        scan: &RawScan,
        labels: &[LabelChannel<'_>],
        path: &Path,
    ) -> Result<(), WriteError>;
}
