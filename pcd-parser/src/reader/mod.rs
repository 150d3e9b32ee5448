pub mod bin;
pub mod csv;
pub mod las;
pub mod pcd;

use std::{
    fmt::Display,
    io,
    path::{Path, PathBuf},
};

use pcd_core::pointcloud::point::{RawScan, ShapeError};
use thiserror::Error;

use self::{bin::BinScanReader, csv::CsvScanReader, las::LasScanReader, pcd::PcdScanReader};

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to decode {}: {message}", path.display())]
    Codec { path: PathBuf, message: String },
    #[error("{} has no '{field}' field", path.display())]
    MissingField { path: PathBuf, field: String },
    #[error("field '{field}' in {} must hold exactly one value per point", path.display())]
    UnsupportedField { path: PathBuf, field: String },
    #[error("{} is {len} bytes, not a whole number of {columns}-column float32 points", path.display())]
    Truncated {
        path: PathBuf,
        len: usize,
        columns: usize,
    },
    #[error("unsupported scan extension: {0}")]
    UnsupportedExtension(String),
    #[error("invalid point layout in {}: {source}", path.display())]
    Shape {
        path: PathBuf,
        #[source]
        source: ShapeError,
    },
}

impl ReadError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn codec(path: &Path, err: impl Display) -> Self {
        Self::Codec {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }

    pub(crate) fn shape(path: &Path, source: ShapeError) -> Self {
        Self::Shape {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Reads one scan file into a row-major attribute array, coordinates first.
///
/// Implementations are shared between dataset workers, so they must be safe to
/// call concurrently on distinct files.
pub trait ScanReader: Send + Sync {
    fn read_scan(&self, path: &Path) -> Result<RawScan, ReadError>;
}

impl<R: ScanReader + ?Sized> ScanReader for Box<R> {
    fn read_scan(&self, path: &Path) -> Result<RawScan, ReadError> {
        (**self).read_scan(path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extension {
    Pcd,
    Las,
    Laz,
    Csv,
    Txt,
    Bin,
}

impl Extension {
    pub fn from_path(path: &Path) -> Result<Self, ReadError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| ReadError::UnsupportedExtension(path.display().to_string()))?;
        get_extension(extension)
    }
}

pub fn get_extension(extension: &str) -> Result<Extension, ReadError> {
    match extension.to_ascii_lowercase().as_str() {
        "pcd" => Ok(Extension::Pcd),
        "las" => Ok(Extension::Las),
        "laz" => Ok(Extension::Laz),
        "csv" => Ok(Extension::Csv),
        "txt" => Ok(Extension::Txt),
        "bin" => Ok(Extension::Bin),
        _ => Err(ReadError::UnsupportedExtension(extension.to_string())),
    }
}

/// The default reader for each supported scan format.
pub fn get_reader(extension: Extension) -> Box<dyn ScanReader> {
    match extension {
        Extension::Pcd => Box::new(PcdScanReader::default()),
        Extension::Las | Extension::Laz => Box::new(LasScanReader),
        Extension::Csv | Extension::Txt => Box::new(CsvScanReader),
        Extension::Bin => Box::new(BinScanReader::nuscenes()),
    }
}
