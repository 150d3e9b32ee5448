//! Scan discovery.
//!
//! Expected layout:
//!
//! ```text
//! <data_root>/
//!   scene<N>/
//!     lidarTop/
//!       *.pcd
//! ```
//!
//! Both strategies sort at every level so that the same directory tree always
//! produces the same `index -> file` mapping.

pub mod flat;
pub mod numbered_scene;

use std::{
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::DatasetError;

pub use flat::FlatDirectoryStrategy;
pub use numbered_scene::NumberedSceneStrategy;

/// Per-scene folder holding the roof LiDAR sweeps.
pub const SENSOR_STREAM_FOLDER: &str = "lidarTop";
/// Extension of scan files inside the sensor folder.
pub const SCAN_EXTENSION: &str = "pcd";

/// The ordered list of scan files a dataset serves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanIndexList {
    paths: Vec<PathBuf>,
}

impl ScanIndexList {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
        self.paths.iter()
    }

    /// Maps any index onto the list by wrapping around its length.
    pub fn resolve(&self, index: usize) -> Result<&Path, DatasetError> {
        if self.paths.is_empty() {
            return Err(DatasetError::EmptyDataset);
        }
        Ok(&self.paths[index % self.paths.len()])
    }
}

impl<'a> IntoIterator for &'a ScanIndexList {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}

pub trait ScanIndex {
    fn discover(&self, root: &Path) -> Result<ScanIndexList, DatasetError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndexStrategy {
    /// Only `scene<N>` directories, ordered by `N`.
    #[default]
    NumberedScene,
    /// Every subdirectory of the root, ordered by name.
    FlatDirectory,
}

impl IndexStrategy {
    pub fn build(self) -> Box<dyn ScanIndex> {
        match self {
            IndexStrategy::NumberedScene => Box::new(NumberedSceneStrategy::default()),
            IndexStrategy::FlatDirectory => Box::new(FlatDirectoryStrategy::default()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IndexStrategy::NumberedScene => "numbered-scene",
            IndexStrategy::FlatDirectory => "flat-directory",
        }
    }
}

impl fmt::Display for IndexStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndexStrategy {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "numbered-scene" => Ok(IndexStrategy::NumberedScene),
            "flat-directory" | "flat" => Ok(IndexStrategy::FlatDirectory),
            _ => Err(DatasetError::Config(format!(
                "unknown index strategy '{s}' (expected numbered-scene or flat-directory)"
            ))),
        }
    }
}

pub(crate) fn check_root(root: &Path) -> Result<(), DatasetError> {
    if !root.is_dir() {
        return Err(DatasetError::RootNotFound(root.to_path_buf()));
    }
    Ok(())
}

/// Dot-prefixed entries (`.git`, `._a.pcd`) are never part of a dataset.
pub(crate) fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name.to_string_lossy().starts_with('.'))
}

/// Immediate non-hidden subdirectories of `dir`, in `read_dir` order.
pub(crate) fn subdirectories(dir: &Path) -> Result<Vec<PathBuf>, DatasetError> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir).map_err(|err| DatasetError::io(dir, err))? {
        let path = entry.map_err(|err| DatasetError::io(dir, err))?.path();
        if path.is_dir() && !is_hidden(&path) {
            dirs.push(path);
        }
    }
    Ok(dirs)
}

pub(crate) fn sensor_folder(scene: &Path, folder: &str) -> Result<PathBuf, DatasetError> {
    let path = scene.join(folder);
    if !path.is_dir() {
        return Err(DatasetError::MissingSensorFolder {
            scene: scene.to_path_buf(),
            folder: folder.to_string(),
        });
    }
    Ok(path)
}

/// Non-hidden regular files in `dir` with exactly `extension`, sorted by file name.
pub(crate) fn list_scans(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, DatasetError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|err| DatasetError::io(dir, err))? {
        let path = entry.map_err(|err| DatasetError::io(dir, err))?.path();
        if path.is_file()
            && !is_hidden(&path)
            && path.extension().is_some_and(|ext| ext == extension)
        {
            files.push(path);
        }
    }
    Ok(files
        .into_iter()
        .sorted_by(|a, b| a.file_name().cmp(&b.file_name()))
        .collect())
}
