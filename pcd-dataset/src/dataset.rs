use std::path::Path;

use pcd_core::{
    label::LearningMap,
    pointcloud::{point::RawScan, sample::Sample},
};
use pcd_parser::ScanReader;

use crate::{
    config::DatasetConfig,
    error::DatasetError,
    index::ScanIndexList,
};

/// Trailing attributes are 8-bit sensor values; dividing by this maps them to `[0, 1]`.
pub const STRENGTH_SCALE: f32 = 255.0;

/// Columns a scan needs to become a sample: x, y, z and one trailing attribute.
pub const MIN_SCAN_COLUMNS: usize = 4;

/// Indexed access to samples, as consumed by a training or inference loop.
pub trait Dataset: Send + Sync {
    /// Number of distinct scans.
    fn size(&self) -> usize;

    /// Loads the sample at `index`, wrapping around `size()`.
    fn get(&self, index: usize) -> Result<Sample, DatasetError>;

    /// File stem of the scan at `index`, wrapping like [`Dataset::get`].
    fn name(&self, index: usize) -> Result<String, DatasetError>;

    /// Samples per epoch once any loop multiplier is applied.
    fn epoch_size(&self) -> usize {
        self.size()
    }
}

/// Serves one LiDAR sweep per sample from a scene directory tree.
///
/// The scan list is discovered once at construction; every `get` reads the
/// file again through the reader and keeps nothing afterwards. Samples carry
/// no ground truth, so every point is labelled with the ignore index.
pub struct ScanDataset {
    config: DatasetConfig,
    index: ScanIndexList,
    learning_map: LearningMap,
    reader: Box<dyn ScanReader>,
}

impl ScanDataset {
    pub fn new(config: DatasetConfig, reader: Box<dyn ScanReader>) -> Result<Self, DatasetError> {
        let start = std::time::Instant::now();
        let index = config.strategy.build().discover(&config.data_root)?;
        log::info!(
            "indexed {} scans under {:?} ({}) in {:?}",
            index.len(),
            config.data_root,
            config.strategy,
            start.elapsed()
        );

        Self::with_index(config, index, reader)
    }

    /// Builds a dataset over an already discovered scan list.
    pub fn with_index(
        config: DatasetConfig,
        index: ScanIndexList,
        reader: Box<dyn ScanReader>,
    ) -> Result<Self, DatasetError> {
        config.validate()?;
        let learning_map = LearningMap::new(config.ignore_index);
        Ok(Self {
            config,
            index,
            learning_map,
            reader,
        })
    }

    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    pub fn index(&self) -> &ScanIndexList {
        &self.index
    }

    /// Raw-to-coarse remapping for callers that hold per-point raw class ids.
    pub fn learning_map(&self) -> &LearningMap {
        &self.learning_map
    }

    pub fn ignore_index(&self) -> i64 {
        self.config.ignore_index
    }

    pub fn sweeps(&self) -> u32 {
        self.config.sweeps
    }

    pub fn test_mode(&self) -> bool {
        self.config.test_mode
    }

    pub fn path(&self, index: usize) -> Result<&Path, DatasetError> {
        self.index.resolve(index)
    }
}

impl Dataset for ScanDataset {
    fn size(&self) -> usize {
        self.index.len()
    }

    fn epoch_size(&self) -> usize {
        self.index.len() * self.config.loop_count
    }

    fn get(&self, index: usize) -> Result<Sample, DatasetError> {
        let path = self.index.resolve(index)?;
        let scan = self.reader.read_scan(path)?;
        build_sample(path, &scan, self.config.ignore_index)
    }

    fn name(&self, index: usize) -> Result<String, DatasetError> {
        let path = self.index.resolve(index)?;
        Ok(path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default())
    }
}

/// Splits a raw scan into coordinates and normalized strength, labelling
/// every point with `ignore_index`.
pub fn build_sample(
    path: &Path,
    scan: &RawScan,
    ignore_index: i64,
) -> Result<Sample, DatasetError> {
    if scan.num_columns() < MIN_SCAN_COLUMNS {
        return Err(DatasetError::MalformedScan {
            path: path.to_path_buf(),
            columns: scan.num_columns(),
        });
    }

    let coord = scan.coords();
    let strength = scan.last_column().map(|value| value / STRENGTH_SCALE).collect();
    let segment = vec![ignore_index; scan.num_points()];

    Ok(Sample {
        coord,
        strength,
        segment,
    })
}
