use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{error::DatasetError, index::IndexStrategy, registry::IMOTION_DATASET};

/// Construction-time options of a scan dataset, usually loaded from JSON:
///
/// ```json
/// { "type": "imotion", "data_root": "data/imotion", "ignore_index": -1, "loop": 2 }
/// ```
///
/// Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatasetConfig {
    /// Registry key of the dataset implementation.
    #[serde(rename = "type")]
    pub dataset_type: String,
    pub data_root: PathBuf,
    /// Accumulated sweeps per sample. Carried for the training pipeline; the
    /// dataset itself reads one sweep per sample.
    pub sweeps: u32,
    pub ignore_index: i64,
    /// How many times the scan list is replayed per epoch.
    #[serde(rename = "loop")]
    pub loop_count: usize,
    /// Passed through to the surrounding pipeline.
    pub test_mode: bool,
    pub strategy: IndexStrategy,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            dataset_type: IMOTION_DATASET.to_string(),
            data_root: PathBuf::from("data/imotion"),
            sweeps: 10,
            ignore_index: -1,
            loop_count: 1,
            test_mode: false,
            strategy: IndexStrategy::default(),
        }
    }
}

impl DatasetConfig {
    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        Self {
            data_root: data_root.into(),
            ..Default::default()
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, DatasetError> {
        let text = fs::read_to_string(path).map_err(|source| DatasetError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| DatasetError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), DatasetError> {
        if self.dataset_type.trim().is_empty() {
            return Err(DatasetError::Config("dataset type is empty".to_string()));
        }
        if self.loop_count == 0 {
            return Err(DatasetError::Config("loop must be at least 1".to_string()));
        }
        Ok(())
    }
}
