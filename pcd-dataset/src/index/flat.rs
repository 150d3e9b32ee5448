use std::path::Path;

use crate::error::DatasetError;

use super::{
    check_root, list_scans, sensor_folder, subdirectories, ScanIndex, ScanIndexList,
    SCAN_EXTENSION, SENSOR_STREAM_FOLDER,
};

/// Treats every immediate subdirectory of the root as a recording, whatever
/// its name, ordered by directory name.
#[derive(Debug, Clone)]
pub struct FlatDirectoryStrategy {
    pub sensor_folder: String,
    pub extension: String,
}

impl Default for FlatDirectoryStrategy {
    fn default() -> Self {
        Self {
            sensor_folder: SENSOR_STREAM_FOLDER.to_string(),
            extension: SCAN_EXTENSION.to_string(),
        }
    }
}

impl ScanIndex for FlatDirectoryStrategy {
    fn discover(&self, root: &Path) -> Result<ScanIndexList, DatasetError> {
        check_root(root)?;

        let mut dirs = subdirectories(root)?;
        dirs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        let mut paths = Vec::new();
        for dir in dirs {
            let folder = sensor_folder(&dir, &self.sensor_folder)?;
            let scans = list_scans(&folder, &self.extension)?;
            log::debug!("{:?}: {} scans", dir, scans.len());
            paths.extend(scans);
        }

        Ok(ScanIndexList::new(paths))
    }
}
