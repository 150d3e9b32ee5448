use std::path::Path;

use las::Reader;
use pcd_core::pointcloud::point::RawScan;

use super::{ReadError, ScanReader};

/// Reads LAS/LAZ files as `[x, y, z, intensity]` rows.
///
/// Coordinates are narrowed to `f32`, so georeferenced clouds should be
/// shifted to a local origin before they are fed to training.
#[derive(Debug, Clone, Copy, Default)]
pub struct LasScanReader;

impl ScanReader for LasScanReader {
    fn read_scan(&self, path: &Path) -> Result<RawScan, ReadError> {
        let start = std::time::Instant::now();
        let mut reader = Reader::from_path(path).map_err(|err| ReadError::codec(path, err))?;

        let mut data = Vec::new();
        for las_point in reader.points() {
            let las_point = las_point.map_err(|err| ReadError::codec(path, err))?;
            data.extend_from_slice(&[
                las_point.x as f32,
                las_point.y as f32,
                las_point.z as f32,
                las_point.intensity as f32,
            ]);
        }
        log::debug!("read LAS {:?} in {:?}", path, start.elapsed());

        RawScan::new(data, 4).map_err(|err| ReadError::shape(path, err))
    }
}
