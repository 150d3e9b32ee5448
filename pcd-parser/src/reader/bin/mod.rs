use std::{fs, path::Path};

use byteorder::{ByteOrder, LittleEndian};
use pcd_core::pointcloud::point::RawScan;

use super::{ReadError, ScanReader};

/// Values per point in a nuScenes `LIDAR_TOP` sweep: x, y, z, intensity, ring index.
pub const NUSCENES_COLUMNS: usize = 5;

/// Reads headerless little-endian float32 sweeps (`*.pcd.bin`).
#[derive(Debug, Clone, Copy)]
pub struct BinScanReader {
    pub columns: usize,
}

impl BinScanReader {
    pub fn nuscenes() -> Self {
        Self {
            columns: NUSCENES_COLUMNS,
        }
    }
}

impl ScanReader for BinScanReader {
    fn read_scan(&self, path: &Path) -> Result<RawScan, ReadError> {
        let bytes = fs::read(path).map_err(|err| ReadError::io(path, err))?;

        let point_size = self.columns * std::mem::size_of::<f32>();
        if point_size == 0 || bytes.len() % point_size != 0 {
            return Err(ReadError::Truncated {
                path: path.to_path_buf(),
                len: bytes.len(),
                columns: self.columns,
            });
        }

        let mut data = vec![0.0f32; bytes.len() / std::mem::size_of::<f32>()];
        LittleEndian::read_f32_into(&bytes, &mut data);

        RawScan::new(data, self.columns).map_err(|err| ReadError::shape(path, err))
    }
}
