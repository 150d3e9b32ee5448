use std::path::Path;

use pcd_core::pointcloud::point::RawScan;
use pcd_rs::{DynReader, Field};

use super::{ReadError, ScanReader};

pub const DEFAULT_FIELDS: [&str; 4] = ["x", "y", "z", "intensity"];

/// Reads PCD files (ascii or binary) through `pcd-rs`, keeping the named
/// fields as columns in the given order.
#[derive(Debug, Clone)]
pub struct PcdScanReader {
    fields: Vec<String>,
}

impl PcdScanReader {
    pub fn with_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

impl Default for PcdScanReader {
    fn default() -> Self {
        Self::with_fields(DEFAULT_FIELDS)
    }
}

impl ScanReader for PcdScanReader {
    fn read_scan(&self, path: &Path) -> Result<RawScan, ReadError> {
        let reader = DynReader::open(path).map_err(|err| ReadError::codec(path, err))?;

        let field_defs = &reader.meta().field_defs;
        let indices = self
            .fields
            .iter()
            .map(|name| {
                let (index, field) = field_defs
                    .fields
                    .iter()
                    .enumerate()
                    .find(|(_, field)| field.name == *name)
                    .ok_or_else(|| ReadError::MissingField {
                        path: path.to_path_buf(),
                        field: name.clone(),
                    })?;
                if field.count != 1 {
                    return Err(ReadError::UnsupportedField {
                        path: path.to_path_buf(),
                        field: name.clone(),
                    });
                }
                Ok(index)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut data = Vec::new();
        for record in reader {
            let record = record.map_err(|err| ReadError::codec(path, err))?;
            for (&index, name) in indices.iter().zip(&self.fields) {
                let value = record
                    .0
                    .get(index)
                    .and_then(field_value)
                    .ok_or_else(|| ReadError::UnsupportedField {
                        path: path.to_path_buf(),
                        field: name.clone(),
                    })?;
                data.push(value as f32);
            }
        }

        let scan = RawScan::new(data, indices.len()).map_err(|err| ReadError::shape(path, err))?;
        log::debug!(
            "read {} points x {} columns from {:?}",
            scan.num_points(),
            scan.num_columns(),
            path
        );
        Ok(scan)
    }
}

pub(crate) fn field_value(field: &Field) -> Option<f64> {
    match field {
        Field::I8(values) => values.first().map(|&v| v as f64),
        Field::I16(values) => values.first().map(|&v| v as f64),
        Field::I32(values) => values.first().map(|&v| v as f64),
        Field::U8(values) => values.first().map(|&v| v as f64),
        Field::U16(values) => values.first().map(|&v| v as f64),
        Field::U32(values) => values.first().map(|&v| v as f64),
        Field::F32(values) => values.first().map(|&v| v as f64),
        Field::F64(values) => values.first().copied(),
    }
}
