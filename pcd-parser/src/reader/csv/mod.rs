use std::{collections::HashMap, path::Path};

use csv::ReaderBuilder;
use pcd_core::pointcloud::point::RawScan;

use super::{ReadError, ScanReader};

const REQUIRED_FIELDS: [&str; 3] = ["x", "y", "z"];
const INTENSITY_FIELD: &str = "intensity";

/// Reads delimited text scans with a header row. `x`, `y` and `z` are
/// required; an `intensity` column, when present, becomes the trailing column.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvScanReader;

fn normalize(name: &str) -> String {
    name.to_lowercase().replace(['_', '-'], "")
}

fn create_field_mapping(
    path: &Path,
    headers: &csv::StringRecord,
) -> Result<HashMap<&'static str, usize>, ReadError> {
    let mut mapping = HashMap::new();

    for (index, header) in headers.iter().enumerate() {
        let normalized_header = normalize(header.trim());
        for attr_name in REQUIRED_FIELDS.iter().chain([&INTENSITY_FIELD]) {
            if normalized_header == normalize(attr_name) {
                mapping.entry(*attr_name).or_insert(index);
                break;
            }
        }
    }

    for attr_name in REQUIRED_FIELDS {
        if !mapping.contains_key(attr_name) {
            return Err(ReadError::MissingField {
                path: path.to_path_buf(),
                field: attr_name.to_string(),
            });
        }
    }

    Ok(mapping)
}

fn parse_field(
    path: &Path,
    record: &csv::StringRecord,
    index: usize,
    field_name: &str,
) -> Result<f32, ReadError> {
    let value = record.get(index).map(str::trim).unwrap_or_default();
    value.parse::<f32>().map_err(|e| {
        ReadError::codec(
            path,
            format!(
                "line {}: failed to parse '{}' ({:?}): {}",
                record.position().map_or(0, |p| p.line()),
                field_name,
                value,
                e
            ),
        )
    })
}

impl ScanReader for CsvScanReader {
    fn read_scan(&self, path: &Path) -> Result<RawScan, ReadError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|err| ReadError::codec(path, err))?;

        let headers = reader
            .headers()
            .map_err(|err| ReadError::codec(path, err))?
            .clone();
        let field_mapping = create_field_mapping(path, &headers)?;

        let mut columns: Vec<(&str, usize)> = REQUIRED_FIELDS
            .iter()
            .map(|name| (*name, field_mapping[name]))
            .collect();
        if let Some(&index) = field_mapping.get(INTENSITY_FIELD) {
            columns.push((INTENSITY_FIELD, index));
        }

        let mut data = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|err| ReadError::codec(path, err))?;
            for &(name, index) in &columns {
                data.push(parse_field(path, &record, index, name)?);
            }
        }

        RawScan::new(data, columns.len()).map_err(|err| ReadError::shape(path, err))
    }
}
