use std::path::Path;

use pcd_core::pointcloud::point::RawScan;
use pcd_rs::{DataKind, DynRecord, Field, Schema, ValueKind, WriterInit};

use super::{LabelChannel, ScanWriter, WriteError};

pub const SEG_LABEL_FIELD: &str = "segLabel";

const GEOMETRY_FIELDS: [&str; 4] = ["x", "y", "z", "intensity"];

fn check_columns(scan: &RawScan) -> Result<(), WriteError> {
    if scan.num_columns() < GEOMETRY_FIELDS.len() {
        return Err(WriteError::TooFewColumns {
            columns: scan.num_columns(),
            required: GEOMETRY_FIELDS.len(),
        });
    }
    Ok(())
}

fn geometry_fields(row: &[f32]) -> Vec<Field> {
    row[..GEOMETRY_FIELDS.len()]
        .iter()
        .map(|&value| Field::F32(vec![value]))
        .collect()
}

/// Writes `x y z intensity` plus one unsigned 16-bit field per label channel.
/// Intensity is taken from the fourth column of the scan.
#[derive(Debug, Clone, Copy)]
pub struct PcdLabelWriter {
    pub data_kind: DataKind,
}

impl Default for PcdLabelWriter {
    fn default() -> Self {
        Self {
            data_kind: DataKind::Binary,
        }
    }
}

impl PcdLabelWriter {
    fn label_columns(
        scan: &RawScan,
        labels: &[LabelChannel<'_>],
    ) -> Result<Vec<Vec<u16>>, WriteError> {
        let mut names: Vec<&str> = GEOMETRY_FIELDS.to_vec();
        labels
            .iter()
            .map(|channel| {
                if names.contains(&channel.name) {
                    return Err(WriteError::DuplicateField(channel.name.to_string()));
                }
                names.push(channel.name);

                if channel.values.len() != scan.num_points() {
                    return Err(WriteError::LabelCount {
                        channel: channel.name.to_string(),
                        expected: scan.num_points(),
                        found: channel.values.len(),
                    });
                }
                channel
                    .values
                    .iter()
                    .enumerate()
                    .map(|(point, &value)| {
                        u16::try_from(value).map_err(|_| WriteError::LabelRange {
                            channel: channel.name.to_string(),
                            point,
                            value,
                        })
                    })
                    .collect::<Result<Vec<u16>, _>>()
            })
            .collect()
    }
}

impl ScanWriter for PcdLabelWriter {
    fn write_scan(
        &self,
        scan: &RawScan,
        labels: &[LabelChannel<'_>],
        path: &Path,
    ) -> Result<(), WriteError> {
        check_columns(scan)?;
        let label_columns = Self::label_columns(scan, labels)?;

        let schema = GEOMETRY_FIELDS
            .iter()
            .map(|&name| (name, ValueKind::F32, 1))
            .chain(labels.iter().map(|channel| (channel.name, ValueKind::U16, 1)));

        let mut writer = WriterInit {
            width: scan.num_points() as u64,
            height: 1,
            viewpoint: Default::default(),
            data_kind: self.data_kind,
            schema: Some(Schema::from_iter(schema)),
        }
        .create(path)
        .map_err(|err| WriteError::codec(path, err))?;

        for (index, row) in scan.rows().enumerate() {
            let mut fields = geometry_fields(row);
            fields.extend(
                label_columns
                    .iter()
                    .map(|column| Field::U16(vec![column[index]])),
            );
            writer
                .push(&DynRecord(fields))
                .map_err(|err| WriteError::codec(path, err))?;
        }
        writer.finish().map_err(|err| WriteError::codec(path, err))?;

        log::debug!(
            "wrote {} points with {} label channel(s) to {:?}",
            scan.num_points(),
            labels.len(),
            path
        );
        Ok(())
    }
}

/// Writes a scan in the sensor's native point layout. Fields the source
/// does not carry (laser id, time offset, yaw, mirror id) are zero.
pub fn write_imotion_pcd(scan: &RawScan, path: &Path) -> Result<(), WriteError> {
    check_columns(scan)?;

    let schema = GEOMETRY_FIELDS
        .iter()
        .map(|&name| (name, ValueKind::F32, 1))
        .chain([
            ("laserid", ValueKind::U16, 1),
            ("timeoffset", ValueKind::F64, 1),
            ("yawangle", ValueKind::F32, 1),
            ("mirrorid", ValueKind::U8, 1),
        ]);

    let mut writer = WriterInit {
        width: scan.num_points() as u64,
        height: 1,
        viewpoint: Default::default(),
        data_kind: DataKind::Binary,
        schema: Some(Schema::from_iter(schema)),
    }
    .create(path)
    .map_err(|err| WriteError::codec(path, err))?;

    for row in scan.rows() {
        let mut fields = geometry_fields(row);
        fields.extend([
            Field::U16(vec![0]),
            Field::F64(vec![0.0]),
            Field::F32(vec![0.0]),
            Field::U8(vec![0]),
        ]);
        writer
            .push(&DynRecord(fields))
            .map_err(|err| WriteError::codec(path, err))?;
    }
    writer.finish().map_err(|err| WriteError::codec(path, err))?;

    Ok(())
}
