use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShapeError {
    #[error("a scan must have at least one column")]
    NoColumns,
    #[error("{len} values cannot be split into rows of {columns} columns")]
    Ragged { len: usize, columns: usize },
    #[error("row {row} has {found} columns, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// One sweep as read from disk: a row-major `N x C` array of per-point
/// attributes, coordinates first (`[x, y, z, ..., trailing attribute]`).
#[derive(Debug, Clone, PartialEq)]
pub struct RawScan {
    data: Vec<f32>,
    columns: usize,
}

impl RawScan {
    pub fn new(data: Vec<f32>, columns: usize) -> Result<Self, ShapeError> {
        if columns == 0 {
            return Err(ShapeError::NoColumns);
        }
        if data.len() % columns != 0 {
            return Err(ShapeError::Ragged {
                len: data.len(),
                columns,
            });
        }
        Ok(Self { data, columns })
    }

    pub fn from_rows<R: AsRef<[f32]>>(rows: &[R]) -> Result<Self, ShapeError> {
        let Some(first) = rows.first() else {
            return Err(ShapeError::NoColumns);
        };
        let columns = first.as_ref().len();
        let mut data = Vec::with_capacity(rows.len() * columns);
        for (row, values) in rows.iter().enumerate() {
            let values = values.as_ref();
            if values.len() != columns {
                return Err(ShapeError::RowWidth {
                    row,
                    expected: columns,
                    found: values.len(),
                });
            }
            data.extend_from_slice(values);
        }
        Self::new(data, columns)
    }

    pub fn num_points(&self) -> usize {
        self.data.len() / self.columns
    }

    pub fn num_columns(&self) -> usize {
        self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn row(&self, index: usize) -> Option<&[f32]> {
        let start = index.checked_mul(self.columns)?;
        let end = start.checked_add(self.columns)?;
        self.data.get(start..end)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> + '_ {
        self.data.chunks_exact(self.columns)
    }

    /// Values of column `index` for every point. Empty when the column does not exist.
    pub fn column(&self, index: usize) -> impl Iterator<Item = f32> + '_ {
        let columns = self.columns;
        self.data
            .iter()
            .skip(index)
            .step_by(columns)
            .take(if index < columns { usize::MAX } else { 0 })
            .copied()
    }

    pub fn last_column(&self) -> impl Iterator<Item = f32> + '_ {
        self.column(self.columns - 1)
    }

    /// The first three columns of each row. Empty when the scan has fewer than three columns.
    pub fn coords(&self) -> Vec<[f32; 3]> {
        if self.columns < 3 {
            return Vec::new();
        }
        self.rows().map(|row| [row[0], row[1], row[2]]).collect()
    }

    /// Keeps the leading `columns` columns of every row.
    pub fn truncate_columns(&self, columns: usize) -> Result<RawScan, ShapeError> {
        if columns == 0 {
            return Err(ShapeError::NoColumns);
        }
        if columns > self.columns {
            return Err(ShapeError::RowWidth {
                row: 0,
                expected: columns,
                found: self.columns,
            });
        }
        let data = self
            .rows()
            .flat_map(|row| row[..columns].iter().copied())
            .collect();
        RawScan::new(data, columns)
    }

    pub fn bounding_volume(&self) -> Option<BoundingVolume> {
        if self.columns < 3 {
            return None;
        }
        BoundingVolume::from_points(self.rows().map(|row| [row[0], row[1], row[2]]))
    }
}

// Axis-aligned extent of the xyz columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundingVolume {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl BoundingVolume {
    /// `None` when `points` is empty.
    pub fn from_points(points: impl IntoIterator<Item = [f32; 3]>) -> Option<Self> {
        let mut points = points.into_iter().peekable();
        points.peek()?;

        let mut bounding_volume = BoundingVolume {
            min: [f64::MAX, f64::MAX, f64::MAX],
            max: [f64::MIN, f64::MIN, f64::MIN],
        };
        for point in points {
            for axis in 0..3 {
                let value = point[axis] as f64;
                bounding_volume.min[axis] = bounding_volume.min[axis].min(value);
                bounding_volume.max[axis] = bounding_volume.max[axis].max(value);
            }
        }
        Some(bounding_volume)
    }

    pub fn size(&self) -> [f64; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan() -> RawScan {
        RawScan::from_rows(&[
            [1.0, 2.0, 3.0, 10.0],
            [-1.0, 5.0, 0.5, 255.0],
            [0.0, 0.0, 0.0, 0.0],
        ])
        .unwrap()
    }

    #[test]
    fn shape_is_checked() {
        assert_eq!(RawScan::new(vec![1.0; 6], 0), Err(ShapeError::NoColumns));
        assert_eq!(
            RawScan::new(vec![1.0; 7], 4),
            Err(ShapeError::Ragged { len: 7, columns: 4 })
        );
        let rows: Vec<Vec<f32>> = vec![vec![0.0; 4], vec![0.0; 3]];
        assert_eq!(
            RawScan::from_rows(&rows),
            Err(ShapeError::RowWidth {
                row: 1,
                expected: 4,
                found: 3
            })
        );
    }

    #[test]
    fn empty_scan_keeps_its_width() {
        let scan = RawScan::new(Vec::new(), 4).unwrap();
        assert_eq!(scan.num_points(), 0);
        assert_eq!(scan.num_columns(), 4);
        assert!(scan.bounding_volume().is_none());
    }

    #[test]
    fn columns_and_rows() {
        let scan = scan();
        assert_eq!(scan.num_points(), 3);
        assert_eq!(scan.num_columns(), 4);
        assert_eq!(scan.row(1), Some(&[-1.0, 5.0, 0.5, 255.0][..]));
        assert_eq!(scan.row(3), None);
        assert_eq!(scan.row(usize::MAX / 4), None);
        assert_eq!(scan.column(1).collect::<Vec<_>>(), vec![2.0, 5.0, 0.0]);
        assert_eq!(scan.last_column().collect::<Vec<_>>(), vec![10.0, 255.0, 0.0]);
        assert_eq!(scan.column(4).count(), 0);
        assert_eq!(scan.coords()[1], [-1.0, 5.0, 0.5]);
    }

    #[test]
    fn truncate_keeps_leading_columns() {
        let truncated = scan().truncate_columns(3).unwrap();
        assert_eq!(truncated.num_columns(), 3);
        assert_eq!(truncated.row(0), Some(&[1.0, 2.0, 3.0][..]));
        assert!(scan().truncate_columns(5).is_err());
    }

    #[test]
    fn bounding_volume_covers_all_points() {
        let bv = scan().bounding_volume().unwrap();
        assert_eq!(bv.min, [-1.0, 0.0, 0.0]);
        assert_eq!(bv.max, [1.0, 5.0, 3.0]);
        assert_eq!(bv.size(), [2.0, 5.0, 3.0]);
    }
}
