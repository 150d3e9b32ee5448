use serde::{Deserialize, Serialize};

/// A training sample assembled from one scan.
///
/// `coord` holds the xyz of every point, `strength` the normalized trailing
/// attribute and `segment` one label per point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub coord: Vec<[f32; 3]>,
    pub strength: Vec<f32>,
    pub segment: Vec<i64>,
}

impl Sample {
    pub fn num_points(&self) -> usize {
        self.coord.len()
    }

    /// `(min, max)` of the strength column, `None` for an empty sample.
    pub fn strength_range(&self) -> Option<(f32, f32)> {
        self.strength.iter().fold(None, |range, &value| match range {
            None => Some((value, value)),
            Some((min, max)) => Some((min.min(value), max.max(value))),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strength_range() {
        let sample = Sample {
            coord: vec![[0.0; 3]; 3],
            strength: vec![0.5, 0.0, 1.0],
            segment: vec![-1; 3],
        };
        assert_eq!(sample.num_points(), 3);
        assert_eq!(sample.strength_range(), Some((0.0, 1.0)));

        let empty = Sample {
            coord: Vec::new(),
            strength: Vec::new(),
            segment: Vec::new(),
        };
        assert_eq!(empty.strength_range(), None);
    }

    #[test]
    fn serializes_with_field_names() {
        let sample = Sample {
            coord: vec![[1.0, 2.0, 3.0]],
            strength: vec![1.0],
            segment: vec![-1],
        };
        let json = serde_json::to_value(&sample).unwrap();
        assert_eq!(json["coord"][0][2], 3.0);
        assert_eq!(json["segment"][0], -1);
    }
}
