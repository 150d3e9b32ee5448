use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LabelError {
    #[error("raw class id {raw} is outside the learning map (0..={max})")]
    Unmapped { raw: i64, max: usize },
}

// Raw annotation id -> coarse training id. `None` marks classes excluded from training.
const RAW_TO_COARSE: [Option<i64>; 32] = [
    None,     // 0
    None,     // 1
    Some(6),  // 2
    Some(6),  // 3
    Some(6),  // 4
    None,     // 5
    Some(6),  // 6
    None,     // 7
    None,     // 8
    Some(0),  // 9
    None,     // 10
    None,     // 11
    Some(7),  // 12
    None,     // 13
    Some(1),  // 14
    Some(2),  // 15
    Some(2),  // 16
    Some(3),  // 17
    Some(4),  // 18
    None,     // 19
    None,     // 20
    Some(5),  // 21
    Some(8),  // 22
    Some(9),  // 23
    Some(10), // 24
    Some(11), // 25
    Some(12), // 26
    Some(13), // 27
    Some(14), // 28
    None,     // 29
    Some(15), // 30
    None,     // 31
];

/// Remapping from the 32 raw annotation classes to the coarse segmentation
/// vocabulary, with excluded classes mapped to `ignore_index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LearningMap {
    ignore_index: i64,
}

impl LearningMap {
    pub const NUM_RAW_CLASSES: usize = RAW_TO_COARSE.len();

    pub fn new(ignore_index: i64) -> Self {
        Self { ignore_index }
    }

    pub fn ignore_index(&self) -> i64 {
        self.ignore_index
    }

    pub fn get(&self, raw: i64) -> Result<i64, LabelError> {
        usize::try_from(raw)
            .ok()
            .and_then(|index| RAW_TO_COARSE.get(index))
            .map(|coarse| coarse.unwrap_or(self.ignore_index))
            .ok_or(LabelError::Unmapped {
                raw,
                max: Self::NUM_RAW_CLASSES - 1,
            })
    }

    /// Remaps a whole label column. Fails on the first id outside the table.
    pub fn remap(&self, raw_labels: &[i64]) -> Result<Vec<i64>, LabelError> {
        raw_labels.iter().map(|&raw| self.get(raw)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        RAW_TO_COARSE
            .iter()
            .enumerate()
            .map(|(raw, coarse)| (raw as i64, coarse.unwrap_or(self.ignore_index)))
    }

    pub fn num_coarse_classes(&self) -> usize {
        RAW_TO_COARSE
            .iter()
            .flatten()
            .max()
            .map_or(0, |&max| max as usize + 1)
    }
}

impl Default for LearningMap {
    fn default() -> Self {
        Self::new(-1)
    }
}
