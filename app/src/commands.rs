use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use glob::glob;
use itertools::Itertools as _;
use rayon::prelude::*;
use serde::Serialize;

use pcd_core::{
    label::LearningMap,
    pointcloud::{point::BoundingVolume, sample::Sample},
};
use pcd_dataset::{
    dataset::MIN_SCAN_COLUMNS, index::SCAN_EXTENSION, Dataset, DatasetConfig, DatasetRegistry,
};
use pcd_parser::{
    get_extension, get_reader,
    reader::bin::BinScanReader,
    writer::pcd::{write_imotion_pcd, PcdLabelWriter, SEG_LABEL_FIELD},
    Extension, LabelChannel, ScanReader as _, ScanWriter as _,
};

use crate::{
    error::{io, AppError},
    labels::read_labels,
};

pub fn expand_globs(input_patterns: &[String]) -> Result<Vec<PathBuf>, AppError> {
    let mut paths = Vec::new();
    for pattern in input_patterns {
        if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
            let entries = glob(pattern).map_err(|source| AppError::Pattern {
                pattern: pattern.clone(),
                source,
            })?;
            for entry in entries {
                match entry {
                    Ok(path) => paths.push(path),
                    Err(e) => log::warn!("skipping unreadable match: {}", e),
                }
            }
        } else {
            paths.push(PathBuf::from(pattern));
        }
    }
    if paths.is_empty() {
        return Err(AppError::NoInputs);
    }
    Ok(paths)
}

fn create_parent(path: &Path) -> Result<(), AppError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(io(parent))
        }
        _ => Ok(()),
    }
}

pub fn build_dataset(config: DatasetConfig) -> Result<Box<dyn Dataset>, AppError> {
    let reader = get_reader(get_extension(SCAN_EXTENSION)?);
    Ok(DatasetRegistry::with_builtin().build(config, reader)?)
}

/// Discovers the scan list and writes one path per line to `output`, or to stdout.
pub fn index(config: &DatasetConfig, output: Option<&Path>) -> Result<usize, AppError> {
    config.validate()?;
    let list = config.strategy.build().discover(&config.data_root)?;
    log::info!("{} scans under {:?}", list.len(), config.data_root);

    let lines = list.iter().map(|path| path.display()).join("\n");
    match output {
        Some(path) => {
            create_parent(path)?;
            fs::write(path, format!("{lines}\n")).map_err(io(path))?;
            log::info!("scan list written to {:?}", path);
        }
        None if !list.is_empty() => println!("{lines}"),
        None => {}
    }
    Ok(list.len())
}

#[derive(Debug, Serialize)]
struct SampleRecord<'a> {
    name: &'a str,
    #[serde(flatten)]
    sample: &'a Sample,
}

pub fn inspect(
    dataset: &dyn Dataset,
    index: usize,
    output: Option<&Path>,
) -> Result<Sample, AppError> {
    let name = dataset.name(index)?;
    let sample = dataset.get(index)?;

    log::info!("sample {} ({}): {} points", index, name, sample.num_points());
    if let Some(bv) = BoundingVolume::from_points(sample.coord.iter().copied()) {
        log::info!("bounding volume: min {:?} max {:?}", bv.min, bv.max);
    }
    if let Some((min, max)) = sample.strength_range() {
        log::info!("strength range: [{}, {}]", min, max);
    }

    if let Some(path) = output {
        create_parent(path)?;
        let record = SampleRecord {
            name: &name,
            sample: &sample,
        };
        fs::write(path, serde_json::to_string(&record)?).map_err(io(path))?;
        log::info!("sample written to {:?}", path);
    }
    Ok(sample)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointCountSummary {
    pub scans: usize,
    pub total_points: usize,
    pub min_points: usize,
    pub max_points: usize,
}

impl PointCountSummary {
    pub fn from_counts(counts: &[usize]) -> Option<Self> {
        let (min_points, max_points) = counts.iter().copied().minmax().into_option()?;
        Some(Self {
            scans: counts.len(),
            total_points: counts.iter().sum(),
            min_points,
            max_points,
        })
    }
}

/// Loads every sample in parallel. The first failing sample aborts the run.
pub fn summary(dataset: &dyn Dataset) -> Result<Option<PointCountSummary>, AppError> {
    let counts = (0..dataset.size())
        .into_par_iter()
        .map(|index| dataset.get(index).map(|sample| sample.num_points()))
        .collect::<Result<Vec<_>, _>>()?;

    let summary = PointCountSummary::from_counts(&counts);
    match &summary {
        Some(s) => log::info!(
            "{} scans, {} points (min {}, max {}, mean {:.1})",
            s.scans,
            s.total_points,
            s.min_points,
            s.max_points,
            s.total_points as f64 / s.scans as f64
        ),
        None => log::warn!("dataset is empty"),
    }
    log::info!("{} samples per epoch", dataset.epoch_size());
    Ok(summary)
}

/// Writes `scan` with predicted labels attached as the `segLabel` field.
pub fn export(
    scan: &Path,
    labels: &Path,
    output: &Path,
    remap: Option<&LearningMap>,
) -> Result<(), AppError> {
    let reader = get_reader(Extension::from_path(scan)?);
    let raw = reader.read_scan(scan)?;

    let mut predicted = read_labels(labels)?;
    if let Some(learning_map) = remap {
        predicted = learning_map.remap(&predicted)?;
    }

    create_parent(output)?;
    PcdLabelWriter::default().write_scan(
        &raw,
        &[LabelChannel::new(SEG_LABEL_FIELD, &predicted)],
        output,
    )?;
    log::info!(
        "{} labeled points written to {:?}",
        raw.num_points(),
        output
    );
    Ok(())
}

/// `foo.pcd.bin` and `foo.bin` both become `foo.pcd`.
fn converted_name(input: &Path) -> String {
    let name = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = match name.len().checked_sub(".bin".len()) {
        Some(cut) if name.is_char_boundary(cut) && name[cut..].eq_ignore_ascii_case(".bin") => {
            &name[..cut]
        }
        _ => name.as_str(),
    };
    let suffix = format!(".{SCAN_EXTENSION}");
    if stem.ends_with(&suffix) {
        stem.to_string()
    } else {
        format!("{stem}{suffix}")
    }
}

/// Converts float32 sweeps to sensor-native PCD files.
///
/// A single input with a `.pcd` output is written to that file; otherwise
/// `output` is a directory and each input keeps its name.
pub fn convert(inputs: &[PathBuf], output: &Path, columns: usize) -> Result<Vec<PathBuf>, AppError> {
    if inputs.is_empty() {
        return Err(AppError::NoInputs);
    }

    let single_file = inputs.len() == 1
        && output
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(SCAN_EXTENSION));
    let targets: Vec<(PathBuf, PathBuf)> = inputs
        .iter()
        .map(|input| {
            let target = if single_file {
                output.to_path_buf()
            } else {
                output.join(converted_name(input))
            };
            (input.clone(), target)
        })
        .collect();

    if single_file {
        create_parent(output)?;
    } else {
        fs::create_dir_all(output).map_err(io(output))?;
    }

    let reader = BinScanReader { columns };
    targets
        .par_iter()
        .map(|(input, target)| -> Result<(), AppError> {
            let scan = reader.read_scan(input)?;
            let scan = scan
                .truncate_columns(MIN_SCAN_COLUMNS)
                .map_err(|source| AppError::Shape {
                    path: input.clone(),
                    source,
                })?;
            write_imotion_pcd(&scan, target)?;
            log::debug!("{:?} -> {:?} ({} points)", input, target, scan.num_points());
            Ok(())
        })
        .collect::<Result<Vec<()>, _>>()?;

    log::info!("converted {} sweeps into {:?}", targets.len(), output);
    Ok(targets.into_iter().map(|(_, target)| target).collect())
}

pub fn learning_map_json(ignore_index: i64) -> Result<String, AppError> {
    let table: BTreeMap<i64, i64> = LearningMap::new(ignore_index).iter().collect();
    Ok(serde_json::to_string_pretty(&table)?)
}
