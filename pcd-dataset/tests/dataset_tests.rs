use std::{fs, path::Path};

use pcd_core::pointcloud::point::RawScan;
use pcd_dataset::{
    index::SENSOR_STREAM_FOLDER, Dataset, DatasetConfig, DatasetError, DatasetRegistry,
    IndexStrategy, ScanDataset,
};
use pcd_parser::{get_reader, writer::pcd::write_imotion_pcd, Extension};

/// Writes a sweep of `points` points whose intensity encodes `tag`.
fn write_sweep(root: &Path, scene: &str, name: &str, points: usize, tag: f32) {
    let folder = root.join(scene).join(SENSOR_STREAM_FOLDER);
    fs::create_dir_all(&folder).unwrap();
    let rows: Vec<[f32; 4]> = (0..points)
        .map(|i| [i as f32, 2.0 * i as f32, -1.0, tag])
        .collect();
    let scan = RawScan::from_rows(&rows).unwrap();
    write_imotion_pcd(&scan, &folder.join(name)).unwrap();
}

fn build(config: DatasetConfig) -> Result<Box<dyn Dataset>, DatasetError> {
    DatasetRegistry::with_builtin().build(config, get_reader(Extension::Pcd))
}

#[test]
fn samples_follow_scene_order() {
    let dir = tempfile::tempdir().unwrap();
    write_sweep(dir.path(), "scene10", "20240419_161208300.pcd", 3, 255.0);
    write_sweep(dir.path(), "scene2", "20240419_150000000.pcd", 2, 51.0);
    write_sweep(dir.path(), "scene2", "20240419_140000000.pcd", 1, 0.0);

    let dataset = build(DatasetConfig::new(dir.path())).unwrap();
    assert_eq!(dataset.size(), 3);

    let names: Vec<String> = (0..3).map(|i| dataset.name(i).unwrap()).collect();
    assert_eq!(
        names,
        [
            "20240419_140000000",
            "20240419_150000000",
            "20240419_161208300"
        ]
    );

    let sample = dataset.get(1).unwrap();
    assert_eq!(sample.coord, vec![[0.0, 0.0, -1.0], [1.0, 2.0, -1.0]]);
    assert_eq!(sample.strength, vec![0.2, 0.2]);
    assert_eq!(sample.segment, vec![-1, -1]);

    let last = dataset.get(2).unwrap();
    assert_eq!(last.num_points(), 3);
    assert!(last.strength.iter().all(|&s| s == 1.0));
}

#[test]
fn loop_replays_the_same_files() {
    let dir = tempfile::tempdir().unwrap();
    write_sweep(dir.path(), "scene1", "a.pcd", 4, 10.0);
    write_sweep(dir.path(), "scene1", "b.pcd", 5, 20.0);

    let config = DatasetConfig {
        loop_count: 4,
        ..DatasetConfig::new(dir.path())
    };
    let boxed = build(config.clone()).unwrap();
    assert_eq!(boxed.epoch_size(), 8);

    let dataset = ScanDataset::new(config, get_reader(Extension::Pcd)).unwrap();
    assert_eq!(dataset.size(), 2);
    assert_eq!(dataset.epoch_size(), 8);

    for index in 0..dataset.epoch_size() {
        let sample = dataset.get(index).unwrap();
        let expected = if index % 2 == 0 { 4 } else { 5 };
        assert_eq!(sample.num_points(), expected);
        assert_eq!(dataset.path(index).unwrap(), dataset.path(index % 2).unwrap());
    }
}

#[test]
fn flat_strategy_accepts_any_directory_name() {
    let dir = tempfile::tempdir().unwrap();
    write_sweep(dir.path(), "drive_morning", "a.pcd", 1, 1.0);
    write_sweep(dir.path(), "drive_evening", "b.pcd", 1, 2.0);

    let numbered = build(DatasetConfig::new(dir.path())).unwrap();
    assert_eq!(numbered.size(), 0);
    assert!(matches!(numbered.get(0), Err(DatasetError::EmptyDataset)));

    let config = DatasetConfig {
        strategy: IndexStrategy::FlatDirectory,
        ..DatasetConfig::new(dir.path())
    };
    let flat = build(config).unwrap();
    assert_eq!(flat.size(), 2);
    assert_eq!(flat.name(0).unwrap(), "b");
    assert_eq!(flat.name(1).unwrap(), "a");
}

#[test]
fn config_file_drives_construction() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("sweeps");
    write_sweep(&root, "scene0", "a.pcd", 2, 0.0);

    let config_path = dir.path().join("dataset.json");
    fs::write(
        &config_path,
        format!(
            r#"{{ "type": "imotion", "data_root": {:?}, "ignore_index": 255, "sweeps": 1 }}"#,
            root.to_str().unwrap()
        ),
    )
    .unwrap();

    let config = DatasetConfig::from_path(&config_path).unwrap();
    let dataset = build(config).unwrap();
    assert_eq!(dataset.get(0).unwrap().segment, vec![255, 255]);
}

#[test]
fn bad_scene_name_fails_construction() {
    let dir = tempfile::tempdir().unwrap();
    write_sweep(dir.path(), "scene1", "a.pcd", 1, 0.0);
    write_sweep(dir.path(), "sceneX", "b.pcd", 1, 0.0);

    assert!(matches!(
        build(DatasetConfig::new(dir.path())),
        Err(DatasetError::InvalidSceneName { .. })
    ));
}
