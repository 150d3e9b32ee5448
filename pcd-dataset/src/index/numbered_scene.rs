use std::path::{Path, PathBuf};

use crate::error::DatasetError;

use super::{
    check_root, list_scans, sensor_folder, subdirectories, ScanIndex, ScanIndexList,
    SCAN_EXTENSION, SENSOR_STREAM_FOLDER,
};

pub const SCENE_PREFIX: &str = "scene";

/// Discovers scans in `scene<N>` directories, ordered by `N` rather than by
/// name, so `scene2` comes before `scene10`.
#[derive(Debug, Clone)]
pub struct NumberedSceneStrategy {
    pub sensor_folder: String,
    pub extension: String,
}

impl Default for NumberedSceneStrategy {
    fn default() -> Self {
        Self {
            sensor_folder: SENSOR_STREAM_FOLDER.to_string(),
            extension: SCAN_EXTENSION.to_string(),
        }
    }
}

/// `Ok(None)` for directories outside the convention, an error for names that
/// claim to be a scene but carry no valid number (`scene`, `sceneA`, `scene-1`).
pub fn parse_scene_number(path: &Path) -> Result<Option<u64>, DatasetError> {
    let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
        return Ok(None);
    };
    let Some(suffix) = name.strip_prefix(SCENE_PREFIX) else {
        return Ok(None);
    };
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DatasetError::InvalidSceneName {
            path: path.to_path_buf(),
        });
    }
    suffix
        .parse::<u64>()
        .map(Some)
        .map_err(|_| DatasetError::InvalidSceneName {
            path: path.to_path_buf(),
        })
}

impl NumberedSceneStrategy {
    /// Scene directories under `root`, sorted by scene number. Ties such as
    /// `scene2` / `scene02` fall back to the directory name.
    pub fn scenes(&self, root: &Path) -> Result<Vec<PathBuf>, DatasetError> {
        let mut scenes: Vec<(u64, PathBuf)> = Vec::new();
        for dir in subdirectories(root)? {
            match parse_scene_number(&dir)? {
                Some(number) => scenes.push((number, dir)),
                None => log::warn!("skipping {:?}: not a scene directory", dir),
            }
        }
        scenes.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.file_name().cmp(&b.1.file_name())));
        Ok(scenes.into_iter().map(|(_, dir)| dir).collect())
    }
}

impl ScanIndex for NumberedSceneStrategy {
    fn discover(&self, root: &Path) -> Result<ScanIndexList, DatasetError> {
        check_root(root)?;

        let mut paths = Vec::new();
        for scene in self.scenes(root)? {
            let folder = sensor_folder(&scene, &self.sensor_folder)?;
            let scans = list_scans(&folder, &self.extension)?;
            log::debug!("{:?}: {} scans", scene, scans.len());
            paths.extend(scans);
        }

        Ok(ScanIndexList::new(paths))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::index::test_util::touch_scans;

    fn relative(root: &Path, list: &ScanIndexList) -> Vec<String> {
        list.iter()
            .map(|p| p.strip_prefix(root).unwrap().to_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn scene_numbers() {
        assert_eq!(parse_scene_number(Path::new("root/scene0")).unwrap(), Some(0));
        assert_eq!(parse_scene_number(Path::new("root/scene42")).unwrap(), Some(42));
        assert_eq!(parse_scene_number(Path::new("root/scene007")).unwrap(), Some(7));
        assert_eq!(parse_scene_number(Path::new("root/calib")).unwrap(), None);
        assert_eq!(parse_scene_number(Path::new("root/Scene1")).unwrap(), None);
        for bad in ["scene", "sceneA", "scene-1", "scene1a", "scene99999999999999999999999"] {
            assert!(
                matches!(
                    parse_scene_number(&Path::new("root").join(bad)),
                    Err(DatasetError::InvalidSceneName { .. })
                ),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn scenes_are_ordered_numerically() {
        let dir = tempfile::tempdir().unwrap();
        touch_scans(
            dir.path(),
            &[
                ("scene10", "b.pcd"),
                ("scene10", "a.pcd"),
                ("scene2", "z.pcd"),
                ("scene1", "m.pcd"),
            ],
        );

        let list = NumberedSceneStrategy::default().discover(dir.path()).unwrap();
        assert_eq!(
            relative(dir.path(), &list),
            [
                "scene1/lidarTop/m.pcd",
                "scene2/lidarTop/z.pcd",
                "scene10/lidarTop/a.pcd",
                "scene10/lidarTop/b.pcd",
            ]
        );
    }

    #[test]
    fn discovery_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let scans: Vec<(String, String)> = (0..12)
            .flat_map(|scene| {
                (0..5).map(move |frame| {
                    (
                        format!("scene{}", (scene * 7) % 12),
                        format!("20240419_1612{:05}.pcd", frame * 13),
                    )
                })
            })
            .collect();
        let scans: Vec<(&str, &str)> = scans
            .iter()
            .map(|(scene, file)| (scene.as_str(), file.as_str()))
            .collect();
        touch_scans(dir.path(), &scans);

        let first = NumberedSceneStrategy::default().discover(dir.path()).unwrap();
        let second = NumberedSceneStrategy::default().discover(dir.path()).unwrap();
        assert_eq!(first.len(), 60);
        assert_eq!(first, second);
    }

    #[test]
    fn other_entries_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        touch_scans(dir.path(), &[("scene3", "a.pcd")]);
        fs::create_dir(dir.path().join("calibration")).unwrap();
        fs::write(dir.path().join("scene4"), b"a file, not a scene").unwrap();

        let list = NumberedSceneStrategy::default().discover(dir.path()).unwrap();
        assert_eq!(relative(dir.path(), &list), ["scene3/lidarTop/a.pcd"]);
    }

    #[test]
    fn invalid_scene_name_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        touch_scans(dir.path(), &[("scene1", "a.pcd"), ("scene_b", "b.pcd")]);

        let err = NumberedSceneStrategy::default()
            .discover(dir.path())
            .unwrap_err();
        assert!(matches!(err, DatasetError::InvalidSceneName { path } if path.ends_with("scene_b")));
    }

    #[test]
    fn missing_sensor_folder_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        touch_scans(dir.path(), &[("scene1", "a.pcd")]);
        fs::create_dir_all(dir.path().join("scene2").join("radarFront")).unwrap();

        let err = NumberedSceneStrategy::default()
            .discover(dir.path())
            .unwrap_err();
        assert!(matches!(
            err,
            DatasetError::MissingSensorFolder { scene, folder }
                if scene.ends_with("scene2") && folder == "lidarTop"
        ));
    }

    #[test]
    fn empty_root_gives_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let list = NumberedSceneStrategy::default().discover(dir.path()).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = NumberedSceneStrategy::default()
            .discover(&dir.path().join("nope"))
            .unwrap_err();
        assert!(matches!(err, DatasetError::RootNotFound(_)));
    }
}
