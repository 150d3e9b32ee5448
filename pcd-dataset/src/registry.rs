use std::collections::BTreeMap;

use pcd_parser::ScanReader;

use crate::{
    config::DatasetConfig,
    dataset::{Dataset, ScanDataset},
    error::DatasetError,
};

/// Registry key of [`ScanDataset`].
pub const IMOTION_DATASET: &str = "imotion";

pub type DatasetConstructor =
    fn(DatasetConfig, Box<dyn ScanReader>) -> Result<Box<dyn Dataset>, DatasetError>;

fn build_scan_dataset(
    config: DatasetConfig,
    reader: Box<dyn ScanReader>,
) -> Result<Box<dyn Dataset>, DatasetError> {
    Ok(Box::new(ScanDataset::new(config, reader)?))
}

/// Name-to-constructor table resolved when a config is loaded.
#[derive(Debug, Clone, Default)]
pub struct DatasetRegistry {
    constructors: BTreeMap<String, DatasetConstructor>,
}

impl DatasetRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the datasets shipped with this crate.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(IMOTION_DATASET, build_scan_dataset);
        registry
    }

    /// Adds or replaces a constructor, returning the replaced one.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        constructor: DatasetConstructor,
    ) -> Option<DatasetConstructor> {
        self.constructors.insert(name.into(), constructor)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    pub fn build(
        &self,
        config: DatasetConfig,
        reader: Box<dyn ScanReader>,
    ) -> Result<Box<dyn Dataset>, DatasetError> {
        let constructor = self
            .constructors
            .get(&config.dataset_type)
            .ok_or_else(|| DatasetError::UnknownDataset {
                name: config.dataset_type.clone(),
                registered: self.names().collect::<Vec<_>>().join(", "),
            })?;
        log::debug!("building dataset '{}'", config.dataset_type);
        constructor(config, reader)
    }
}

#[cfg(test)]
mod tests {
    use pcd_core::pointcloud::sample::Sample;
    use pcd_parser::get_reader;

    use super::*;

    struct Constant;

    impl Dataset for Constant {
        fn size(&self) -> usize {
            1
        }

        fn get(&self, _index: usize) -> Result<Sample, DatasetError> {
            Ok(Sample {
                coord: vec![[0.0; 3]],
                strength: vec![0.0],
                segment: vec![-1],
            })
        }

        fn name(&self, _index: usize) -> Result<String, DatasetError> {
            Ok("constant".to_string())
        }
    }

    fn build_constant(
        _config: DatasetConfig,
        _reader: Box<dyn ScanReader>,
    ) -> Result<Box<dyn Dataset>, DatasetError> {
        Ok(Box::new(Constant))
    }

    fn pcd_reader() -> Box<dyn ScanReader> {
        get_reader(pcd_parser::Extension::Pcd)
    }

    #[test]
    fn builtin_registers_scan_dataset() {
        let registry = DatasetRegistry::with_builtin();
        assert_eq!(registry.names().collect::<Vec<_>>(), [IMOTION_DATASET]);

        let dir = tempfile::tempdir().unwrap();
        let dataset = registry
            .build(DatasetConfig::new(dir.path()), pcd_reader())
            .unwrap();
        assert_eq!(dataset.size(), 0);
    }

    #[test]
    fn unknown_type_lists_registered_names() {
        let mut registry = DatasetRegistry::with_builtin();
        registry.register("constant", build_constant);

        let config = DatasetConfig {
            dataset_type: "semantic_kitti".to_string(),
            ..Default::default()
        };
        let err = registry.build(config, pcd_reader()).err().unwrap();
        assert!(matches!(
            err,
            DatasetError::UnknownDataset { name, registered }
                if name == "semantic_kitti" && registered == "constant, imotion"
        ));
    }

    #[test]
    fn custom_constructor_is_used() {
        let mut registry = DatasetRegistry::new();
        assert!(registry.register("constant", build_constant).is_none());
        assert!(registry.register("constant", build_constant).is_some());

        let config = DatasetConfig {
            dataset_type: "constant".to_string(),
            ..Default::default()
        };
        let dataset = registry.build(config, pcd_reader()).unwrap();
        assert_eq!(dataset.name(0).unwrap(), "constant");
        assert_eq!(dataset.epoch_size(), 1);
    }
}
