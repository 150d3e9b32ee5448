pub mod config;
pub mod dataset;
pub mod error;
pub mod index;
pub mod registry;

pub use config::DatasetConfig;
pub use dataset::{Dataset, ScanDataset};
pub use error::DatasetError;
pub use index::{IndexStrategy, ScanIndex, ScanIndexList};
pub use registry::DatasetRegistry;
