pub mod label;
pub mod pointcloud;
