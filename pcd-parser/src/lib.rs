pub mod reader;
pub mod writer;

pub use reader::{get_extension, get_reader, Extension, ReadError, ScanReader};
pub use writer::{LabelChannel, ScanWriter, WriteError};
