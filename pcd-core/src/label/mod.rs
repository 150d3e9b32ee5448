pub mod learning_map;

pub use learning_map::{LabelError, LearningMap};
