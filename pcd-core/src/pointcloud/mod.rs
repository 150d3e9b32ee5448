pub mod point;
pub mod sample;
