// Data processing pipeline: transformation stages and storage adapters

pub mod processing;
pub mod storage;

// Re-export key types and functions from each stage
pub use processing::normalize;
