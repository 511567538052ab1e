//! bclust-io: Input and output for bclust-rs
//!
//! Reads the whitespace-delimited variant/trait matrix and writes the
//! final partition, per-cluster listing and JSON run summary.

pub mod matrix;
pub mod output;

pub use matrix::{load_dataset, read_matrix, write_matrix, MatrixLayout};
pub use output::{read_partition, write_partition, write_results};
