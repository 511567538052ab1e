//! bclust-linalg: Linear algebra wrappers for bclust-rs
//!
//! Provides the small dense matrix type and the Cholesky-based
//! log-determinant used by the Normal-Inverse-Wishart marginal
//! likelihood.

pub mod dense;
pub mod decomposition;

pub use decomposition::{log_det_spd, CholeskyDecomp, LinalgError};
pub use dense::DenseMatrix;
