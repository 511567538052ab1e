#![allow(clippy::needless_range_loop)]
//! Cholesky factorisation and log-determinants.
//!
//! The Normal-Inverse-Wishart evidence needs ln|Psi| for the prior and
//! posterior scale matrices, both symmetric positive definite by
//! construction. A failed factorisation is reported, never masked.

use crate::dense::DenseMatrix;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LinalgError {
    #[error("Matrix is not positive definite (pivot {pivot} = {value:.3e})")]
    NotPositiveDefinite { pivot: usize, value: f64 },

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// Result of a Cholesky decomposition.
pub struct CholeskyDecomp {
    /// Lower triangular factor L such that A = L * L'.
    pub l: DenseMatrix,
}

impl CholeskyDecomp {
    /// Compute the Cholesky decomposition of a symmetric positive definite matrix.
    pub fn new(a: &DenseMatrix) -> Result<Self, LinalgError> {
        let n = a.nrows();
        if !a.is_square() {
            return Err(LinalgError::DimensionMismatch {
                expected: n,
                got: a.ncols(),
            });
        }
        let mut l = DenseMatrix::zeros(n, n);

        for j in 0..n {
            let sum: f64 = (0..j).map(|k| l.get(j, k) * l.get(j, k)).sum();
            let pivot = a.get(j, j) - sum;
            if pivot <= 0.0 || !pivot.is_finite() {
                return Err(LinalgError::NotPositiveDefinite { pivot: j, value: pivot });
            }
            let ljj = pivot.sqrt();
            l.set(j, j, ljj);

            for i in (j + 1)..n {
                let sum: f64 = (0..j).map(|k| l.get(i, k) * l.get(j, k)).sum();
                l.set(i, j, (a.get(i, j) - sum) / ljj);
            }
        }

        Ok(CholeskyDecomp { l })
    }

    /// ln|A| = 2 * sum(ln L_ii).
    pub fn log_det(&self) -> f64 {
        2.0 * self.l.diag().iter().map(|d| d.ln()).sum::<f64>()
    }
}

/// Log-determinant of a symmetric positive definite matrix.
pub fn log_det_spd(a: &DenseMatrix) -> Result<f64, LinalgError> {
    Ok(CholeskyDecomp::new(a)?.log_det())
}
