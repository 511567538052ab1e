//! Variant/trait data and the conjugate-prior hyperparameters derived from it.
//!
//! Variables are stored row-wise: each discrete row holds one variant's
//! genotype codes across all observations, each continuous row one trait's
//! measurements. The dataset is immutable after construction and is shared
//! read-only by every likelihood evaluation.

use serde::Serialize;
use tracing::debug;

use crate::error::{ClusterError, Result};
use crate::util::math::mean;

/// Fixed prior hyperparameters for one run.
#[derive(Debug, Clone, Serialize)]
pub struct Hyperparameters {
    /// Prior pseudo-observations on the mean.
    pub kappa0: f64,
    /// Prior degrees of freedom (number of traits + 1).
    pub nu0: f64,
    /// Prior mean: largest per-trait empirical mean + 2.
    pub mu0: f64,
    /// Prior scale.
    pub sigma0: f64,
    /// Minor allele frequency the genotype odds were derived from.
    pub maf: f64,
    /// Hardy-Weinberg genotype frequencies indexed by genotype code.
    pub genotype_odds: [f64; 3],
}

impl Hyperparameters {
    /// Offset added to the largest trait mean to place mu0.
    pub const MU0_OFFSET: f64 = 2.0;

    /// Derive hyperparameters from the trait rows and the MAF.
    pub fn derive(continuous: &[Vec<f64>], maf: f64) -> Result<Self> {
        if !(maf > 0.0 && maf < 1.0) {
            return Err(ClusterError::Config(format!(
                "minor allele frequency must lie in (0, 1), got {}",
                maf
            )));
        }

        // An empty trait set has no means; the prior sits at the offset.
        let max_mean = continuous
            .iter()
            .map(|row| mean(row))
            .fold(None, |acc: Option<f64>, m| Some(acc.map_or(m, |a| a.max(m))))
            .unwrap_or(0.0);

        Ok(Self {
            kappa0: 1.0,
            nu0: continuous.len() as f64 + 1.0,
            mu0: max_mean + Self::MU0_OFFSET,
            sigma0: 1.0,
            maf,
            genotype_odds: genotype_odds(maf),
        })
    }
}

/// Hardy-Weinberg genotype frequencies [(1-p)^2, 2p(1-p), p^2].
pub fn genotype_odds(maf: f64) -> [f64; 3] {
    let q = 1.0 - maf;
    [q * q, 2.0 * maf * q, maf * maf]
}

/// Discrete variant rows, continuous trait rows and their hyperparameters.
#[derive(Debug, Clone)]
pub struct Dataset {
    discrete: Vec<Vec<u8>>,
    continuous: Vec<Vec<f64>>,
    n_obs: usize,
    hyper: Hyperparameters,
}

impl Dataset {
    /// Build a dataset from already-split variant and trait rows.
    pub fn new(discrete: Vec<Vec<u8>>, continuous: Vec<Vec<f64>>, maf: f64) -> Result<Self> {
        let n_vars = discrete.len() + continuous.len();
        if n_vars < 2 {
            return Err(ClusterError::Config(format!(
                "at least two variables are required, got {}",
                n_vars
            )));
        }

        let n_obs = discrete
            .first()
            .map(|r| r.len())
            .or_else(|| continuous.first().map(|r| r.len()))
            .unwrap_or(0);
        if n_obs == 0 {
            return Err(ClusterError::InvalidData("matrix has no observations".into()));
        }

        for (i, row) in discrete.iter().enumerate() {
            if row.len() != n_obs {
                return Err(ClusterError::InvalidData(format!(
                    "variant row {} has {} observations, expected {}",
                    i,
                    row.len(),
                    n_obs
                )));
            }
            if let Some(&g) = row.iter().find(|&&g| g > 2) {
                return Err(ClusterError::InvalidData(format!(
                    "variant row {} contains genotype code {} outside {{0, 1, 2}}",
                    i, g
                )));
            }
        }
        for (j, row) in continuous.iter().enumerate() {
            if row.len() != n_obs {
                return Err(ClusterError::InvalidData(format!(
                    "trait row {} has {} observations, expected {}",
                    j,
                    row.len(),
                    n_obs
                )));
            }
            if row.iter().any(|v| !v.is_finite()) {
                return Err(ClusterError::InvalidData(format!(
                    "trait row {} contains a non-finite value",
                    j
                )));
            }
        }

        let hyper = Hyperparameters::derive(&continuous, maf)?;
        debug!(
            "Dataset: {} variants, {} traits, {} observations, mu0 = {:.4}, nu0 = {}",
            discrete.len(),
            continuous.len(),
            n_obs,
            hyper.mu0,
            hyper.nu0
        );

        Ok(Self {
            discrete,
            continuous,
            n_obs,
            hyper,
        })
    }

    /// Build a dataset from the raw matrix, one row per variable.
    ///
    /// The first `n_variants` rows are genotype codes (stored as numbers in
    /// the input, required to be exactly 0, 1 or 2); the following
    /// `n_traits` rows are trait values.
    pub fn from_rows(
        rows: Vec<Vec<f64>>,
        n_variants: usize,
        n_traits: usize,
        maf: f64,
    ) -> Result<Self> {
        if rows.len() != n_variants + n_traits {
            return Err(ClusterError::InvalidData(format!(
                "matrix has {} variable rows, expected {} variants + {} traits",
                rows.len(),
                n_variants,
                n_traits
            )));
        }

        let mut rows = rows;
        let continuous = rows.split_off(n_variants);
        let discrete = rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                row.iter()
                    .enumerate()
                    .map(|(t, &v)| genotype_code(v).ok_or_else(|| {
                        ClusterError::InvalidData(format!(
                            "variant row {}, observation {}: {} is not a genotype code",
                            i, t, v
                        ))
                    }))
                    .collect::<Result<Vec<u8>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(discrete, continuous, maf)
    }

    pub fn n_variants(&self) -> usize {
        self.discrete.len()
    }

    pub fn n_traits(&self) -> usize {
        self.continuous.len()
    }

    pub fn n_obs(&self) -> usize {
        self.n_obs
    }

    /// Total number of variables (variants + traits).
    pub fn n_variables(&self) -> usize {
        self.discrete.len() + self.continuous.len()
    }

    /// Whether variable index `var` denotes a variant (discrete) variable.
    pub fn is_discrete(&self, var: usize) -> bool {
        var < self.discrete.len()
    }

    pub fn discrete_row(&self, i: usize) -> &[u8] {
        &self.discrete[i]
    }

    pub fn continuous_row(&self, j: usize) -> &[f64] {
        &self.continuous[j]
    }

    pub fn hyper(&self) -> &Hyperparameters {
        &self.hyper
    }
}

fn genotype_code(v: f64) -> Option<u8> {
    match v {
        x if x == 0.0 => Some(0),
        x if x == 1.0 => Some(1),
        x if x == 2.0 => Some(2),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genotype_odds_sum_to_one() {
        for &p in &[0.01, 0.2, 0.5, 0.9] {
            let odds = genotype_odds(p);
            assert!((odds.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        }
        assert_eq!(genotype_odds(0.5), [0.25, 0.5, 0.25]);
    }

    #[test]
    fn test_hyperparameters() {
        let traits = vec![vec![1.0, 2.0, 3.0], vec![5.0, 5.0, 8.0]];
        let h = Hyperparameters::derive(&traits, 0.3).unwrap();
        assert_eq!(h.kappa0, 1.0);
        assert_eq!(h.nu0, 3.0);
        assert_eq!(h.sigma0, 1.0);
        assert!((h.mu0 - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_hyperparameters_without_traits() {
        let h = Hyperparameters::derive(&[], 0.3).unwrap();
        assert_eq!(h.nu0, 1.0);
        assert_eq!(h.mu0, 2.0);
    }

    #[test]
    fn test_maf_out_of_range() {
        for &p in &[0.0, 1.0, -0.1, 1.5, f64::NAN] {
            assert!(matches!(
                Hyperparameters::derive(&[], p),
                Err(ClusterError::Config(_))
            ));
        }
    }

    #[test]
    fn test_from_rows_splits_variables() {
        let rows = vec![
            vec![0.0, 1.0, 2.0, 1.0],
            vec![2.0, 2.0, 0.0, 0.0],
            vec![0.5, -1.0, 3.2, 0.0],
        ];
        let ds = Dataset::from_rows(rows, 2, 1, 0.25).unwrap();
        assert_eq!(ds.n_variants(), 2);
        assert_eq!(ds.n_traits(), 1);
        assert_eq!(ds.n_obs(), 4);
        assert_eq!(ds.n_variables(), 3);
        assert_eq!(ds.discrete_row(0), &[0, 1, 2, 1]);
        assert_eq!(ds.continuous_row(0), &[0.5, -1.0, 3.2, 0.0]);
        assert!(ds.is_discrete(1));
        assert!(!ds.is_discrete(2));
    }

    #[test]
    fn test_from_rows_rejects_bad_genotype() {
        let rows = vec![vec![0.0, 1.5], vec![1.0, 2.0]];
        assert!(matches!(
            Dataset::from_rows(rows, 1, 1, 0.25),
            Err(ClusterError::InvalidData(_))
        ));
    }

    #[test]
    fn test_from_rows_rejects_shape_mismatch() {
        let rows = vec![vec![0.0, 1.0], vec![1.0, 2.0, 3.0]];
        assert!(matches!(
            Dataset::from_rows(rows.clone(), 1, 1, 0.25),
            Err(ClusterError::InvalidData(_))
        ));
        assert!(matches!(
            Dataset::from_rows(rows, 1, 2, 0.25),
            Err(ClusterError::InvalidData(_))
        ));
    }

    #[test]
    fn test_requires_two_variables() {
        assert!(matches!(
            Dataset::new(vec![vec![0, 1]], vec![], 0.3),
            Err(ClusterError::Config(_))
        ));
    }
}
