//! Mixed evidence: traits explained conditionally on genotype class,
//! variants scored unconditionally.
//!
//! P(traits, variants) = Π_c P(traits restricted to class c) · P(variants)

use super::continuous::log_like_cont;
use super::discrete::{dirichlet_multinomial, genotype_classes};
use super::MultivariateMode;
use crate::dataset::Hyperparameters;
use crate::error::Result;

/// Log marginal likelihood of variant rows `disc` and trait rows `cont` as one cluster.
pub fn log_like_depe(
    disc: &[&[u8]],
    cont: &[&[f64]],
    hyper: &Hyperparameters,
    mode: MultivariateMode,
) -> Result<f64> {
    let classes = genotype_classes(disc);

    let mut conditional = 0.0;
    for obs in classes.values() {
        let subset: Vec<Vec<f64>> = cont
            .iter()
            .map(|row| obs.iter().map(|&t| row[t]).collect())
            .collect();
        let refs: Vec<&[f64]> = subset.iter().map(Vec::as_slice).collect();
        conditional += log_like_cont(&refs, hyper, mode)?;
    }

    let marginal = dirichlet_multinomial(
        classes.iter().map(|(k, obs)| (k.as_slice(), obs.len())),
        &hyper.genotype_odds,
    )?;
    Ok(conditional + marginal)
}
