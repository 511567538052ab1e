//! Discrete-only evidence: collapsed Dirichlet-multinomial over joint
//! genotype classes.
//!
//! A class is the tuple of genotype codes one observation carries across
//! the selected variants. Its Dirichlet pseudo-count is the product of the
//! per-locus Hardy-Weinberg frequencies, i.e. the prior mass of that
//! combination under independence between loci.

use std::collections::BTreeMap;

use statrs::function::gamma::ln_gamma;

use crate::dataset::Hyperparameters;
use crate::error::{ClusterError, Result};

/// Observation indices grouped by joint genotype class.
///
/// Keys are ordered, so iteration (and therefore floating-point summation)
/// order is fixed for a given selection.
pub fn genotype_classes(rows: &[&[u8]]) -> BTreeMap<Vec<u8>, Vec<usize>> {
    let mut classes: BTreeMap<Vec<u8>, Vec<usize>> = BTreeMap::new();
    let n_obs = rows.first().map_or(0, |r| r.len());
    for t in 0..n_obs {
        let key: Vec<u8> = rows.iter().map(|r| r[t]).collect();
        classes.entry(key).or_default().push(t);
    }
    classes
}

/// Log prior pseudo-count of a joint genotype class.
pub fn ln_class_alpha(class: &[u8], odds: &[f64; 3]) -> f64 {
    class.iter().map(|&g| odds[g as usize].ln()).sum()
}

/// Prior pseudo-count of a joint genotype class.
///
/// Fails when the product of per-locus frequencies underflows to zero,
/// which happens for long classes at very small MAFs.
pub fn class_alpha(class: &[u8], odds: &[f64; 3]) -> Result<f64> {
    let alpha = ln_class_alpha(class, odds).exp();
    if alpha > 0.0 && alpha.is_finite() {
        Ok(alpha)
    } else {
        Err(ClusterError::Numerical(format!(
            "prior mass of genotype class {:?} underflows (ln alpha = {})",
            class,
            ln_class_alpha(class, odds)
        )))
    }
}

/// Σ_c [lnΓ(n_c + α_c) − lnΓ(α_c)] − lnΓ(Σ_c (n_c + α_c)) over observed classes.
pub fn dirichlet_multinomial<'a, I>(counts: I, odds: &[f64; 3]) -> Result<f64>
where
    I: IntoIterator<Item = (&'a [u8], usize)>,
{
    let mut total = 0.0;
    let mut acc = 0.0;
    for (class, n_c) in counts {
        let alpha = class_alpha(class, odds)?;
        let n_c = n_c as f64;
        acc += ln_gamma(n_c + alpha) - ln_gamma(alpha);
        total += n_c + alpha;
    }
    if total == 0.0 {
        return Ok(0.0);
    }
    let value = acc - ln_gamma(total);
    if !value.is_finite() {
        return Err(ClusterError::Numerical(format!(
            "Dirichlet-multinomial evidence is not finite: {}",
            value
        )));
    }
    Ok(value)
}

/// Log marginal likelihood of the selected variant rows.
pub fn log_like_disc(rows: &[&[u8]], hyper: &Hyperparameters) -> Result<f64> {
    if rows.is_empty() {
        return Ok(0.0);
    }
    let classes = genotype_classes(rows);
    dirichlet_multinomial(
        classes.iter().map(|(k, obs)| (k.as_slice(), obs.len())),
        &hyper.genotype_odds,
    )
}
