//! Synthetic variant/trait data.
//!
//! Genotypes are drawn under Hardy-Weinberg equilibrium at a fixed MAF.
//! Traits are Gaussian noise plus an optional additive effect of the
//! first variant, which gives the sampler a planted dependency to find.

use rand::distributions::Distribution;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use statrs::distribution::Normal;
use tracing::info;

use crate::dataset::{genotype_odds, Dataset};
use crate::error::{ClusterError, Result};

/// Parameters for a simulated dataset.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub n_variants: usize,
    pub n_traits: usize,
    pub n_observations: usize,
    pub maf: f64,
    /// Additive effect of variant 0's genotype code on every trait.
    pub effect: f64,
    /// Standard deviation of the trait noise.
    pub noise_sd: f64,
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            n_variants: 4,
            n_traits: 1,
            n_observations: 50,
            maf: 0.5,
            effect: 0.0,
            noise_sd: 1.0,
            seed: 12345,
        }
    }
}

/// Draw one genotype code from the HWE frequencies.
fn draw_genotype<R: Rng>(odds: &[f64; 3], rng: &mut R) -> u8 {
    let u: f64 = rng.gen();
    if u < odds[0] {
        0
    } else if u < odds[0] + odds[1] {
        1
    } else {
        2
    }
}

/// Simulate the raw matrix, one row per variable (variants first).
pub fn simulate_rows(config: &SimulationConfig) -> Result<Vec<Vec<f64>>> {
    if !(config.maf > 0.0 && config.maf < 1.0) {
        return Err(ClusterError::Config(format!(
            "minor allele frequency must lie in (0, 1), got {}",
            config.maf
        )));
    }
    if config.n_traits > 0 && config.effect != 0.0 && config.n_variants == 0 {
        return Err(ClusterError::Config(
            "a genotype effect needs at least one variant".into(),
        ));
    }
    let noise = Normal::new(0.0, config.noise_sd)
        .map_err(|e| ClusterError::Config(format!("trait noise: {}", e)))?;

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let odds = genotype_odds(config.maf);
    let n = config.n_observations;

    let mut rows: Vec<Vec<f64>> = (0..config.n_variants)
        .map(|_| (0..n).map(|_| draw_genotype(&odds, &mut rng) as f64).collect())
        .collect();

    for _ in 0..config.n_traits {
        let trait_row: Vec<f64> = (0..n)
            .map(|t| {
                let shift = rows.first().map_or(0.0, |g| config.effect * g[t]);
                shift + noise.sample(&mut rng)
            })
            .collect();
        rows.push(trait_row);
    }

    info!(
        "Simulated {} variants and {} traits over {} observations (MAF {}, effect {})",
        config.n_variants, config.n_traits, n, config.maf, config.effect
    );
    Ok(rows)
}

/// Simulate rows and build a dataset from them.
pub fn simulate_dataset(config: &SimulationConfig) -> Result<Dataset> {
    let rows = simulate_rows(config)?;
    Dataset::from_rows(rows, config.n_variants, config.n_traits, config.maf)
}
