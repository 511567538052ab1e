//! Write a simulated matrix.
//!
//! bclust simulate --variants 4 --traits 1 --observations 50 --maf 0.5 --output sim.txt

use std::path::Path;

use anyhow::Result;
use clap::Args;
use tracing::info;

use bclust_core::simulate::{simulate_rows, SimulationConfig};
use bclust_io::write_matrix;

#[derive(Args)]
pub struct SimulateArgs {
    /// Number of variants
    #[arg(long, default_value = "4")]
    variants: usize,

    /// Number of traits
    #[arg(long, default_value = "1")]
    traits: usize,

    /// Number of observations
    #[arg(long, default_value = "50")]
    observations: usize,

    /// Minor allele frequency
    #[arg(long, default_value = "0.5")]
    maf: f64,

    /// Additive effect of the first variant on every trait
    #[arg(long, default_value = "0.0")]
    effect: f64,

    /// Trait noise standard deviation
    #[arg(long, default_value = "1.0")]
    noise_sd: f64,

    /// Random seed
    #[arg(long, default_value = "12345")]
    seed: u64,

    /// Output matrix path
    #[arg(long)]
    output: String,
}

pub fn run(args: SimulateArgs) -> Result<()> {
    let config = SimulationConfig {
        n_variants: args.variants,
        n_traits: args.traits,
        n_observations: args.observations,
        maf: args.maf,
        effect: args.effect,
        noise_sd: args.noise_sd,
        seed: args.seed,
    };
    let rows = simulate_rows(&config)?;
    write_matrix(&rows, Path::new(&args.output))?;
    info!("Wrote {} x {} matrix to {}", rows.len(), args.observations, args.output);
    Ok(())
}
