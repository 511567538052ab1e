//! Sample a partition.
//!
//! bclust run --input matrix.txt --variants 4 --traits 1 --maf 0.3 --output-prefix out/run

use std::path::Path;

use anyhow::Result;
use clap::Args;
use tracing::info;

use bclust_core::{MultivariateMode, PartitionSampler, SamplerConfig};
use bclust_io::{load_dataset, read_partition, write_results, MatrixLayout};

#[derive(Args)]
pub struct RunArgs {
    /// Whitespace-delimited matrix, one line per variable (variants first)
    #[arg(long)]
    input: String,

    /// Number of variant (genotype) rows
    #[arg(long)]
    variants: usize,

    /// Number of trait rows
    #[arg(long)]
    traits: usize,

    /// Minor allele frequency for the Hardy-Weinberg genotype prior
    #[arg(long)]
    maf: f64,

    /// Total Metropolis-Hastings iterations
    #[arg(long, default_value = "1000")]
    iterations: usize,

    /// Iterations excluded from post-burn-in statistics
    #[arg(long, default_value = "100")]
    burn_in: usize,

    /// Random seed
    #[arg(long, default_value = "12345")]
    seed: u64,

    /// Output file prefix
    #[arg(long)]
    output_prefix: String,

    /// Input has one line per observation instead of one per variable
    #[arg(long, default_value = "false")]
    observations_as_rows: bool,

    /// Score clusters with several traits as 0 (legacy behaviour)
    #[arg(long, default_value = "false")]
    legacy_multivariate: bool,

    /// Start from a partition file instead of all singletons
    #[arg(long)]
    init_partition: Option<String>,

    /// Number of progress log lines
    #[arg(long, default_value = "10")]
    progress_checkpoints: usize,

    /// Also save JSON run summary
    #[arg(long, default_value = "false")]
    save_json: bool,
}

pub fn run(args: RunArgs) -> Result<()> {
    info!("=== bclust: partition sampling ===");
    info!("Input: {}", args.input);

    let layout = if args.observations_as_rows {
        MatrixLayout::ObservationsAsRows
    } else {
        MatrixLayout::VariablesAsRows
    };

    let config = SamplerConfig {
        iterations: args.iterations,
        burn_in: args.burn_in,
        seed: args.seed,
        multivariate: if args.legacy_multivariate {
            MultivariateMode::Ignore
        } else {
            MultivariateMode::Full
        },
        progress_checkpoints: args.progress_checkpoints,
        ..Default::default()
    };
    config.validate()?;

    let dataset = load_dataset(
        Path::new(&args.input),
        layout,
        args.variants,
        args.traits,
        args.maf,
    )?;

    let mut sampler = match args.init_partition {
        Some(ref path) => {
            let initial = read_partition(Path::new(path))?;
            info!("Initial partition: {} ({} clusters)", path, initial.cluster_count());
            PartitionSampler::with_partition(&dataset, config, initial)?
        }
        None => PartitionSampler::new(&dataset, config)?,
    };

    let summary = sampler.run()?;
    info!(
        "Final partition: {} clusters, acceptance rate {:.3}",
        summary.cluster_count, summary.acceptance_rate
    );

    write_results(&summary, dataset.n_variants(), &args.output_prefix, args.save_json)?;
    Ok(())
}
