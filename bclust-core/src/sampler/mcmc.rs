//! The Metropolis-Hastings loop.
//!
//! Each iteration:
//!   1. Draw a non-trivial relabelling move (labels x, y; one variable).
//!   2. Score clusters x and y before and after the move. All other clusters
//!      are untouched and cancel in the ratio.
//!   3. Accept with probability min(1, exp(after - before)).
//!
//! The sampler owns the only mutable copy of the assignment. Scoring reads
//! the current assignment or the proposal's fresh copy, never a state that
//! is being written. The x and y scores are computed concurrently; every
//! random draw happens on the sampler thread in a fixed order, so a seed
//! fully determines the chain.

use std::time::Instant;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, info, trace};

use super::proposal::propose;
use crate::dataset::{Dataset, Hyperparameters};
use crate::error::{ClusterError, Result};
use crate::likelihood::{LikelihoodEngine, MultivariateMode};
use crate::partition::Partition;

/// Run parameters for the sampler.
#[derive(Debug, Clone, Serialize)]
pub struct SamplerConfig {
    /// Total Metropolis steps.
    pub iterations: usize,
    /// Leading steps excluded from the post-burn-in acceptance statistics.
    pub burn_in: usize,
    /// Seed for the single random stream.
    pub seed: u64,
    /// Scoring of multi-trait selections.
    pub multivariate: MultivariateMode,
    /// Ceiling on redraws while looking for a non-trivial move.
    pub max_proposal_attempts: usize,
    /// Number of evenly spaced progress log lines.
    pub progress_checkpoints: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            iterations: 1000,
            burn_in: 100,
            seed: 12345,
            multivariate: MultivariateMode::Full,
            max_proposal_attempts: 10_000,
            progress_checkpoints: 10,
        }
    }
}

impl SamplerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(ClusterError::Config("iteration count must be positive".into()));
        }
        if self.burn_in > self.iterations {
            return Err(ClusterError::Config(format!(
                "burn-in ({}) exceeds iteration count ({})",
                self.burn_in, self.iterations
            )));
        }
        if self.max_proposal_attempts == 0 {
            return Err(ClusterError::Config(
                "proposal attempt ceiling must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Metropolis acceptance for a symmetric proposal: ln u <= min(0, delta).
pub fn metropolis_accept(log_u: f64, delta: f64) -> bool {
    log_u <= delta.min(0.0)
}

/// Log acceptance ratio of a move; a non-finite score is an error, not a
/// rejection.
pub fn log_ratio(score_before: f64, score_after: f64) -> Result<f64> {
    let delta = score_after - score_before;
    if !delta.is_finite() {
        return Err(ClusterError::Numerical(format!(
            "non-finite log ratio: after {} - before {}",
            score_after, score_before
        )));
    }
    Ok(delta)
}

/// Total log marginal likelihood of a partition, summed over its clusters.
pub fn log_score(
    dataset: &Dataset,
    engine: &LikelihoodEngine<'_>,
    partition: &Partition,
) -> Result<f64> {
    partition
        .distinct_labels()
        .into_iter()
        .map(|label| engine.calc_prob(&partition.selection(label, dataset)))
        .sum()
}

/// Score the clusters labelled `x` and `y` in `partition`, in parallel.
fn score_labels(
    dataset: &Dataset,
    engine: &LikelihoodEngine<'_>,
    partition: &Partition,
    x: usize,
    y: usize,
) -> Result<f64> {
    let (sx, sy) = rayon::join(
        || engine.calc_prob(&partition.selection(x, dataset)),
        || engine.calc_prob(&partition.selection(y, dataset)),
    );
    Ok(sx? + sy?)
}

/// What one iteration did.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub iteration: usize,
    pub from_label: usize,
    pub to_label: usize,
    pub var: usize,
    pub score_before: f64,
    pub score_after: f64,
    pub log_u: f64,
    pub accepted: bool,
    pub attempts: usize,
}

/// End-of-run report.
#[derive(Debug, Clone, Serialize)]
pub struct SamplerSummary {
    pub iterations: usize,
    pub burn_in: usize,
    pub accepted: usize,
    pub accepted_after_burn_in: usize,
    pub acceptance_rate: f64,
    pub proposal_retries: usize,
    pub initial_log_score: f64,
    pub final_log_score: f64,
    pub cluster_count: usize,
    pub partition: Partition,
    pub config: SamplerConfig,
    pub hyperparameters: Hyperparameters,
}

pub struct PartitionSampler<'a> {
    dataset: &'a Dataset,
    engine: LikelihoodEngine<'a>,
    config: SamplerConfig,
    rng: ChaCha8Rng,
    current: Partition,
    iteration: usize,
    accepted: usize,
    accepted_after_burn_in: usize,
    retries: usize,
}

impl<'a> PartitionSampler<'a> {
    /// Start from the identity assignment.
    pub fn new(dataset: &'a Dataset, config: SamplerConfig) -> Result<Self> {
        Self::with_partition(dataset, config, Partition::identity(dataset.n_variables()))
    }

    /// Start from a given assignment.
    pub fn with_partition(
        dataset: &'a Dataset,
        config: SamplerConfig,
        initial: Partition,
    ) -> Result<Self> {
        config.validate()?;
        if initial.len() != dataset.n_variables() {
            return Err(ClusterError::Config(format!(
                "initial partition covers {} variables, dataset has {}",
                initial.len(),
                dataset.n_variables()
            )));
        }
        Ok(Self {
            dataset,
            engine: LikelihoodEngine::new(dataset.hyper(), config.multivariate),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            current: initial,
            iteration: 0,
            accepted: 0,
            accepted_after_burn_in: 0,
            retries: 0,
        })
    }

    pub fn current(&self) -> &Partition {
        &self.current
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn engine(&self) -> &LikelihoodEngine<'a> {
        &self.engine
    }

    /// One Metropolis-Hastings iteration.
    pub fn step(&mut self) -> Result<StepOutcome> {
        let proposal = propose(&self.current, &mut self.rng, self.config.max_proposal_attempts)?;
        let (x, y) = (proposal.from_label, proposal.to_label);

        let score_before = score_labels(self.dataset, &self.engine, &self.current, x, y)?;
        let score_after = score_labels(self.dataset, &self.engine, &proposal.proposed, x, y)?;

        let delta = log_ratio(score_before, score_after)?;

        let u: f64 = self.rng.gen();
        let log_u = u.ln();
        let accepted = metropolis_accept(log_u, delta);

        self.iteration += 1;
        self.retries += proposal.attempts - 1;
        if accepted {
            trace!(
                "iter {}: variable {} {} -> {} (delta {:.4})",
                self.iteration, proposal.var, x, y, delta
            );
            self.current = proposal.proposed;
            self.accepted += 1;
            if self.iteration > self.config.burn_in {
                self.accepted_after_burn_in += 1;
            }
        }

        Ok(StepOutcome {
            iteration: self.iteration,
            from_label: x,
            to_label: y,
            var: proposal.var,
            score_before,
            score_after,
            log_u,
            accepted,
            attempts: proposal.attempts,
        })
    }

    /// Run the configured number of iterations from the current state.
    pub fn run(&mut self) -> Result<SamplerSummary> {
        let start = Instant::now();
        let total = self.config.iterations;
        let checkpoint = (total / self.config.progress_checkpoints.max(1)).max(1);

        info!(
            "Sampling {} variables ({} variants, {} traits) over {} observations",
            self.dataset.n_variables(),
            self.dataset.n_variants(),
            self.dataset.n_traits(),
            self.dataset.n_obs()
        );
        info!(
            "Iterations: {}, burn-in: {}, seed: {}, multivariate: {:?}",
            total, self.config.burn_in, self.config.seed, self.config.multivariate
        );

        let initial_log_score = log_score(self.dataset, &self.engine, &self.current)?;
        debug!("Initial log score: {:.4}", initial_log_score);

        for _ in 0..total {
            self.step()?;

            if self.iteration == self.config.burn_in {
                info!("Burn-in complete after {} iterations", self.iteration);
            }
            if self.iteration % checkpoint == 0 {
                info!(
                    "Progress: {}/{} ({:.0}%), acceptance rate {:.3}, {} clusters",
                    self.iteration,
                    total,
                    100.0 * self.iteration as f64 / total as f64,
                    self.accepted as f64 / self.iteration as f64,
                    self.current.cluster_count()
                );
            }
        }

        let final_log_score = log_score(self.dataset, &self.engine, &self.current)?;
        info!(
            "Sampling finished in {:.2}s: {} accepted ({} after burn-in), final log score {:.4}",
            start.elapsed().as_secs_f64(),
            self.accepted,
            self.accepted_after_burn_in,
            final_log_score
        );

        Ok(SamplerSummary {
            iterations: self.iteration,
            burn_in: self.config.burn_in,
            accepted: self.accepted,
            accepted_after_burn_in: self.accepted_after_burn_in,
            acceptance_rate: self.accepted as f64 / self.iteration.max(1) as f64,
            proposal_retries: self.retries,
            initial_log_score,
            final_log_score,
            cluster_count: self.current.cluster_count(),
            partition: self.current.clone(),
            config: self.config.clone(),
            hyperparameters: self.dataset.hyper().clone(),
        })
    }
}
