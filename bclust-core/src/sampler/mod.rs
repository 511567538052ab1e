//! Metropolis-Hastings sampling over cluster assignments.

pub mod mcmc;
pub mod proposal;

pub use mcmc::{
    log_ratio, log_score, metropolis_accept, PartitionSampler, SamplerConfig, SamplerSummary,
    StepOutcome,
};
pub use proposal::{is_trivial_move, propose, Proposal};
