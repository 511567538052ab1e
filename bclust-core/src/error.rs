//! Error types shared by the likelihood engine and the sampler.

use thiserror::Error;

/// Fatal conditions raised by dataset construction, scoring, or sampling.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClusterError {
    /// Invalid run parameters (iteration counts, MAF, variable counts).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input matrix does not match the declared shape or genotype coding.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A marginal likelihood could not be evaluated (non-positive scale, non-PD matrix).
    #[error("Numerical error: {0}")]
    Numerical(String),

    /// The proposal retry loop never produced a non-trivial move.
    #[error("No non-trivial proposal found after {attempts} attempts")]
    ProposalExhausted { attempts: usize },
}

pub type Result<T> = std::result::Result<T, ClusterError>;
