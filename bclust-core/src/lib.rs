//! bclust-core: Bayesian clustering of variants and traits
//!
//! Groups discrete variant variables and continuous trait variables by
//! Metropolis-Hastings sampling over cluster assignments, scoring each
//! cluster by its closed-form conjugate-prior marginal likelihood
//! (Dirichlet-multinomial, Normal-Inverse-Gamma/Wishart, and the mixed
//! genotype-conditional model).

pub mod dataset;
pub mod error;
pub mod likelihood;
pub mod partition;
pub mod sampler;
pub mod simulate;
pub mod util;

pub use dataset::{Dataset, Hyperparameters};
pub use error::{ClusterError, Result};
pub use likelihood::{LikelihoodEngine, Model, MultivariateMode, Selection};
pub use partition::Partition;
pub use sampler::{PartitionSampler, SamplerConfig, SamplerSummary};
