//! Closed-form log marginal likelihoods for one cluster's variables.
//!
//! Three models, chosen by which kinds of variables a cluster holds:
//!
//! ```text
//! Dependent       variants + traits   Σ_c logLikeCont(traits | genotype class c) + logLikeDisc(variants)
//! DiscreteOnly    variants            Dirichlet-multinomial over joint genotype classes
//! ContinuousOnly  traits              Normal-Inverse-Gamma (d = 1) / Normal-Inverse-Wishart (d > 1)
//! Empty           nothing             0
//! ```
//!
//! Every function here is pure: same selection, same dataset, same bits.

pub mod continuous;
pub mod dependent;
pub mod discrete;

use serde::Serialize;

use crate::dataset::Hyperparameters;
use crate::error::Result;

/// How selections with more than one trait are scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum MultivariateMode {
    /// Full Normal-Inverse-Wishart marginal likelihood.
    #[default]
    Full,
    /// Legacy behaviour: multi-trait selections contribute 0.
    Ignore,
}

/// The rows of one cluster, split by variable kind.
#[derive(Debug, Clone, Default)]
pub struct Selection<'a> {
    pub discrete: Vec<&'a [u8]>,
    pub continuous: Vec<&'a [f64]>,
}

impl Selection<'_> {
    pub fn is_empty(&self) -> bool {
        self.discrete.is_empty() && self.continuous.is_empty()
    }
}

/// Which marginal likelihood applies to a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Model {
    Dependent,
    DiscreteOnly,
    ContinuousOnly,
    Empty,
}

impl Model {
    pub fn select(n_discrete: usize, n_continuous: usize) -> Self {
        match (n_discrete > 0, n_continuous > 0) {
            (true, true) => Model::Dependent,
            (true, false) => Model::DiscreteOnly,
            (false, true) => Model::ContinuousOnly,
            (false, false) => Model::Empty,
        }
    }
}

/// Stateless evaluator bound to one run's hyperparameters.
#[derive(Debug, Clone, Copy)]
pub struct LikelihoodEngine<'a> {
    hyper: &'a Hyperparameters,
    mode: MultivariateMode,
}

impl<'a> LikelihoodEngine<'a> {
    pub fn new(hyper: &'a Hyperparameters, mode: MultivariateMode) -> Self {
        Self { hyper, mode }
    }

    pub fn hyper(&self) -> &Hyperparameters {
        self.hyper
    }

    pub fn mode(&self) -> MultivariateMode {
        self.mode
    }

    pub fn log_like_cont(&self, rows: &[&[f64]]) -> Result<f64> {
        continuous::log_like_cont(rows, self.hyper, self.mode)
    }

    pub fn log_like_disc(&self, rows: &[&[u8]]) -> Result<f64> {
        discrete::log_like_disc(rows, self.hyper)
    }

    pub fn log_like_depe(&self, disc: &[&[u8]], cont: &[&[f64]]) -> Result<f64> {
        dependent::log_like_depe(disc, cont, self.hyper, self.mode)
    }

    /// Log marginal likelihood of a selection under the model its contents imply.
    pub fn calc_prob(&self, sel: &Selection<'_>) -> Result<f64> {
        match Model::select(sel.discrete.len(), sel.continuous.len()) {
            Model::Dependent => self.log_like_depe(&sel.discrete, &sel.continuous),
            Model::DiscreteOnly => self.log_like_disc(&sel.discrete),
            Model::ContinuousOnly => self.log_like_cont(&sel.continuous),
            Model::Empty => Ok(0.0),
        }
    }
}
