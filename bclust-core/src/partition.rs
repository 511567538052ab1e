//! Cluster assignment over variables.
//!
//! `labels[i]` is the label of variable `i`; a cluster is every variable
//! sharing a label. Labels live in `[0, n)` but need not be fixed points.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::dataset::Dataset;
use crate::error::{ClusterError, Result};
use crate::likelihood::Selection;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Partition {
    labels: Vec<usize>,
}

impl Partition {
    /// Every variable in its own singleton cluster.
    pub fn identity(n: usize) -> Self {
        Self {
            labels: (0..n).collect(),
        }
    }

    /// Wrap an existing label vector; every label must be below its length.
    pub fn from_labels(labels: Vec<usize>) -> Result<Self> {
        let n = labels.len();
        if let Some((i, &l)) = labels.iter().enumerate().find(|(_, &l)| l >= n) {
            return Err(ClusterError::InvalidData(format!(
                "variable {} has label {}, labels must be below {}",
                i, l, n
            )));
        }
        Ok(Self { labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn label(&self, var: usize) -> usize {
        self.labels[var]
    }

    /// A copy with variable `var` relabelled to `label`.
    pub fn with_label(&self, var: usize, label: usize) -> Self {
        let mut labels = self.labels.clone();
        labels[var] = label;
        Self { labels }
    }

    /// Number of variables bearing `label`.
    pub fn count(&self, label: usize) -> usize {
        self.labels.iter().filter(|&&l| l == label).count()
    }

    /// Variables bearing `label`, in index order.
    pub fn members(&self, label: usize) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, &l)| l == label)
            .map(|(i, _)| i)
            .collect()
    }

    /// Labels currently in use, ascending.
    pub fn distinct_labels(&self) -> Vec<usize> {
        let mut seen = vec![false; self.labels.len()];
        for &l in &self.labels {
            seen[l] = true;
        }
        seen.iter()
            .enumerate()
            .filter(|(_, &s)| s)
            .map(|(l, _)| l)
            .collect()
    }

    /// Label values in `[0, n)` not borne by any variable.
    pub fn unused_labels(&self) -> Vec<usize> {
        let mut seen = vec![false; self.labels.len()];
        for &l in &self.labels {
            seen[l] = true;
        }
        seen.iter()
            .enumerate()
            .filter(|(_, &s)| !s)
            .map(|(l, _)| l)
            .collect()
    }

    /// Label -> members map.
    pub fn clusters(&self) -> BTreeMap<usize, Vec<usize>> {
        let mut out: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (i, &l) in self.labels.iter().enumerate() {
            out.entry(l).or_default().push(i);
        }
        out
    }

    pub fn cluster_count(&self) -> usize {
        self.distinct_labels().len()
    }

    /// Rows of every variable bearing `label`, split into variant and trait rows.
    pub fn selection<'a>(&self, label: usize, dataset: &'a Dataset) -> Selection<'a> {
        let mut sel = Selection::default();
        for var in self.members(label) {
            if dataset.is_discrete(var) {
                sel.discrete.push(dataset.discrete_row(var));
            } else {
                sel.continuous
                    .push(dataset.continuous_row(var - dataset.n_variants()));
            }
        }
        sel
    }
}
