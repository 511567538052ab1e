//! Partition and run-summary writers.
//!
//! - `<prefix>.partition.txt`: the final labels on one line
//! - `<prefix>.clusters.tsv`: one line per cluster (label, size, members)
//! - `<prefix>.summary.json`: full run summary, optional

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::info;

use bclust_core::{Partition, SamplerSummary};

/// `<prefix><suffix>` as a path.
pub fn output_path(prefix: &str, suffix: &str) -> PathBuf {
    PathBuf::from(format!("{}{}", prefix, suffix))
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }
    Ok(())
}

/// Write the assignment vector as whitespace-separated labels.
pub fn write_partition(partition: &Partition, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    let line: Vec<String> = partition.labels().iter().map(|l| l.to_string()).collect();
    std::fs::write(path, format!("{}\n", line.join(" ")))
        .with_context(|| format!("Failed to write partition: {}", path.display()))?;
    Ok(())
}

/// Read an assignment vector written by [`write_partition`].
pub fn read_partition(path: &Path) -> Result<Partition> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read partition: {}", path.display()))?;
    let labels = contents
        .split_whitespace()
        .map(|s| {
            s.parse::<usize>()
                .with_context(|| format!("'{}' is not a cluster label", s))
        })
        .collect::<Result<Vec<usize>>>()?;
    if labels.is_empty() {
        bail!("Partition file {} is empty", path.display());
    }
    Ok(Partition::from_labels(labels)?)
}

/// Write one line per cluster: label, size, comma-separated member indices.
pub fn write_clusters(partition: &Partition, n_variants: usize, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    let mut out = String::from("label\tsize\tvariants\ttraits\tmembers\n");
    for (label, members) in partition.clusters() {
        let n_disc = members.iter().filter(|&&m| m < n_variants).count();
        let list: Vec<String> = members.iter().map(|m| m.to_string()).collect();
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}",
            label,
            members.len(),
            n_disc,
            members.len() - n_disc,
            list.join(",")
        )?;
    }
    std::fs::write(path, out)
        .with_context(|| format!("Failed to write clusters: {}", path.display()))?;
    Ok(())
}

/// Write the run summary as pretty JSON.
pub fn write_summary_json(summary: &SamplerSummary, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write summary: {}", path.display()))?;
    Ok(())
}

/// Write all result files for a finished run.
pub fn write_results(
    summary: &SamplerSummary,
    n_variants: usize,
    prefix: &str,
    save_json: bool,
) -> Result<()> {
    let partition_path = output_path(prefix, ".partition.txt");
    write_partition(&summary.partition, &partition_path)?;
    info!("Partition written to {}", partition_path.display());

    let clusters_path = output_path(prefix, ".clusters.tsv");
    write_clusters(&summary.partition, n_variants, &clusters_path)?;
    info!("Clusters written to {}", clusters_path.display());

    if save_json {
        let json_path = output_path(prefix, ".summary.json");
        write_summary_json(summary, &json_path)?;
        info!("Summary written to {}", json_path.display());
    }
    Ok(())
}
