//! Whitespace-delimited numeric matrix reader.
//!
//! The default layout is one line per variable and one column per
//! observation: the first `n_variants` lines are genotype codes, the rest
//! are traits. Files written one line per observation are read with
//! `observations_as_rows` and transposed on load. Blank lines and lines
//! starting with `#` are skipped.

use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::info;

use bclust_core::Dataset;

/// Layout of the matrix on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatrixLayout {
    /// One line per variable.
    #[default]
    VariablesAsRows,
    /// One line per observation; transposed on load.
    ObservationsAsRows,
}

/// Parse matrix text into rows of equal length.
pub fn parse_matrix(contents: &str) -> Result<Vec<Vec<f64>>> {
    let mut rows: Vec<Vec<f64>> = Vec::new();

    for (line_num, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let row = line
            .split_whitespace()
            .map(|field| {
                field.parse::<f64>().with_context(|| {
                    format!("Line {}: '{}' is not a number", line_num + 1, field)
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        if let Some(first) = rows.first() {
            if row.len() != first.len() {
                bail!(
                    "Line {} has {} fields, expected {}",
                    line_num + 1,
                    row.len(),
                    first.len()
                );
            }
        }
        rows.push(row);
    }

    if rows.is_empty() {
        bail!("Matrix contains no data rows");
    }
    Ok(rows)
}

/// Swap rows and columns.
pub fn transpose(rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let ncols = rows.first().map_or(0, |r| r.len());
    (0..ncols)
        .map(|j| rows.iter().map(|r| r[j]).collect())
        .collect()
}

/// Read a matrix file into per-variable rows.
pub fn read_matrix(path: &Path, layout: MatrixLayout) -> Result<Vec<Vec<f64>>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read matrix file: {}", path.display()))?;
    let rows = parse_matrix(&contents)
        .with_context(|| format!("Failed to parse matrix file: {}", path.display()))?;

    Ok(match layout {
        MatrixLayout::VariablesAsRows => rows,
        MatrixLayout::ObservationsAsRows => transpose(&rows),
    })
}

/// Read a matrix file and build the dataset.
pub fn load_dataset(
    path: &Path,
    layout: MatrixLayout,
    n_variants: usize,
    n_traits: usize,
    maf: f64,
) -> Result<Dataset> {
    let rows = read_matrix(path, layout)?;
    info!(
        "Loaded {} variables x {} observations from {}",
        rows.len(),
        rows.first().map_or(0, |r| r.len()),
        path.display()
    );
    let dataset = Dataset::from_rows(rows, n_variants, n_traits, maf)
        .with_context(|| format!("Invalid input matrix: {}", path.display()))?;
    Ok(dataset)
}

/// Write per-variable rows as a matrix file (one line per variable).
pub fn write_matrix(rows: &[Vec<f64>], path: &Path) -> Result<()> {
    let mut out = String::new();
    for row in rows {
        let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        out.push_str(&line.join("\t"));
        out.push('\n');
    }
    std::fs::write(path, out)
        .with_context(|| format!("Failed to write matrix file: {}", path.display()))?;
    Ok(())
}
