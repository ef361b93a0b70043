use crate::args::OutputArgs;
use crate::printing::format_general;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;
use wfes_solver::WfStatistics;

/// Write the per-state vectors requested in `output`.
pub fn write_exports(stats: &WfStatistics, output: &OutputArgs) -> Result<()> {
    let requested = [
        (&output.sojourn_time_file, &stats.sojourn_times, "sojourn times"),
        (&output.extinction_file, &stats.extinction_probabilities, "extinction probabilities"),
        (&output.fixation_file, &stats.fixation_probabilities, "fixation probabilities"),
    ];
    for (path, values, what) in requested {
        if let Some(path) = path {
            write_vector(path, values).with_context(|| format!("Failed to write {what}"))?;
            info!(path = %path.display(), "wrote {what}");
        }
    }
    Ok(())
}

/// One line of comma-separated values, state `1` copy first.
fn write_vector(path: &Path, values: &[f64]) -> Result<()> {
    let mut line = values
        .iter()
        .map(|&v| format_general(v))
        .collect::<Vec<_>>()
        .join(",");
    line.push('\n');
    fs::write(path, line).with_context(|| format!("Cannot write to {}", path.display()))
}
