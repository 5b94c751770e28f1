use crate::allocator::Allocation;
use crate::scenario::Scenario;
use crate::scoring::Weights;
use crate::tables;
use std::error::Error;
use std::path::{Path, PathBuf};

/// Write one scenario's assignment table: `fue,MUE`, one row per realized
/// assignment, ordered by requester index ascending.
pub fn write_assignments(
    dir: &Path,
    scenario: &Scenario,
    allocation: &Allocation,
) -> std::io::Result<PathBuf> {
    let header = vec!["fue".to_string(), "MUE".to_string()];
    let rows: Vec<Vec<String>> = allocation
        .pairs
        .iter()
        .map(|pair| vec![format!("fue {}", pair.fue_index + 1), pair.mue.clone()])
        .collect();

    let path = dir.join(scenario.output_file_name());
    tables::write_table(&path, &header, &rows)?;
    Ok(path)
}

/// Cross-scenario gain accumulator.
///
/// Starts empty, receives exactly one entry per processed scenario in
/// processing order, and is written exactly once after the batch loop.
#[derive(Debug, Default)]
pub struct BatchSummary {
    entries: Vec<(String, f64)>,
}

impl BatchSummary {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Record one scenario's total channel gain under its gain-file key
    pub fn push(&mut self, csv_file: String, total_gain: f64) {
        self.entries.push((csv_file, total_gain));
    }

    pub fn entries(&self) -> &[(String, f64)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the summary table, named after the weights
    /// (`alpha<A>_beta<B>OptimalGains.csv`). Returns the written path.
    pub fn write(&self, dir: &Path, weights: &Weights) -> Result<PathBuf, Box<dyn Error>> {
        let header = vec!["CSV_File".to_string(), "Optimal_Gain".to_string()];
        let rows: Vec<Vec<String>> = self
            .entries
            .iter()
            .map(|(csv_file, gain)| vec![csv_file.clone(), gain.to_string()])
            .collect();

        let path = dir.join(weights.summary_file_name());
        tables::write_table(&path, &header, &rows)
            .map_err(|e| format!("Failed to write summary '{}': {}", path.display(), e))?;
        Ok(path)
    }
}
