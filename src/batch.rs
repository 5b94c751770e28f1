use crate::allocator::{allocate, Allocation};
use crate::bids::{fbs_groups, load_bid_table};
use crate::gains::load_gain_table;
use crate::logger::{LogEvent, Logger};
use crate::output::{self, BatchSummary};
use crate::scenario::Scenario;
use crate::scoring::{score, Weights};
use crate::tables::read_table;
use crate::{errln, logln, warnln};
use std::error::Error;
use std::path::{Path, PathBuf};

/// Everything a batch run needs: which table pairs to process, where the
/// outputs go, and the quality weights. Fixed for the whole run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Gain-table path prefixes, e.g. `data/Te_matrices/Te_3648`
    pub gain_prefixes: Vec<String>,
    /// Bid-table path prefixes, matched to `gain_prefixes` by position
    pub bid_prefixes: Vec<String>,
    /// Trials per prefix; trial indices run 1..=trials
    pub trials: usize,
    /// Directory receiving the per-scenario assignment tables
    pub output_dir: PathBuf,
    /// Directory receiving the end-of-batch summary table
    pub summary_dir: PathBuf,
    pub weights: Weights,
}

impl BatchConfig {
    /// Expand the prefix lists into the ordered list of (gain, bid) table
    /// path pairs, one per scenario
    pub fn enumerate(&self) -> Result<Vec<(String, String)>, Box<dyn Error>> {
        if self.gain_prefixes.len() != self.bid_prefixes.len() {
            return Err(format!(
                "{} gain prefixes but {} bid prefixes",
                self.gain_prefixes.len(),
                self.bid_prefixes.len()
            )
            .into());
        }
        if self.gain_prefixes.is_empty() || self.trials == 0 {
            return Err("Batch enumerates no scenarios".into());
        }

        let mut pairs = Vec::with_capacity(self.gain_prefixes.len() * self.trials);
        for (gain_prefix, bid_prefix) in self.gain_prefixes.iter().zip(&self.bid_prefixes) {
            for trial in 1..=self.trials {
                pairs.push((
                    format!("{}_{}.csv", gain_prefix, trial),
                    format!("{}_{}.csv", bid_prefix, trial),
                ));
            }
        }
        Ok(pairs)
    }
}

/// Run one scenario through Loaded -> Scored -> Allocated.
///
/// Any failure here (bad file name, unreadable table, malformed cell, size
/// mismatch) propagates to the caller and aborts the batch.
fn run_scenario(
    gain_path: &str,
    bid_path: &str,
    weights: &Weights,
    logger: &mut Logger,
) -> Result<(Scenario, Allocation), Box<dyn Error>> {
    let scenario = Scenario::from_gain_path(gain_path)?;
    if !bid_path.contains(&scenario.file_tag()) {
        warnln!(
            logger,
            LogEvent::Scenario,
            "Bid table '{}' does not carry the scenario tag {}",
            bid_path,
            scenario.file_tag()
        );
    }

    let gains = load_gain_table(
        &read_table(Path::new(gain_path))?,
        scenario.num_mue,
        scenario.num_fue,
    )?;

    let records = load_bid_table(&read_table(Path::new(bid_path))?)?;
    if records.len() != scenario.num_fue {
        return Err(format!(
            "Bid table '{}' has {} requester rows, scenario declares {}",
            bid_path,
            records.len(),
            scenario.num_fue
        )
        .into());
    }

    for (fbs, members) in fbs_groups(&records) {
        logln!(
            logger,
            LogEvent::Allocation,
            "{}: cohort {} has {} requesters",
            scenario.gain_file_name(),
            fbs,
            members.len()
        );
    }

    let scores = score(&records, &gains, weights);
    let allocation = allocate(&scores, &gains);

    for pair in &allocation.pairs {
        logln!(
            logger,
            LogEvent::Allocation,
            "{} -> {} (gain {:.4}, quality {:.4})",
            records[pair.fue_index].fue_id,
            pair.mue,
            pair.gain,
            scores[pair.fue_index].quality
        );
    }

    Ok((scenario, allocation))
}

/// Run the whole batch sequentially, one scenario at a time.
///
/// Each scenario's assignment table is written before the next scenario
/// starts; a failed assignment write is logged and skipped (its gain still
/// enters the summary). The summary is written exactly once after every
/// scenario was attempted, and a summary write failure is fatal.
pub fn run_batch(config: &BatchConfig, logger: &mut Logger) -> Result<BatchSummary, Box<dyn Error>> {
    let pairs = config.enumerate()?;
    let total = pairs.len();
    let mut summary = BatchSummary::new();

    for (index, (gain_path, bid_path)) in pairs.iter().enumerate() {
        let (scenario, allocation) = run_scenario(gain_path, bid_path, &config.weights, logger)?;

        logln!(
            logger,
            LogEvent::Scenario,
            "[{}/{}] {}: assigned {}/{}, total channel gain {:.4}",
            index + 1,
            total,
            scenario.gain_file_name(),
            allocation.pairs.len(),
            scenario.num_fue,
            allocation.total_gain
        );

        match output::write_assignments(&config.output_dir, &scenario, &allocation) {
            Ok(path) => {
                logln!(
                    logger,
                    LogEvent::Allocation,
                    "Wrote {}",
                    path.display()
                );
            }
            Err(e) => {
                // The scenario's gain still enters the summary; only its
                // per-row table is lost.
                errln!(
                    logger,
                    LogEvent::Scenario,
                    "Failed to write {}: {}",
                    scenario.output_file_name(),
                    e
                );
            }
        }

        summary.push(scenario.gain_file_name(), allocation.total_gain);
    }

    let summary_path = summary.write(&config.summary_dir, &config.weights)?;
    logln!(
        logger,
        LogEvent::Batch,
        "Processed {} scenarios, summary written to {}",
        summary.len(),
        summary_path.display()
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::{read_table, write_table};
    use std::path::PathBuf;

    fn temp_root(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("medina_batch_{}_{}", name, std::process::id()))
    }

    fn write_gain_table(path: &Path, rows: &[&[f64]]) {
        let num_mue = rows[0].len();
        let mut header = vec!["FUE".to_string()];
        header.extend((1..=num_mue).map(|m| format!("MUE_{}", m)));
        let rows: Vec<Vec<String>> = rows
            .iter()
            .enumerate()
            .map(|(i, gains)| {
                let mut row = vec![(i + 1).to_string()];
                row.extend(gains.iter().map(|g| g.to_string()));
                row
            })
            .collect();
        write_table(path, &header, &rows).unwrap();
    }

    fn write_bid_table(path: &Path, bids: &[f64]) {
        let header = vec!["FUE_ID".to_string(), "FBS".to_string(), "Bid".to_string()];
        let rows: Vec<Vec<String>> = bids
            .iter()
            .enumerate()
            .map(|(i, bid)| {
                vec![
                    format!("FUE_{}", i + 1),
                    format!("FBS_{}", i % 2 + 1),
                    bid.to_string(),
                ]
            })
            .collect();
        write_table(path, &header, &rows).unwrap();
    }

    fn config(root: &Path, trials: usize) -> BatchConfig {
        BatchConfig {
            gain_prefixes: vec![root.join("Te_matrices/Te_1210").display().to_string()],
            bid_prefixes: vec![root
                .join("FUE_Bid_Files/FUE_database_1210")
                .display()
                .to_string()],
            trials,
            output_dir: root.join("winnerSelection"),
            summary_dir: root.join("FinalWinnerSelection"),
            weights: Weights::new(0.30, 1.0, 2).unwrap(),
        }
    }

    // 12 channels for 10 requesters, distinct gains so the allocation is
    // easy to reason about
    fn seed_corpus(root: &Path, trials: usize) {
        for trial in 1..=trials {
            let gain_rows: Vec<Vec<f64>> = (0..10)
                .map(|fue| (0..12).map(|mue| ((fue * 12 + mue) % 29) as f64 + 0.5).collect())
                .collect();
            let gain_refs: Vec<&[f64]> = gain_rows.iter().map(|r| r.as_slice()).collect();
            write_gain_table(
                &root.join(format!("Te_matrices/Te_1210_{}.csv", trial)),
                &gain_refs,
            );
            let bids: Vec<f64> = (0..10).map(|i| (i + 1) as f64).collect();
            write_bid_table(
                &root.join(format!("FUE_Bid_Files/FUE_database_1210_{}.csv", trial)),
                &bids,
            );
        }
    }

    #[test]
    fn test_enumerate_orders_trials_within_prefix() {
        let config = BatchConfig {
            gain_prefixes: vec!["a/Te_1210".to_string(), "a/Te_1216".to_string()],
            bid_prefixes: vec!["b/FUE_database_1210".to_string(), "b/FUE_database_1216".to_string()],
            trials: 2,
            output_dir: PathBuf::from("out"),
            summary_dir: PathBuf::from("out"),
            weights: Weights::standard(),
        };
        let pairs = config.enumerate().unwrap();
        assert_eq!(pairs.len(), 4);
        assert_eq!(pairs[0].0, "a/Te_1210_1.csv");
        assert_eq!(pairs[1].0, "a/Te_1210_2.csv");
        assert_eq!(pairs[2].0, "a/Te_1216_1.csv");
        assert_eq!(pairs[3].1, "b/FUE_database_1216_2.csv");
    }

    #[test]
    fn test_enumerate_rejects_mismatched_prefix_lists() {
        let mut config = config(Path::new("x"), 1);
        config.bid_prefixes.clear();
        assert!(config.enumerate().is_err());
    }

    #[test]
    fn test_batch_writes_outputs_and_summary() {
        let root = temp_root("happy");
        seed_corpus(&root, 2);
        let config = config(&root, 2);

        let mut logger = Logger::new();
        let summary = run_batch(&config, &mut logger).unwrap();

        assert_eq!(summary.len(), 2);
        assert_eq!(summary.entries()[0].0, "Te_1210_1.csv");

        // Feasible scenario: all 10 requesters assigned
        let assignments =
            read_table(&config.output_dir.join("output_1210_1.csv")).unwrap();
        assert_eq!(assignments.rows.len(), 10);

        let written = read_table(
            &config
                .summary_dir
                .join("alpha0.30_beta0.70OptimalGains.csv"),
        )
        .unwrap();
        assert_eq!(written.rows.len(), 2);

        // Identical inputs per trial mean identical totals
        assert_eq!(summary.entries()[0].1, summary.entries()[1].1);
    }

    #[test]
    fn test_missing_input_aborts_batch() {
        let root = temp_root("missing");
        seed_corpus(&root, 1);
        let config = config(&root, 2); // trial 2 does not exist

        let mut logger = Logger::new();
        let result = run_batch(&config, &mut logger);
        assert!(result.is_err());
        // No summary: the batch aborted before the end of the loop
        assert!(!config
            .summary_dir
            .join("alpha0.30_beta0.70OptimalGains.csv")
            .exists());
    }

    #[test]
    fn test_size_mismatch_aborts_batch() {
        let root = temp_root("mismatch");
        // Gain table declares 12 channels in the name but carries 3
        write_gain_table(
            &root.join("Te_matrices/Te_1210_1.csv"),
            &[&[1.0, 2.0, 3.0]],
        );
        write_bid_table(
            &root.join("FUE_Bid_Files/FUE_database_1210_1.csv"),
            &[1.0],
        );

        let mut logger = Logger::new();
        assert!(run_batch(&config(&root, 1), &mut logger).is_err());
    }
}
