/// Self-contained pilot suite: synthesizes a small corpus, runs the batch
/// over it, and validates the allocation invariants end to end.
///
/// Two size mixes are used on purpose:
///
/// - 12 channels / 10 requesters: feasible, every requester must win one
/// - 12 channels / 16 requesters: scarce, exactly 12 can win
use crate::batch::{run_batch, BatchConfig};
use crate::logger::{LogEvent, Logger};
use crate::scoring::Weights;
use crate::synth::{generate_corpus, SynthParams};
use crate::tables::read_table;
use crate::{errln, logln};
use std::collections::HashSet;
use std::error::Error;
use std::path::{Path, PathBuf};

const PILOT_SIZES: [(usize, usize); 2] = [(12, 10), (12, 16)];
const PILOT_TRIALS: usize = 3;

fn config(root: &Path) -> Result<BatchConfig, Box<dyn Error>> {
    let gain_prefixes = PILOT_SIZES
        .iter()
        .map(|(mue, fue)| {
            root.join(format!("Te_matrices/Te_{}{}", mue, fue))
                .display()
                .to_string()
        })
        .collect();
    let bid_prefixes = PILOT_SIZES
        .iter()
        .map(|(mue, fue)| {
            root.join(format!("FUE_Bid_Files/FUE_database_{}{}", mue, fue))
                .display()
                .to_string()
        })
        .collect();

    Ok(BatchConfig {
        gain_prefixes,
        bid_prefixes,
        trials: PILOT_TRIALS,
        output_dir: root.join("winnerSelection"),
        summary_dir: root.join("FinalWinnerSelection"),
        weights: Weights::standard().with_overrides()?,
    })
}

pub fn run(suite_name: &str, logger: &mut Logger) -> Result<(), Box<dyn Error>> {
    let root = PathBuf::from("pilot_data");
    generate_corpus(&root, &PILOT_SIZES, PILOT_TRIALS, &SynthParams::standard())?;

    let config = config(&root)?;
    let summary = run_batch(&config, logger)?;

    logln!(logger, LogEvent::Scenario, "");
    let mut errors: Vec<String> = Vec::new();

    // Check: one summary entry per scenario
    let expected = PILOT_SIZES.len() * PILOT_TRIALS;
    let msg = format!("Summary covers every scenario: {} of {}", summary.len(), expected);
    if summary.len() == expected {
        logln!(logger, LogEvent::Scenario, "✓ {}", msg);
    } else {
        errors.push(msg.clone());
        errln!(logger, LogEvent::Scenario, "✗ {}", msg);
    }

    // Check the written assignment tables per size mix
    for &(num_mue, num_fue) in &PILOT_SIZES {
        // With 12 channels, either everyone wins (10 requesters) or the
        // channels run out (16 requesters)
        let expected_rows = num_fue.min(num_mue);
        for trial in 1..=PILOT_TRIALS {
            let path = config
                .output_dir
                .join(format!("output_{}{}_{}.csv", num_mue, num_fue, trial));
            let table = match read_table(&path) {
                Ok(table) => table,
                Err(e) => {
                    errors.push(format!("Missing assignment table: {}", e));
                    errln!(logger, LogEvent::Scenario, "✗ Missing assignment table: {}", e);
                    continue;
                }
            };

            let msg = format!(
                "output_{}{}_{}: {} assignments (expected {})",
                num_mue,
                num_fue,
                trial,
                table.rows.len(),
                expected_rows
            );
            if table.rows.len() == expected_rows {
                logln!(logger, LogEvent::Scenario, "✓ {}", msg);
            } else {
                errors.push(msg.clone());
                errln!(logger, LogEvent::Scenario, "✗ {}", msg);
            }

            // No channel may be handed out twice
            let mut channels = HashSet::new();
            let duplicated = table
                .rows
                .iter()
                .any(|row| !channels.insert(row[1].clone()));
            if duplicated {
                let msg = format!(
                    "output_{}{}_{}: a channel is assigned twice",
                    num_mue, num_fue, trial
                );
                errors.push(msg.clone());
                errln!(logger, LogEvent::Scenario, "✗ {}", msg);
            }
        }
    }

    // Check: gains are positive (log-normal draws are)
    let bad_gains = summary
        .entries()
        .iter()
        .filter(|(_, gain)| !gain.is_finite() || *gain <= 0.0)
        .count();
    let msg = format!("All total gains are positive ({} bad)", bad_gains);
    if bad_gains == 0 {
        logln!(logger, LogEvent::Scenario, "✓ {}", msg);
    } else {
        errors.push(msg.clone());
        errln!(logger, LogEvent::Scenario, "✗ {}", msg);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(format!("Suite '{}' validation failed:\n{}", suite_name, errors.join("\n")).into())
    }
}

// Register this suite in the catalog
inventory::submit!(crate::suites::SuiteEntry {
    short_name: "pilot",
    description: "Synthesizes a small corpus under pilot_data/ and validates feasibility, exhaustion and bijectivity of the resulting allocations",
    run,
});
