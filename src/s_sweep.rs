/// Production sweep over the measurement corpus: 36 MUE channels against
/// requester populations growing from 48 to 120, 500 trials per mix.
///
/// Expects the `Te_matrices/` and `FUE_Bid_Files/` corpus in the working
/// directory (the `generate` subcommand can synthesize one).
use crate::batch::{run_batch, BatchConfig};
use crate::logger::{LogEvent, Logger};
use crate::scoring::Weights;
use crate::{errln, logln};
use std::error::Error;
use std::path::PathBuf;

/// The (MUE count, FUE count) mixes of the sweep corpus
pub const SWEEP_SIZES: [(usize, usize); 13] = [
    (36, 48),
    (36, 54),
    (36, 60),
    (36, 66),
    (36, 72),
    (36, 78),
    (36, 84),
    (36, 90),
    (36, 96),
    (36, 102),
    (36, 108),
    (36, 114),
    (36, 120),
];

/// Trials per size mix
pub const SWEEP_TRIALS: usize = 500;

fn config() -> Result<BatchConfig, Box<dyn Error>> {
    let gain_prefixes = SWEEP_SIZES
        .iter()
        .map(|(mue, fue)| format!("Te_matrices/Te_{}{}", mue, fue))
        .collect();
    let bid_prefixes = SWEEP_SIZES
        .iter()
        .map(|(mue, fue)| format!("FUE_Bid_Files/FUE_database_{}{}", mue, fue))
        .collect();

    Ok(BatchConfig {
        gain_prefixes,
        bid_prefixes,
        trials: SWEEP_TRIALS,
        output_dir: PathBuf::from("winnerSelection"),
        summary_dir: PathBuf::from("FinalWinnerSelection"),
        weights: Weights::standard().with_overrides()?,
    })
}

pub fn run(suite_name: &str, logger: &mut Logger) -> Result<(), Box<dyn Error>> {
    let config = config()?;
    let summary = run_batch(&config, logger)?;

    logln!(logger, LogEvent::Scenario, "");
    let mut errors: Vec<String> = Vec::new();

    // Check: one summary entry per enumerated scenario
    let expected = SWEEP_SIZES.len() * SWEEP_TRIALS;
    let msg = format!(
        "Summary covers every scenario: {} of {}",
        summary.len(),
        expected
    );
    if summary.len() == expected {
        logln!(logger, LogEvent::Scenario, "✓ {}", msg);
    } else {
        errors.push(msg.clone());
        errln!(logger, LogEvent::Scenario, "✗ {}", msg);
    }

    // Check: every total gain is a usable number
    let bad_gains = summary
        .entries()
        .iter()
        .filter(|(_, gain)| !gain.is_finite() || *gain < 0.0)
        .count();
    let msg = format!("All total gains are finite and non-negative ({} bad)", bad_gains);
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
    short_name: "sweep",
    description: "Full winner-selection sweep: 36 channels, 48-120 requesters, 500 trials per mix, over the on-disk corpus",
    run,
});
