mod allocator;
mod batch;
mod bids;
mod charts;
mod gains;
mod logger;
mod output;
mod scenario;
mod scoring;
mod suites;
mod synth;
mod tables;
mod utils;

// Include suite files so their constructors run
mod s_pilot;
mod s_sweep;

use logger::{ConsoleReceiver, FileReceiver, LogEvent, Logger, sanitize_filename};
use s_sweep::{SWEEP_SIZES, SWEEP_TRIALS};
use scoring::Weights;
use std::path::{Path, PathBuf};
use suites::get_suite_catalog;

fn main() {
    let raw_args: Vec<String> = std::env::args().collect();

    // Parse and strip the weight override arguments
    let mut args = Vec::new();
    let mut skip_next = false;
    for (i, arg) in raw_args.iter().enumerate() {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg == "--alpha" || arg == "--multiplier" {
            let value = match raw_args.get(i + 1).and_then(|v| v.parse::<f64>().ok()) {
                Some(value) => value,
                None => {
                    eprintln!("Error: {} expects a numeric value.", arg);
                    std::process::exit(1);
                }
            };
            if arg == "--alpha" {
                utils::set_alpha_override(value);
            } else {
                utils::set_multiplier_override(value);
            }
            skip_next = true;
            continue;
        }
        args.push(arg.clone());
    }

    // Check if "charts" argument is provided
    if args.len() > 1 && args[1] == "charts" {
        let summary_path = match args.get(2) {
            Some(path) => PathBuf::from(path),
            None => {
                // Default to the summary the standard weights would have written
                let weights = match Weights::standard().with_overrides() {
                    Ok(weights) => weights,
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        std::process::exit(1);
                    }
                };
                Path::new("FinalWinnerSelection").join(weights.summary_file_name())
            }
        };
        match charts::generate_summary_charts(&summary_path) {
            Ok(()) => {
                println!("All chart generation completed successfully.");
            }
            Err(e) => {
                eprintln!("Error generating charts: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    // Check if "generate" argument is provided
    if args.len() > 1 && args[1] == "generate" {
        let root = PathBuf::from(args.get(2).map(|s| s.as_str()).unwrap_or("."));
        let trials = match args.get(3) {
            Some(value) => match value.parse::<usize>() {
                Ok(n) => n,
                Err(_) => {
                    eprintln!("Error: Invalid trial count '{}'. Expected a number.", value);
                    std::process::exit(1);
                }
            },
            None => SWEEP_TRIALS,
        };
        match synth::generate_corpus(&root, &SWEEP_SIZES, trials, &synth::SynthParams::standard()) {
            Ok(()) => {
                println!(
                    "Generated {} size mixes x {} trials under {}",
                    SWEEP_SIZES.len(),
                    trials,
                    root.display()
                );
            }
            Err(e) => {
                eprintln!("Error generating corpus: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    if args.len() > 1 {
        let suite_arg = &args[1];

        // Get all suites from the catalog
        let all_suites = get_suite_catalog();

        // Filter suites: if "all", use all suites; otherwise filter to the named suite
        let suites: Vec<_> = if suite_arg == "all" {
            all_suites.clone()
        } else {
            let found = all_suites.iter().find(|s| s.short_name == suite_arg);
            match found {
                Some(suite) => vec![suite.clone()],
                None => {
                    eprintln!("Error: Suite '{}' not found.", suite_arg);
                    eprintln!("Available suites:");
                    for s in &all_suites {
                        eprintln!("  - {}: {}", s.short_name, s.description);
                    }
                    std::process::exit(1);
                }
            }
        };

        // Set up logger with console and summary file receivers
        // When running a specific suite, also show per-scenario progress
        let mut logger = Logger::new();
        if suite_arg == "all" {
            logger.add_receiver(ConsoleReceiver::new(vec![LogEvent::Validation]));
        } else {
            logger.add_receiver(ConsoleReceiver::new(vec![
                LogEvent::Validation,
                LogEvent::Scenario,
            ]));
        }
        let summary_receiver_id = logger.add_receiver(FileReceiver::new(
            &PathBuf::from("log/summary.log"),
            vec![LogEvent::Validation],
        ));

        let mut any_failed = false;
        for suite in &suites {
            log!(&mut logger, LogEvent::Validation, "{}: ", suite.short_name);

            // Add suite-level receiver for the detailed scenario trace
            let suite_receiver_id = logger.add_receiver(FileReceiver::new(
                &PathBuf::from(format!(
                    "log/{}/suite.log",
                    sanitize_filename(suite.short_name)
                )),
                vec![LogEvent::Scenario, LogEvent::Batch],
            ));

            match (suite.run)(suite.short_name, &mut logger) {
                Ok(()) => {
                    logln!(&mut logger, LogEvent::Validation, "✓ PASSED");
                }
                Err(e) => {
                    any_failed = true;
                    logln!(&mut logger, LogEvent::Validation, "✗ FAILED: {}", e);
                }
            }
            let _ = logger.flush();

            logger.remove_receiver(suite_receiver_id);
        }

        logger.remove_receiver(summary_receiver_id);

        if any_failed {
            std::process::exit(1);
        }
    } else {
        // Default behavior: run the pilot suite with scenario-level output
        let mut logger = Logger::new();
        logger.add_receiver(ConsoleReceiver::new(vec![
            LogEvent::Scenario,
            LogEvent::Batch,
            LogEvent::Validation,
        ]));
        if let Err(e) = s_pilot::run("pilot", &mut logger) {
            eprintln!("Error running pilot suite: {}", e);
            std::process::exit(1);
        }
    }
}
