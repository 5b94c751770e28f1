use crate::tables::write_table;
use crate::utils::{get_seed, lognormal_dist};
use rand::{rngs::StdRng, SeedableRng};
use rand_distr::Distribution;
use std::error::Error;
use std::path::Path;

/// Distribution parameters for a synthetic input corpus.
///
/// Channel gains and bids are drawn from log-normal distributions, the
/// usual shape for both channel measurements and willingness-to-pay.
#[derive(Debug, Clone, Copy)]
pub struct SynthParams {
    /// Number of FBS cohorts requesters are spread over (round-robin)
    pub num_fbs: usize,
    pub gain_mean: f64,
    pub gain_stddev: f64,
    pub bid_mean: f64,
    pub bid_stddev: f64,
}

impl SynthParams {
    /// Corpus defaults: six cohorts, unit-scale gains, bids around 10
    pub fn standard() -> Self {
        Self {
            num_fbs: 6,
            gain_mean: 1.0,
            gain_stddev: 0.5,
            bid_mean: 10.0,
            bid_stddev: 3.0,
        }
    }
}

/// Mix a scenario identity into a seed stream so every (size, trial) file
/// is reproducible on its own
fn scenario_stream(salt: u64, num_mue: usize, num_fue: usize, trial: usize) -> u64 {
    salt.wrapping_add((num_mue as u64) << 40)
        .wrapping_add((num_fue as u64) << 20)
        .wrapping_add(trial as u64)
}

/// Write one scenario's gain table: identity column plus one `MUE_<m>`
/// column per channel, one row per requester
fn write_gain_table(
    path: &Path,
    num_mue: usize,
    num_fue: usize,
    trial: usize,
    params: &SynthParams,
) -> Result<(), Box<dyn Error>> {
    let dist = lognormal_dist(params.gain_mean, params.gain_stddev);
    let mut rng = StdRng::seed_from_u64(get_seed(scenario_stream(1991, num_mue, num_fue, trial)));

    let mut header = vec!["FUE".to_string()];
    header.extend((1..=num_mue).map(|m| format!("MUE_{}", m)));

    let mut rows = Vec::with_capacity(num_fue);
    for fue in 1..=num_fue {
        let mut row = Vec::with_capacity(num_mue + 1);
        row.push(fue.to_string());
        for _ in 0..num_mue {
            row.push(format!("{:.6}", Distribution::sample(&dist, &mut rng)));
        }
        rows.push(row);
    }

    write_table(path, &header, &rows)
        .map_err(|e| format!("Failed to write gain table '{}': {}", path.display(), e))?;
    Ok(())
}

/// Write one scenario's bid table: `FUE_ID,FBS,Bid`, requesters spread
/// round-robin over the FBS cohorts
fn write_bid_table(
    path: &Path,
    num_mue: usize,
    num_fue: usize,
    trial: usize,
    params: &SynthParams,
) -> Result<(), Box<dyn Error>> {
    let dist = lognormal_dist(params.bid_mean, params.bid_stddev);
    let mut rng = StdRng::seed_from_u64(get_seed(scenario_stream(2992, num_mue, num_fue, trial)));

    let header = vec!["FUE_ID".to_string(), "FBS".to_string(), "Bid".to_string()];
    let mut rows = Vec::with_capacity(num_fue);
    for fue in 1..=num_fue {
        rows.push(vec![
            format!("FUE_{}", fue),
            format!("FBS_{}", (fue - 1) % params.num_fbs + 1),
            format!("{:.4}", Distribution::sample(&dist, &mut rng)),
        ]);
    }

    write_table(path, &header, &rows)
        .map_err(|e| format!("Failed to write bid table '{}': {}", path.display(), e))?;
    Ok(())
}

/// Generate a full input corpus under `root`: `Te_matrices/` gain tables
/// and `FUE_Bid_Files/` bid tables for every size mix and trial
pub fn generate_corpus(
    root: &Path,
    sizes: &[(usize, usize)],
    trials: usize,
    params: &SynthParams,
) -> Result<(), Box<dyn Error>> {
    for &(num_mue, num_fue) in sizes {
        for trial in 1..=trials {
            write_gain_table(
                &root.join(format!("Te_matrices/Te_{}{}_{}.csv", num_mue, num_fue, trial)),
                num_mue,
                num_fue,
                trial,
                params,
            )?;
            write_bid_table(
                &root.join(format!(
                    "FUE_Bid_Files/FUE_database_{}{}_{}.csv",
                    num_mue, num_fue, trial
                )),
                num_mue,
                num_fue,
                trial,
                params,
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bids::load_bid_table;
    use crate::gains::load_gain_table;
    use crate::tables::read_table;
    use std::path::PathBuf;

    fn temp_root(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("medina_synth_{}_{}", name, std::process::id()))
    }

    #[test]
    fn test_generated_corpus_loads_cleanly() {
        let root = temp_root("loads");
        generate_corpus(&root, &[(12, 10)], 2, &SynthParams::standard()).unwrap();

        let gain_table = read_table(&root.join("Te_matrices/Te_1210_2.csv")).unwrap();
        let gains = load_gain_table(&gain_table, 12, 10).unwrap();
        assert_eq!(gains.num_fue(), 10);
        assert!(gains.per_fue.iter().all(|list| list.len() == 12));

        let bid_table = read_table(&root.join("FUE_Bid_Files/FUE_database_1210_2.csv")).unwrap();
        let records = load_bid_table(&bid_table).unwrap();
        assert_eq!(records.len(), 10);
        assert!(records.iter().all(|r| r.bid >= 0.0));
        // Round-robin cohorts: 10 requesters over 6 cohorts
        assert_eq!(records[0].fbs, "FBS_1");
        assert_eq!(records[6].fbs, "FBS_1");
    }

    #[test]
    fn test_generation_is_reproducible() {
        let root_a = temp_root("repro_a");
        let root_b = temp_root("repro_b");
        let params = SynthParams::standard();
        generate_corpus(&root_a, &[(12, 16)], 1, &params).unwrap();
        generate_corpus(&root_b, &[(12, 16)], 1, &params).unwrap();

        let a = std::fs::read_to_string(root_a.join("Te_matrices/Te_1216_1.csv")).unwrap();
        let b = std::fs::read_to_string(root_b.join("Te_matrices/Te_1216_1.csv")).unwrap();
        assert_eq!(a, b);
    }
}
