use rand_distr::LogNormal;
use std::sync::atomic::{AtomicU64, Ordering};

/// Base seed for the current batch run, mixed into every generator stream.
/// Set once before a run (e.g. from an iteration counter) to get a fresh
/// but reproducible synthetic corpus.
pub static RAND_SEED: AtomicU64 = AtomicU64::new(0);

/// Derive a seed for one generator stream from the batch base seed
pub fn get_seed(stream: u64) -> u64 {
    RAND_SEED
        .load(Ordering::Relaxed)
        .wrapping_mul(0x9e3779b97f4a7c15)
        .wrapping_add(stream)
}

// CLI overrides for the quality weights. f64 bits stored in atomics,
// u64::MAX (a NaN pattern) meaning "not set".
static ALPHA_OVERRIDE: AtomicU64 = AtomicU64::new(u64::MAX);
static MULTIPLIER_OVERRIDE: AtomicU64 = AtomicU64::new(u64::MAX);

const OVERRIDE_UNSET: u64 = u64::MAX;

/// Set the --alpha override for this process
pub fn set_alpha_override(alpha: f64) {
    ALPHA_OVERRIDE.store(alpha.to_bits(), Ordering::Relaxed);
}

/// Get the --alpha override, if one was given on the command line
pub fn alpha_override() -> Option<f64> {
    match ALPHA_OVERRIDE.load(Ordering::Relaxed) {
        OVERRIDE_UNSET => None,
        bits => Some(f64::from_bits(bits)),
    }
}

/// Set the --multiplier override for this process
pub fn set_multiplier_override(multiplier: f64) {
    MULTIPLIER_OVERRIDE.store(multiplier.to_bits(), Ordering::Relaxed);
}

/// Get the --multiplier override, if one was given on the command line
pub fn multiplier_override() -> Option<f64> {
    match MULTIPLIER_OVERRIDE.load(Ordering::Relaxed) {
        OVERRIDE_UNSET => None,
        bits => Some(f64::from_bits(bits)),
    }
}

/// Convert mean and standard deviation to log-normal distribution parameters
/// Returns (μ, σ) for LogNormal(μ, σ) that approximates the given mean and stddev
///
/// For LogNormal(μ, σ):
/// - E[X] = exp(μ + σ²/2)
/// - Var[X] = (exp(σ²) - 1) * exp(2μ + σ²)
///
/// To convert from mean (m) and stddev (s):
/// - σ = sqrt(ln(1 + s²/m²))
/// - μ = ln(m) - σ²/2
fn lognormal_from_mean_stddev(mean: f64, stddev: f64) -> (f64, f64) {
    let variance = stddev * stddev;
    let sigma_squared = (1.0 + variance / (mean * mean)).ln();
    let sigma = sigma_squared.sqrt();
    let mu = mean.ln() - sigma_squared / 2.0;
    (mu, sigma)
}

/// Create a log-normal distribution from mean and standard deviation
/// This is a convenience wrapper that converts mean/stddev to log-normal parameters
pub fn lognormal_dist(mean: f64, stddev: f64) -> LogNormal<f64> {
    let (mu, sigma) = lognormal_from_mean_stddev(mean, stddev);
    LogNormal::new(mu, sigma).unwrap()
}
