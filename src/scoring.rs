use crate::bids::FueRecord;
use crate::gains::RankedGains;
use crate::utils;
use std::error::Error;

/// Weights of the quality formula, fixed for a whole batch run.
///
/// quality = alpha * bid * bid_multiplier + beta * average_gain
///
/// where beta is (1 - alpha) rounded at `precision` decimals, matching how
/// the summary file is named.
#[derive(Debug, Clone, Copy)]
pub struct Weights {
    /// Weight on the monetary bid, in [0, 1]
    pub alpha: f64,
    /// Scalar applied to the bid before weighting
    pub bid_multiplier: f64,
    /// Decimal places used for beta rounding and weight formatting
    pub precision: u32,
}

impl Weights {
    pub fn new(alpha: f64, bid_multiplier: f64, precision: u32) -> Result<Self, Box<dyn Error>> {
        if !(0.0..=1.0).contains(&alpha) {
            return Err(format!("alpha must be in [0, 1], got {}", alpha).into());
        }
        if !bid_multiplier.is_finite() {
            return Err(format!("bid multiplier must be finite, got {}", bid_multiplier).into());
        }
        Ok(Self {
            alpha,
            bid_multiplier,
            precision,
        })
    }

    /// The batch defaults: alpha 0.30, unit multiplier, two decimals
    pub fn standard() -> Self {
        Self {
            alpha: 0.30,
            bid_multiplier: 1.0,
            precision: 2,
        }
    }

    /// Apply --alpha / --multiplier command-line overrides, if any were given
    pub fn with_overrides(mut self) -> Result<Self, Box<dyn Error>> {
        if let Some(alpha) = utils::alpha_override() {
            if !(0.0..=1.0).contains(&alpha) {
                return Err(format!("--alpha must be in [0, 1], got {}", alpha).into());
            }
            self.alpha = alpha;
        }
        if let Some(multiplier) = utils::multiplier_override() {
            self.bid_multiplier = multiplier;
        }
        Ok(self)
    }

    /// Weight on the average gain: (1 - alpha) rounded at `precision` decimals
    pub fn beta(&self) -> f64 {
        let scale = 10f64.powi(self.precision as i32);
        ((1.0 - self.alpha) * scale).round() / scale
    }

    /// Name of the batch summary file, carrying both weights
    pub fn summary_file_name(&self) -> String {
        let digits = self.precision as usize;
        format!(
            "alpha{:.digits$}_beta{:.digits$}OptimalGains.csv",
            self.alpha,
            self.beta(),
        )
    }
}

/// Derived per-requester scoring values, held parallel to the loaded bid
/// rows so the load and score phases stay decoupled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreRecord {
    pub average_gain: f64,
    pub quality: f64,
}

/// Compute the quality score of every requester.
///
/// The returned vector is index-parallel to `records`; `gains` must cover
/// the same requesters in the same order.
pub fn score(records: &[FueRecord], gains: &RankedGains, weights: &Weights) -> Vec<ScoreRecord> {
    let beta = weights.beta();
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let average_gain = gains.average_gain(index);
            let quality =
                weights.alpha * record.bid * weights.bid_multiplier + beta * average_gain;
            ScoreRecord {
                average_gain,
                quality,
            }
        })
        .collect()
}
