use crate::gains::RankedGains;
use crate::scoring::ScoreRecord;
use std::cmp::Ordering;
use std::collections::HashSet;

/// One realized pairing of a requester with a channel
#[derive(Debug, Clone, PartialEq)]
pub struct AssignedPair {
    /// 0-based requester index (bid-table row order)
    pub fue_index: usize,
    /// Channel id taken from the gain-table header
    pub mue: String,
    /// Raw channel gain between this requester and this channel
    pub gain: f64,
}

/// Result of one scenario's allocation.
///
/// Invariants: every channel id appears at most once; every requester
/// appears at most once; `pairs` is ordered by requester index ascending;
/// `total_gain` is the sum of the raw gains of the realized pairs only.
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    pub pairs: Vec<AssignedPair>,
    pub total_gain: f64,
}

/// Greedily assign each requester its best still-free channel.
///
/// Requesters are visited in quality order, highest first; equal scores
/// keep bid-table row order (stable sort). Each requester takes the first
/// unclaimed channel of its descending gain ranking. A requester whose
/// whole ranking is already claimed, or whose ranking is empty, gets no
/// assignment and contributes nothing to the total; that is the expected
/// outcome once requesters outnumber channels, not an error.
///
/// The procedure does not backtrack and carries no randomness, so a fixed
/// input always produces the same allocation.
pub fn allocate(scores: &[ScoreRecord], gains: &RankedGains) -> Allocation {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| {
        scores[b]
            .quality
            .partial_cmp(&scores[a].quality)
            .unwrap_or(Ordering::Equal)
    });

    let mut claimed: HashSet<&str> = HashSet::new();
    let mut pairs = Vec::new();
    for &fue_index in &order {
        for (mue, gain) in &gains.per_fue[fue_index] {
            if claimed.insert(mue.as_str()) {
                pairs.push(AssignedPair {
                    fue_index,
                    mue: mue.clone(),
                    gain: *gain,
                });
                break;
            }
        }
    }

    pairs.sort_by_key(|pair| pair.fue_index);
    let total_gain = pairs.iter().map(|pair| pair.gain).sum();

    Allocation { pairs, total_gain }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked(lists: &[&[(&str, f64)]]) -> RankedGains {
        RankedGains {
            per_fue: lists
                .iter()
                .map(|list| {
                    list.iter()
                        .map(|(mue, gain)| (mue.to_string(), *gain))
                        .collect()
                })
                .collect(),
        }
    }

    fn scores(qualities: &[f64]) -> Vec<ScoreRecord> {
        qualities
            .iter()
            .map(|&quality| ScoreRecord {
                average_gain: 0.0,
                quality,
            })
            .collect()
    }

    #[test]
    fn test_two_by_two_tie_broken_by_row_order() {
        // Equal qualities: requester 1 goes first, takes R2 (its best, gain 9);
        // requester 2 then takes R1 (gain 7). Total 16.
        let gains = ranked(&[
            &[("R2", 9.0), ("R1", 5.0)],
            &[("R1", 7.0), ("R2", 3.0)],
        ]);
        let allocation = allocate(&scores(&[5.0, 5.0]), &gains);

        assert_eq!(allocation.pairs.len(), 2);
        assert_eq!(allocation.pairs[0].fue_index, 0);
        assert_eq!(allocation.pairs[0].mue, "R2");
        assert_eq!(allocation.pairs[1].fue_index, 1);
        assert_eq!(allocation.pairs[1].mue, "R1");
        assert_eq!(allocation.total_gain, 16.0);
    }

    #[test]
    fn test_higher_quality_claims_first() {
        // Requester 2 outranks requester 1 and steals the shared best channel
        let gains = ranked(&[
            &[("R1", 9.0), ("R2", 1.0)],
            &[("R1", 8.0), ("R2", 2.0)],
        ]);
        let allocation = allocate(&scores(&[1.0, 2.0]), &gains);

        assert_eq!(allocation.pairs[0].fue_index, 0);
        assert_eq!(allocation.pairs[0].mue, "R2");
        assert_eq!(allocation.pairs[1].fue_index, 1);
        assert_eq!(allocation.pairs[1].mue, "R1");
        assert_eq!(allocation.total_gain, 9.0);
    }

    #[test]
    fn test_exhaustion_leaves_lowest_quality_unassigned() {
        // 3 requesters, 2 channels: the lowest-quality requester goes last
        // and finds everything claimed.
        let gains = ranked(&[
            &[("R1", 4.0), ("R2", 2.0)],
            &[("R1", 3.0), ("R2", 5.0)],
            &[("R2", 6.0), ("R1", 1.0)],
        ]);
        let allocation = allocate(&scores(&[9.0, 8.0, 1.0]), &gains);

        assert_eq!(allocation.pairs.len(), 2);
        assert!(allocation.pairs.iter().all(|pair| pair.fue_index != 2));
        assert_eq!(allocation.total_gain, 4.0 + 5.0);
    }

    #[test]
    fn test_bijective_over_channels() {
        let gains = ranked(&[
            &[("R1", 3.0), ("R2", 2.0), ("R3", 1.0)],
            &[("R1", 3.0), ("R2", 2.0), ("R3", 1.0)],
            &[("R1", 3.0), ("R2", 2.0), ("R3", 1.0)],
        ]);
        let allocation = allocate(&scores(&[1.0, 2.0, 3.0]), &gains);

        let mut seen = HashSet::new();
        for pair in &allocation.pairs {
            assert!(seen.insert(pair.mue.clone()), "channel {} assigned twice", pair.mue);
        }
        assert_eq!(allocation.pairs.len(), 3);
    }

    #[test]
    fn test_feasible_when_channels_cover_requesters() {
        // 2 requesters, 3 channels: nobody is left out
        let gains = ranked(&[
            &[("R1", 1.0), ("R2", 1.0), ("R3", 1.0)],
            &[("R1", 1.0), ("R2", 1.0), ("R3", 1.0)],
        ]);
        let allocation = allocate(&scores(&[1.0, 1.0]), &gains);
        assert_eq!(allocation.pairs.len(), 2);
    }

    #[test]
    fn test_empty_ranking_never_assigns() {
        let gains = ranked(&[&[], &[("R1", 2.0)]]);
        let allocation = allocate(&scores(&[9.0, 1.0]), &gains);
        assert_eq!(allocation.pairs.len(), 1);
        assert_eq!(allocation.pairs[0].fue_index, 1);
    }

    #[test]
    fn test_total_sums_raw_gains_only() {
        let gains = ranked(&[&[("R1", 2.5)], &[("R1", 10.0), ("R2", 0.5)]]);
        let allocation = allocate(&scores(&[7.0, 3.0]), &gains);
        // Requester 1 takes R1 at its raw gain, requester 2 falls back to R2
        assert_eq!(allocation.total_gain, 2.5 + 0.5);
    }

    #[test]
    fn test_formula_tie_breaks_by_row_order() {
        use crate::bids::FueRecord;
        use crate::scoring::{score, Weights};

        // Equal bids and equal average gains give a bit-exact quality tie
        let gains = ranked(&[
            &[("R1", 9.0), ("R2", 5.0)],
            &[("R1", 7.0), ("R2", 7.0)],
        ]);
        let records: Vec<FueRecord> = (1..=2)
            .map(|i| FueRecord {
                fue_id: format!("FUE_{}", i),
                owner: i as u32,
                fbs: "FBS_1".to_string(),
                bid: 4.0,
            })
            .collect();
        let weights = Weights::new(0.30, 1.0, 2).unwrap();
        let quality = score(&records, &gains, &weights);
        assert_eq!(quality[0].quality, quality[1].quality);

        let allocation = allocate(&quality, &gains);
        assert_eq!(allocation.pairs[0].mue, "R1");
        assert_eq!(allocation.pairs[1].mue, "R2");
        assert_eq!(allocation.total_gain, 16.0);
    }

    #[test]
    fn test_deterministic_on_repeat() {
        let gains = ranked(&[
            &[("R2", 9.0), ("R1", 5.0)],
            &[("R1", 7.0), ("R2", 3.0)],
        ]);
        let quality = scores(&[5.0, 5.0]);
        let first = allocate(&quality, &gains);
        let second = allocate(&quality, &gains);
        assert_eq!(first, second);
    }
}
