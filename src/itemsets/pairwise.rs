use std::collections::HashMap;

use log::debug;
use rayon::prelude::*;

use crate::{
    bitset::Bitset,
    config::PairwiseConfig,
    dataset::Dataset,
    error::MiningError,
    index::build_index,
    pattern::{rank_patterns, Pattern},
    types::TransactionId,
};

type CandidateCounts = HashMap<Bitset, u64>;

/// Exact miner: every pairwise intersection of sessions is a candidate,
/// validated afterwards by a full scan.
pub fn mine_pairwise(
    dataset: &Dataset,
    min_support_fraction: f64,
    min_pattern_bits: usize,
) -> Result<Vec<Pattern>, MiningError> {
    mine_pairwise_with(
        dataset,
        &PairwiseConfig {
            min_support_fraction,
            min_pattern_bits,
            ..PairwiseConfig::default()
        },
    )
}

pub fn mine_pairwise_with(dataset: &Dataset, config: &PairwiseConfig) -> Result<Vec<Pattern>, MiningError> {
    config.validate()?;

    let (index, _) = build_index(dataset)?;
    let num_sessions = dataset.len();
    if num_sessions < 2 {
        return Ok(vec![]);
    }

    let bitsets: Vec<Bitset> = dataset.iter().map(|t| index.bitset_of(t)).collect();

    let candidates = if config.parallel {
        count_candidates_par(&bitsets, config.min_pattern_bits)
    } else {
        count_candidates(&bitsets, config.min_pattern_bits)
    };
    debug!(
        "{} distinct candidates from {} session pairs",
        candidates.len(),
        num_sessions * (num_sessions - 1) / 2
    );

    let min_count = min_support_count(num_sessions, config.min_support_fraction);
    let validate = |candidate: &Bitset| -> Option<Pattern> {
        let matched: Vec<TransactionId> = bitsets
            .iter()
            .enumerate()
            .filter(|(_, bits)| candidate.is_subset_of(bits))
            .map(|(id, _)| id)
            .collect();
        if matched.len() >= min_count {
            Some(Pattern::from_matches(index.items_of(candidate), matched, num_sessions))
        } else {
            None
        }
    };

    let mut patterns: Vec<Pattern> = if config.parallel {
        candidates.par_iter().filter_map(|(c, _)| validate(c)).collect()
    } else {
        candidates.keys().filter_map(validate).collect()
    };
    rank_patterns(&mut patterns);

    debug!(
        "{} patterns reach {} sessions",
        patterns.len(),
        min_count
    );
    Ok(patterns)
}

/// `ceil(fraction * N)` clamped to `[1, N]`.
fn min_support_count(num_sessions: usize, fraction: f64) -> usize {
    let count = (fraction * num_sessions as f64).ceil() as usize;
    count.max(1).min(num_sessions)
}

fn accumulate(counts: &mut CandidateCounts, bitsets: &[Bitset], i: usize, min_pattern_bits: usize) {
    let left = &bitsets[i];
    for right in &bitsets[i + 1..] {
        let shared = left.intersection_count(right);
        if shared == 0 || shared < min_pattern_bits {
            continue;
        }
        *counts.entry(left & right).or_insert(0) += 1;
    }
}

fn count_candidates(bitsets: &[Bitset], min_pattern_bits: usize) -> CandidateCounts {
    let mut counts = HashMap::new();
    for i in 0..bitsets.len() {
        accumulate(&mut counts, bitsets, i, min_pattern_bits);
    }
    counts
}

/// Each worker fills its own map over a slice of the outer loop, then the
/// maps are summed.
fn count_candidates_par(bitsets: &[Bitset], min_pattern_bits: usize) -> CandidateCounts {
    (0..bitsets.len())
        .into_par_iter()
        .fold(HashMap::new, |mut counts, i| {
            accumulate(&mut counts, bitsets, i, min_pattern_bits);
            counts
        })
        .reduce(HashMap::new, |mut merged, counts| {
            for (bits, count) in counts {
                *merged.entry(bits).or_insert(0) += count;
            }
            merged
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{generate, pattern::support_count, types::Item};
    use proptest::prelude::*;

    #[test]
    fn shared_pair_across_three_sessions() {
        let dataset = dataset![[1, 2, 3], [2, 3], [2, 3, 4]];
        let patterns = mine_pairwise(&dataset, 0.6, 1).unwrap();
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].items(), &[2, 3]);
        assert_eq!(patterns[0].support_count(), 3);
        assert_eq!(patterns[0].matched_transactions(), &[0, 1, 2]);
    }

    #[test]
    fn pair_counts_accumulate_by_bit_pattern() {
        let bitsets: Vec<Bitset> = {
            let dataset = dataset![[1, 2, 3], [2, 3], [2, 3, 4]];
            let (index, _) = build_index(&dataset).unwrap();
            dataset.iter().map(|t| index.bitset_of(t)).collect()
        };
        let counts = count_candidates(&bitsets, 1);
        assert_eq!(counts.len(), 1);
        assert_eq!(counts.values().copied().collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn toy_dataset_ranking() {
        let dataset = generate::toy();
        let patterns = mine_pairwise(&dataset, 0.2, 3).unwrap();
        assert_eq!(patterns[0].items(), &[2, 3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(patterns[0].support_count(), 6);
        assert_eq!(patterns[1].items(), &[2, 3, 4, 5, 7, 8, 9]);
        assert_eq!(patterns[1].support_count(), 8);
        // seen in only two sessions, below ceil(0.2 * 22)
        assert!(patterns.iter().all(|p| p.items() != [1, 2, 3, 4, 5, 7, 8, 9]));
        assert!(patterns.iter().all(|p| p.len() >= 3 && p.support_count() >= 5));
    }

    #[test]
    fn parallel_scan_matches_sequential() {
        let dataset = generate::random(40, 30, generate::DEFAULT_SEED);
        let sequential = mine_pairwise(&dataset, 0.3, 3).unwrap();
        let parallel = mine_pairwise_with(
            &dataset,
            &PairwiseConfig {
                min_support_fraction: 0.3,
                min_pattern_bits: 3,
                parallel: true,
            },
        )
        .unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn single_session_yields_nothing() {
        let dataset = dataset![[1, 2, 3]];
        assert!(mine_pairwise(&dataset, 0.0, 1).unwrap().is_empty());
    }

    #[test]
    fn errors_surface() {
        assert!(matches!(
            mine_pairwise(&dataset![[1, 2], [1, 2]], 0.5, 1),
            Err(MiningError::InsufficientVocabulary { distinct: 2 })
        ));
        assert!(matches!(
            mine_pairwise(&generate::toy(), 2.0, 1),
            Err(MiningError::InvalidThreshold { .. })
        ));
    }

    #[test]
    fn support_threshold_is_clamped() {
        assert_eq!(min_support_count(3, 0.6), 2);
        assert_eq!(min_support_count(10, 0.0), 1);
        assert_eq!(min_support_count(10, 1.0), 10);
    }

    proptest! {
        #[test]
        fn recorded_support_matches_full_scan(
            rows in prop::collection::vec(prop::collection::vec(0u64..8, 0..6), 2..14),
            fraction in 0.0f64..=1.0,
            min_bits in 1usize..4,
        ) {
            let dataset = Dataset::from_rows(rows);
            if let Ok(patterns) = mine_pairwise(&dataset, fraction, min_bits) {
                for pattern in &patterns {
                    let items: Vec<Item> = pattern.items().to_vec();
                    prop_assert_eq!(pattern.support_count(), support_count(&dataset, &items));
                    prop_assert!(pattern.len() >= min_bits);
                }
                prop_assert!(patterns.windows(2).all(|w| w[0].len() >= w[1].len()));
            }
        }
    }
}
