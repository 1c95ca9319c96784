use log::trace;

use crate::{
    config::validate_fraction,
    dataset::Dataset,
    error::MiningError,
    index::Histogram,
    pattern::Pattern,
    types::{Itemset, TransactionId},
};

/// Number of sessions a pattern must be found in, clamped to `[1, N]`.
pub fn min_sessions(num_sessions: usize, threshold: f64) -> usize {
    let rounded = (0.5 + num_sessions as f64 * threshold) as usize;
    rounded.max(1).min(num_sessions)
}

/// Grows one pattern by appending items in frequency order until the next
/// item would drop the match count below the threshold.
pub fn grow_pattern(
    dataset: &Dataset,
    histogram: &Histogram,
    threshold: f64,
) -> Result<Pattern, MiningError> {
    grow_pattern_traced(dataset, histogram, threshold).map(|(pattern, _)| pattern)
}

/// Like [`grow_pattern`], also returning the match count after every
/// accepted growth step.
pub fn grow_pattern_traced(
    dataset: &Dataset,
    histogram: &Histogram,
    threshold: f64,
) -> Result<(Pattern, Vec<usize>), MiningError> {
    validate_fraction("threshold", threshold)?;

    let num_sessions = dataset.len();
    if num_sessions == 0 {
        return Ok((Pattern::empty(0), vec![]));
    }
    let min_sessions = min_sessions(num_sessions, threshold);

    let mut items: Itemset = Vec::with_capacity(histogram.by_frequency().len());
    let mut matched: Vec<TransactionId> = (0..num_sessions).collect();
    let mut trace = Vec::new();

    for &(item, _) in histogram.by_frequency() {
        // matches of a longer pattern are a subset of the shorter one's
        let narrowed: Vec<TransactionId> = matched
            .iter()
            .copied()
            .filter(|&id| dataset[id].contains(item))
            .collect();
        if narrowed.len() < min_sessions {
            trace!(
                "Item {} drops support to {} (< {}), stopping",
                item,
                narrowed.len(),
                min_sessions
            );
            break;
        }
        items.push(item);
        trace.push(narrowed.len());
        matched = narrowed;
    }

    if items.is_empty() {
        return Ok((Pattern::empty(num_sessions), trace));
    }

    items.sort_unstable();
    Ok((
        Pattern::from_matches(items, matched, num_sessions),
        trace,
    ))
}

/// Strips the pattern's items from every transaction that contains all of
/// them. Returns the number of transactions touched.
///
/// Emptied transactions stay in place.
pub fn remove_pattern(dataset: &mut Dataset, pattern: &Pattern) -> usize {
    let items = pattern.items();
    if items.is_empty() {
        return 0;
    }

    let mut touched = 0;
    for transaction in dataset.transactions_mut() {
        if transaction.contains_all(items) {
            transaction.remove_all(items);
            touched += 1;
        }
    }
    touched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{generate, index::build_index, pattern::support_count};
    use proptest::prelude::*;

    fn grow(dataset: &Dataset, threshold: f64) -> (Pattern, Vec<usize>) {
        let (_, histogram) = build_index(dataset).unwrap();
        grow_pattern_traced(dataset, &histogram, threshold).unwrap()
    }

    #[test]
    fn min_sessions_rounds_half_up_and_clamps() {
        assert_eq!(min_sessions(22, 0.2), 4);
        assert_eq!(min_sessions(10, 0.25), 3);
        assert_eq!(min_sessions(10, 0.0), 1);
        assert_eq!(min_sessions(10, 1.0), 10);
    }

    #[test]
    fn toy_dataset_at_low_threshold() {
        let dataset = generate::toy();
        let (pattern, trace) = grow(&dataset, 0.2);
        assert_eq!(pattern.items(), &[1, 2, 4, 5, 6]);
        assert_eq!(pattern.support_count(), 6);
        assert_eq!(pattern.matched_transactions(), &[12, 13, 14, 15, 16, 17]);
        assert_eq!(trace, vec![22, 22, 18, 12, 6]);
    }

    #[test]
    fn toy_dataset_at_full_support() {
        let dataset = generate::toy();
        let (pattern, _) = grow(&dataset, 1.0);
        assert_eq!(pattern.items(), &[4, 5]);
        assert_eq!(pattern.support_count(), 22);
        assert_eq!(pattern.summary().to_string(), "Total: 22 of 22 sessions, 100.00 %");
    }

    #[test]
    fn first_item_failing_gives_empty_pattern() {
        let dataset = dataset![[1, 2], [3, 4], [5, 6]];
        let (pattern, trace) = grow(&dataset, 0.9);
        assert!(pattern.is_empty());
        assert!(trace.is_empty());
    }

    #[test]
    fn invalid_threshold_is_rejected() {
        let dataset = generate::toy();
        let (_, histogram) = build_index(&dataset).unwrap();
        assert_eq!(
            grow_pattern(&dataset, &histogram, 1.2).unwrap_err(),
            MiningError::InvalidThreshold {
                name: "threshold",
                value: 1.2
            }
        );
    }

    #[test]
    fn remove_pattern_keeps_emptied_transactions() {
        let mut dataset = dataset![[1, 2, 3], [1, 2], [2, 3]];
        let pattern = Pattern::measure(vec![1, 2], &dataset);
        assert_eq!(remove_pattern(&mut dataset, &pattern), 2);
        assert_eq!(dataset, dataset![[3], [], [2, 3]]);
        assert_eq!(remove_pattern(&mut dataset, &pattern), 0);
    }

    #[test]
    fn removing_empty_pattern_is_noop() {
        let mut dataset = generate::toy();
        assert_eq!(remove_pattern(&mut dataset, &Pattern::empty(22)), 0);
        assert_eq!(dataset, generate::toy());
    }

    fn rows() -> impl Strategy<Value = Vec<Vec<u64>>> {
        prop::collection::vec(prop::collection::vec(0u64..10, 0..7), 1..20)
    }

    proptest! {
        #[test]
        fn grown_pattern_meets_threshold_and_trace_is_monotone(
            rows in rows(),
            threshold in 0.0f64..=1.0,
        ) {
            let dataset = Dataset::from_rows(rows);
            if let Ok((_, histogram)) = build_index(&dataset) {
                let (pattern, trace) = grow_pattern_traced(&dataset, &histogram, threshold).unwrap();
                if !pattern.is_empty() {
                    prop_assert!(pattern.support_count() >= min_sessions(dataset.len(), threshold));
                    prop_assert_eq!(pattern.support_count(), support_count(&dataset, pattern.items()));
                }
                prop_assert!(trace.windows(2).all(|w| w[0] >= w[1]));
            }
        }

        #[test]
        fn remove_pattern_is_idempotent(rows in rows(), take in 1usize..4) {
            let dataset = Dataset::from_rows(rows);
            let items: Vec<u64> = dataset[0].items().iter().copied().take(take).collect();
            let pattern = Pattern::measure(items, &dataset);

            let mut once = dataset.clone();
            remove_pattern(&mut once, &pattern);
            let mut twice = once.clone();
            remove_pattern(&mut twice, &pattern);
            prop_assert_eq!(once, twice);
        }
    }
}
