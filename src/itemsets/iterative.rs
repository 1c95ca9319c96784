use log::{debug, warn};
use serde::Serialize;

use crate::{
    config::{GreedyConfig, Reduction},
    dataset::Dataset,
    error::MiningError,
    index::{build_index, MIN_VOCABULARY},
    itemsets::greedy::{grow_pattern, remove_pattern},
    pattern::Pattern,
};

/// Why discovery stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StopReason {
    /// Fewer than three distinct items were left after a reduction, or
    /// fewer than three left in the frequency order when dropping items.
    Exhausted,
    /// The last grown pattern was too short to be interesting.
    ShortPattern,
    /// `max_iterations` ran out first. Results are partial.
    IterationBudgetExceeded,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MiningReport {
    /// Refined patterns measured against the original dataset, in discovery order.
    pub patterns: Vec<Pattern>,
    /// Phase one output, measured against the reduced dataset each was found in.
    pub discovered: Vec<Pattern>,
    pub refined_count: usize,
    pub iterations: usize,
    pub stop_reason: StopReason,
}

impl MiningReport {
    /// Turns an exhausted iteration budget into an error.
    pub fn into_result(self) -> Result<Self, MiningError> {
        match self.stop_reason {
            StopReason::IterationBudgetExceeded => Err(MiningError::IterationBudgetExceeded {
                iterations: self.iterations,
            }),
            _ => Ok(self),
        }
    }
}

/// Grow, record, reduce and rebuild until the dataset is exhausted, then
/// refine every discovered pattern against the sessions it came from.
pub fn mine_iterative(dataset: &Dataset, config: &GreedyConfig) -> Result<MiningReport, MiningError> {
    config.validate()?;

    let (mut index, mut histogram) = build_index(dataset)?;
    let mut working = dataset.clone();
    let mut discovered: Vec<Pattern> = Vec::new();
    let mut stop_reason = StopReason::IterationBudgetExceeded;
    let mut iterations = 0;

    debug!(
        "Discovering patterns in {} sessions (threshold {})",
        working.len(),
        config.discovery_threshold
    );

    for step in 0..config.max_iterations {
        iterations = step + 1;
        let pattern = grow_pattern(&working, &histogram, config.discovery_threshold)?;
        debug!(
            "Step {}: [{}] in {} sessions",
            step,
            pattern,
            pattern.support_count()
        );

        match config.reduction {
            Reduction::RemovePattern => {
                remove_pattern(&mut working, &pattern);
                match build_index(&working) {
                    Ok((rebuilt_index, rebuilt)) => {
                        index = rebuilt_index;
                        histogram = rebuilt;
                    }
                    Err(MiningError::InsufficientVocabulary { distinct }) => {
                        debug!("Solved. {} distinct items left in the dataset", distinct);
                        discovered.push(pattern);
                        stop_reason = StopReason::Exhausted;
                        break;
                    }
                    Err(err) => return Err(err),
                }
            }
            Reduction::DropMostFrequent => {
                if let Some((item, count)) = histogram.trim_left(&index) {
                    debug!("Dropped item {} ({} occurrences)", item, count);
                }
                if histogram.by_frequency().len() < MIN_VOCABULARY {
                    debug!(
                        "Solved. {} items left to grow from",
                        histogram.by_frequency().len()
                    );
                    discovered.push(pattern);
                    stop_reason = StopReason::Exhausted;
                    break;
                }
            }
        }

        if pattern.len() <= config.min_pattern_len {
            debug!(
                "Stop. Pattern of {} items in {} sessions is no longer interesting",
                pattern.len(),
                pattern.support_count()
            );
            stop_reason = StopReason::ShortPattern;
            break;
        }
        discovered.push(pattern);
    }

    if stop_reason == StopReason::IterationBudgetExceeded {
        warn!(
            "Discovery hit its budget of {} iterations, returning {} partial results",
            config.max_iterations,
            discovered.len()
        );
    }

    let mut refined_count = 0;
    let mut patterns = Vec::with_capacity(discovered.len());
    for found in &discovered {
        let (pattern, improved) = refine(dataset, found, config.refine_threshold)?;
        if improved {
            debug!("Improved [{}] to [{}]", found, pattern);
            refined_count += 1;
        }
        patterns.push(pattern);
    }

    Ok(MiningReport {
        patterns,
        discovered,
        refined_count,
        iterations,
        stop_reason,
    })
}

/// Re-grows `found` over the original sessions it matched. The longer of the
/// two wins; ties keep `found`.
fn refine(original: &Dataset, found: &Pattern, threshold: f64) -> Result<(Pattern, bool), MiningError> {
    let subset = original.subset(found.matched_transactions());
    let candidate = match build_index(&subset) {
        Ok((_, histogram)) => Some(grow_pattern(&subset, &histogram, threshold)?),
        Err(MiningError::InsufficientVocabulary { .. }) => None,
        Err(err) => return Err(err),
    };

    match candidate {
        Some(refined) if refined.len() > found.len() => {
            Ok((Pattern::measure(refined.items().iter().copied(), original), true))
        }
        _ => Ok((Pattern::measure(found.items().iter().copied(), original), false)),
    }
}
