//! Dataset generators for demos and tests.

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    dataset::{Dataset, Transaction},
    types::Item,
};

pub const DEFAULT_SEED: u64 = 1379;

/// Each random session draws this many items (with repeats).
const MIN_DRAWS: usize = 200;
const MAX_DRAWS: usize = 400;

/// The 22-session toy dataset over items 1..=9.
///
/// Known supports: `{4, 5}` 22/22, `{2, 4, 5}` 18/22,
/// `{1, 2, 4, 5}` 12/22, `{2, 3, 4, 5, 6, 7, 8, 9}` 6/22.
pub fn toy() -> Dataset {
    let mut rows: Vec<Vec<Item>> = Vec::with_capacity(22);
    rows.extend((0..2).map(|_| vec![1, 2, 3, 4, 5, 7, 8, 9]));
    rows.extend((0..4).map(|_| vec![1, 2, 3, 4, 5]));
    rows.extend((0..6).map(|_| vec![2, 3, 4, 5, 6, 7, 8, 9]));
    rows.extend((0..6).map(|_| vec![1, 2, 4, 5, 6]));
    rows.extend((0..4).map(|_| vec![1, 4, 5, 6]));
    Dataset::from_rows(rows)
}

/// Sessions of 200..400 uniform draws from `0..num_distinct_items`,
/// deduplicated. Reproducible for a given seed.
pub fn random(num_sessions: usize, num_distinct_items: Item, seed: u64) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..num_sessions)
        .map(|_| {
            if num_distinct_items == 0 {
                return Transaction::default();
            }
            let draws = rng.gen_range(MIN_DRAWS..MAX_DRAWS);
            (0..draws)
                .map(|_| rng.gen_range(0..num_distinct_items))
                .collect()
        })
        .collect()
}
