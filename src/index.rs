use std::collections::HashSet;

use itertools::Itertools;
use log::trace;

use crate::{
    bitset::Bitset,
    dataset::{Dataset, Transaction},
    error::MiningError,
    types::{DenseIndex, Item, Itemset, ReverseLookup},
};

/// Mining is not meaningful below this many distinct items.
pub const MIN_VOCABULARY: usize = 3;

const APPROX_NUM_UNIQUE_ITEMS: usize = 1024; // arbitrary

/// Bidirectional mapping between items and dense positions `[0, len)`.
///
/// Positions follow ascending item order, so two indices built from the
/// same item set are identical.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemIndex {
    inventory: Vec<Item>,
    reverse_lookup: ReverseLookup,
}

impl ItemIndex {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let mut unique_items: HashSet<Item> = HashSet::with_capacity(APPROX_NUM_UNIQUE_ITEMS);
        for transaction in dataset {
            unique_items.extend(transaction.items().iter().copied());
        }

        let inventory: Vec<Item> = unique_items.into_iter().sorted_unstable().collect();
        let reverse_lookup = inventory
            .iter()
            .enumerate()
            .map(|(dense, &item)| (item, dense))
            .collect();

        Self {
            inventory,
            reverse_lookup,
        }
    }

    pub fn len(&self) -> usize {
        self.inventory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inventory.is_empty()
    }

    pub fn dense(&self, item: Item) -> Option<DenseIndex> {
        self.reverse_lookup.get(&item).copied()
    }

    pub fn item(&self, dense: DenseIndex) -> Item {
        self.inventory[dense]
    }

    pub fn items(&self) -> &[Item] {
        &self.inventory
    }

    /// Items of `transaction` that are not in the index are ignored.
    pub fn bitset_of(&self, transaction: &Transaction) -> Bitset {
        let mut bits = Bitset::new(self.len());
        transaction
            .items()
            .iter()
            .filter_map(|&item| self.dense(item))
            .for_each(|dense| bits.set(dense));
        bits
    }

    /// Sorted items behind the set bits of `bits`.
    pub fn items_of(&self, bits: &Bitset) -> Itemset {
        // dense order is item order
        bits.ones().map(|dense| self.item(dense)).collect()
    }
}

/// Per-item occurrence counts over dense positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    bins: Vec<u64>,
    sorted_by_freq: Vec<(Item, u64)>,
}

impl Histogram {
    pub fn new(index: &ItemIndex, dataset: &Dataset) -> Self {
        let mut bins = vec![0_u64; index.len()];
        for transaction in dataset {
            for &item in transaction.items() {
                if let Some(dense) = index.dense(item) {
                    bins[dense] += 1;
                }
            }
        }

        let mut sorted_by_freq: Vec<(Item, u64)> = bins
            .iter()
            .enumerate()
            .map(|(dense, &count)| (index.item(dense), count))
            .collect();
        sorted_by_freq.sort_by(|(a_item, a_count), (b_item, b_count)| {
            b_count.cmp(a_count).then(a_item.cmp(b_item))
        });

        Self {
            bins,
            sorted_by_freq,
        }
    }

    /// Counts indexed by dense position.
    pub fn bins(&self) -> &[u64] {
        &self.bins
    }

    /// (item, count) pairs, count descending, ties by ascending item.
    pub fn by_frequency(&self) -> &[(Item, u64)] {
        &self.sorted_by_freq
    }

    pub fn most_frequent(&self) -> Option<(Item, u64)> {
        self.sorted_by_freq.first().copied()
    }

    pub fn total(&self) -> u64 {
        self.bins.iter().sum()
    }

    /// Drops the most frequent item from the frequency order and zeroes its
    /// bin, leaving the dataset untouched. Returns the dropped entry.
    pub fn trim_left(&mut self, index: &ItemIndex) -> Option<(Item, u64)> {
        if self.sorted_by_freq.is_empty() {
            return None;
        }
        let (item, count) = self.sorted_by_freq.remove(0);
        if let Some(dense) = index.dense(item) {
            self.bins[dense] = 0;
        }
        Some((item, count))
    }
}

/// Indexes the distinct items of `dataset` and counts how often each occurs.
pub fn build_index(dataset: &Dataset) -> Result<(ItemIndex, Histogram), MiningError> {
    let index = ItemIndex::from_dataset(dataset);
    if index.len() < MIN_VOCABULARY {
        trace!("Only {} distinct items left, refusing to index", index.len());
        return Err(MiningError::InsufficientVocabulary {
            distinct: index.len(),
        });
    }

    let histogram = Histogram::new(&index, dataset);
    trace!(
        "Indexed {} distinct items over {} transactions",
        index.len(),
        dataset.len()
    );
    Ok((index, histogram))
}
