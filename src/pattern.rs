use std::{
    cmp::Ordering,
    fmt::{self, Display, Formatter},
};

use itertools::Itertools;
use serde::Serialize;

use crate::{
    dataset::Dataset,
    types::{Item, Itemset, TransactionId},
};

/// Positions of the transactions that are supersets of `items`.
/// The empty itemset matches nothing.
pub fn matching_transactions(dataset: &Dataset, items: &[Item]) -> Vec<TransactionId> {
    if items.is_empty() {
        return vec![];
    }
    dataset
        .iter()
        .enumerate()
        .filter(|(_, transaction)| transaction.contains_all(items))
        .map(|(id, _)| id)
        .collect()
}

/// Naive full-scan support count.
pub fn support_count(dataset: &Dataset, items: &[Item]) -> usize {
    if items.is_empty() {
        return 0;
    }
    dataset
        .iter()
        .filter(|transaction| transaction.contains_all(items))
        .count()
}

/// A finalized itemset with its support in a reference dataset.
///
/// Only built by measuring against a dataset, so support and matches
/// always agree. Serialize-only for that reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pattern {
    items: Itemset,
    support_count: usize,
    support_fraction: f64,
    matched_transactions: Vec<TransactionId>,
    transaction_count: usize,
}

impl Pattern {
    /// The "nothing found" pattern.
    pub fn empty(transaction_count: usize) -> Self {
        Self {
            items: vec![],
            support_count: 0,
            support_fraction: 0.0,
            matched_transactions: vec![],
            transaction_count,
        }
    }

    /// Sorts `items` and measures their support against `dataset`.
    pub fn measure<I: IntoIterator<Item = Item>>(items: I, dataset: &Dataset) -> Self {
        let items: Itemset = items.into_iter().sorted_unstable().dedup().collect();
        let matched = matching_transactions(dataset, &items);
        Self::from_matches(items, matched, dataset.len())
    }

    /// `items` must be sorted and `matched` must be its exact match list.
    pub(crate) fn from_matches(
        items: Itemset,
        matched_transactions: Vec<TransactionId>,
        transaction_count: usize,
    ) -> Self {
        let support_count = matched_transactions.len();
        let support_fraction = if transaction_count == 0 {
            0.0
        } else {
            support_count as f64 / transaction_count as f64
        };
        Self {
            items,
            support_count,
            support_fraction,
            matched_transactions,
            transaction_count,
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn support_count(&self) -> usize {
        self.support_count
    }

    pub fn support_fraction(&self) -> f64 {
        self.support_fraction
    }

    pub fn matched_transactions(&self) -> &[TransactionId] {
        &self.matched_transactions
    }

    pub fn transaction_count(&self) -> usize {
        self.transaction_count
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// `Total: 18 of 22 sessions, 81.82 %`
    pub fn summary(&self) -> Summary<'_> {
        Summary(self)
    }

    /// Longer patterns first, then higher support, then item order.
    pub fn rank_cmp(&self, other: &Pattern) -> Ordering {
        other
            .len()
            .cmp(&self.len())
            .then(other.support_count.cmp(&self.support_count))
            .then_with(|| self.items.cmp(&other.items))
    }
}

impl Display for Pattern {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.items.iter().join(", "))
    }
}

pub struct Summary<'p>(&'p Pattern);

impl Display for Summary<'_> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(
            f,
            "Total: {} of {} sessions, {:.2} %",
            self.0.support_count,
            self.0.transaction_count,
            100.0 * self.0.support_fraction
        )
    }
}

pub fn rank_patterns(patterns: &mut [Pattern]) {
    patterns.sort_by(Pattern::rank_cmp);
}
