//! Frequent-itemset discovery over in-memory transaction datasets.
//!
//! Three interchangeable strategies share one data model: a greedy
//! iterative grower, an exact pairwise bitset miner and a recursive
//! partition miner. Each reports [`Pattern`]s whose support is measured
//! against the dataset it was given.

/// Builds a [`Transaction`] from item literals.
#[macro_export]
macro_rules! transaction {
    ($($x:expr),* $(,)?) => {
        $crate::Transaction::new(vec![$($x as $crate::types::Item),*])
    };
}

/// Builds a [`Dataset`] from bracketed item lists.
#[macro_export]
macro_rules! dataset {
    ($([$($x:expr),* $(,)?]),* $(,)?) => {
        $crate::Dataset::new(vec![$($crate::transaction![$($x),*]),*])
    };
}

pub mod bitset;
pub mod config;
pub mod dataset;
pub mod error;
pub mod generate;
pub mod index;
pub mod itemsets;
pub mod pattern;
pub mod types;
#[cfg(feature = "python")]
mod wrapper;

pub use crate::{
    bitset::Bitset,
    config::{GreedyConfig, PairwiseConfig, PartitionConfig, Reduction},
    dataset::{Dataset, Transaction},
    error::MiningError,
    index::{build_index, Histogram, ItemIndex},
    itemsets::{
        greedy::{grow_pattern, remove_pattern},
        iterative::{mine_iterative, MiningReport, StopReason},
        pairwise::mine_pairwise,
        partition::{mine_by_partition, PartitionNode, PartitionTree},
        IterativeMiner, Miner, PairwiseMiner, PartitionMiner,
    },
    pattern::{matching_transactions, support_count, Pattern},
};
