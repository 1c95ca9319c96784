//! Mining strategies over the shared [`Dataset`] model.

pub mod greedy;
pub mod iterative;
pub mod pairwise;
pub mod partition;

use crate::{
    config::{GreedyConfig, PairwiseConfig, PartitionConfig},
    dataset::Dataset,
    error::MiningError,
    pattern::Pattern,
};

/// A frequent-itemset strategy.
///
/// An input with fewer than three distinct items has nothing to mine and
/// yields an empty list. The free functions report it as
/// [`MiningError::InsufficientVocabulary`] instead.
pub trait Miner {
    fn mine(&self, dataset: &Dataset) -> Result<Vec<Pattern>, MiningError>;
}

fn nothing_to_mine(result: Result<Vec<Pattern>, MiningError>) -> Result<Vec<Pattern>, MiningError> {
    match result {
        Err(MiningError::InsufficientVocabulary { .. }) => Ok(vec![]),
        other => other,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IterativeMiner(pub GreedyConfig);

impl Miner for IterativeMiner {
    fn mine(&self, dataset: &Dataset) -> Result<Vec<Pattern>, MiningError> {
        nothing_to_mine(iterative::mine_iterative(dataset, &self.0).map(|report| report.patterns))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PairwiseMiner(pub PairwiseConfig);

impl Miner for PairwiseMiner {
    fn mine(&self, dataset: &Dataset) -> Result<Vec<Pattern>, MiningError> {
        nothing_to_mine(pairwise::mine_pairwise_with(dataset, &self.0))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PartitionMiner(pub PartitionConfig);

impl Miner for PartitionMiner {
    fn mine(&self, dataset: &Dataset) -> Result<Vec<Pattern>, MiningError> {
        nothing_to_mine(partition::mine_by_partition_with(dataset, &self.0))
    }
}
