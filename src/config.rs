//! Parameters for the three mining strategies.
//!
//! Every struct has sensible session-mining defaults and is
//! validated before any computation starts.

use serde::{Deserialize, Serialize};

use crate::error::MiningError;

/// Rejects NaN and anything outside `[0, 1]`.
pub fn validate_fraction(name: &'static str, value: f64) -> Result<(), MiningError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(MiningError::InvalidThreshold { name, value })
    }
}

/// How the discovery loop moves on after recording a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reduction {
    /// Strip the pattern from every transaction that contains it and
    /// re-index what is left.
    RemovePattern,
    /// Keep the dataset and drop the most frequent item from the histogram.
    DropMostFrequent,
}

impl Default for Reduction {
    fn default() -> Self {
        Reduction::RemovePattern
    }
}

/// Iterative grow, reduce and refine driver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GreedyConfig {
    /// Fraction of sessions a pattern must keep while growing in discovery.
    pub discovery_threshold: f64,
    /// Fraction used when re-growing a pattern over its own matches.
    pub refine_threshold: f64,
    /// Discovered patterns this short or shorter end discovery.
    pub min_pattern_len: usize,
    pub max_iterations: usize,
    pub reduction: Reduction,
}

impl Default for GreedyConfig {
    fn default() -> Self {
        Self {
            discovery_threshold: 0.2,
            refine_threshold: 1.0,
            min_pattern_len: 2,
            max_iterations: 40,
            reduction: Reduction::RemovePattern,
        }
    }
}

impl GreedyConfig {
    pub fn validate(&self) -> Result<(), MiningError> {
        validate_fraction("discovery_threshold", self.discovery_threshold)?;
        validate_fraction("refine_threshold", self.refine_threshold)?;
        if self.max_iterations == 0 {
            return Err(MiningError::InvalidConfig(
                "max_iterations must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Exact pairwise bitset miner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairwiseConfig {
    pub min_support_fraction: f64,
    /// Pairwise intersections with fewer shared items are dropped.
    pub min_pattern_bits: usize,
    /// Spread the pairwise scan over the rayon pool.
    pub parallel: bool,
}

impl Default for PairwiseConfig {
    fn default() -> Self {
        Self {
            min_support_fraction: 0.2,
            min_pattern_bits: 3,
            parallel: false,
        }
    }
}

impl PairwiseConfig {
    pub fn validate(&self) -> Result<(), MiningError> {
        validate_fraction("min_support_fraction", self.min_support_fraction)
    }
}

/// Partition tree miner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartitionConfig {
    /// Keep splitting a node while more than this fraction of its rows remain.
    pub split_fraction: f64,
    /// Shortest node path reported as a pattern.
    pub min_pattern_len: usize,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            split_fraction: 0.5,
            min_pattern_len: 2,
        }
    }
}

impl PartitionConfig {
    pub fn validate(&self) -> Result<(), MiningError> {
        validate_fraction("split_fraction", self.split_fraction)
    }
}
