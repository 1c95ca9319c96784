//! Errors raised by the mining engine

use thiserror::Error;

/// Everything that can go wrong while indexing or mining a dataset.
///
/// "No interesting pattern" is never an error: the grower reports it as an
/// empty [`Pattern`](crate::Pattern).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MiningError {
    /// Fewer than three distinct items are left in the dataset snapshot.
    /// Discovery drivers read this as "fully mined".
    #[error("dataset has {distinct} distinct items, mining needs at least 3")]
    InsufficientVocabulary { distinct: usize },
    /// A fraction parameter outside `[0, 1]` (or NaN).
    #[error("{name} must lie in [0, 1], got {value}")]
    InvalidThreshold { name: &'static str, value: f64 },
    /// Two bitsets built from different item indices were combined.
    #[error("bitset width mismatch: {left} bits vs {right} bits")]
    BitsetWidthMismatch { left: usize, right: usize },
    /// The discovery loop ran out of iterations before the data was exhausted.
    #[error("discovery stopped after {iterations} iterations without exhausting the dataset")]
    IterationBudgetExceeded { iterations: usize },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
