use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::wrap_pyfunction;

use crate::{
    config::{GreedyConfig, PairwiseConfig, PartitionConfig, Reduction},
    dataset::Dataset,
    error::MiningError,
    itemsets::{IterativeMiner, Miner, PairwiseMiner, PartitionMiner},
    pattern::Pattern,
    types::{Item, TransactionId},
};

#[pyclass(name = "Pattern")]
#[derive(Clone)]
pub struct PyPattern {
    #[pyo3(get)]
    pub items: Vec<Item>,
    #[pyo3(get)]
    pub support_count: usize,
    #[pyo3(get)]
    pub support_fraction: f64,
    #[pyo3(get)]
    pub matched_transactions: Vec<TransactionId>,
}

impl From<Pattern> for PyPattern {
    fn from(pattern: Pattern) -> Self {
        Self {
            items: pattern.items().to_vec(),
            support_count: pattern.support_count(),
            support_fraction: pattern.support_fraction(),
            matched_transactions: pattern.matched_transactions().to_vec(),
        }
    }
}

impl From<MiningError> for PyErr {
    fn from(err: MiningError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

/// Every entry point goes through [`Miner`], so too small a vocabulary
/// yields `[]` rather than an exception.
fn run(miner: &dyn Miner, transactions: Vec<Vec<Item>>) -> PyResult<Vec<PyPattern>> {
    let patterns = miner.mine(&Dataset::from_rows(transactions))?;
    Ok(patterns.into_iter().map(PyPattern::from).collect())
}

/// Greedy grow, reduce and refine.
#[pyfunction(discovery_threshold = "0.2", max_iterations = "40", drop_most_frequent = "false")]
#[pyo3(text_signature = "(transactions, /, discovery_threshold, max_iterations, drop_most_frequent)")]
fn mine_iterative(
    transactions: Vec<Vec<Item>>,
    discovery_threshold: f64,
    max_iterations: usize,
    drop_most_frequent: bool,
) -> PyResult<Vec<PyPattern>> {
    let reduction = if drop_most_frequent {
        Reduction::DropMostFrequent
    } else {
        Reduction::RemovePattern
    };
    let miner = IterativeMiner(GreedyConfig {
        discovery_threshold,
        max_iterations,
        reduction,
        ..GreedyConfig::default()
    });
    run(&miner, transactions)
}

/// Exact pairwise bitset miner.
#[pyfunction(min_support = "0.2", min_pattern_bits = "3", parallel = "false")]
#[pyo3(text_signature = "(transactions, /, min_support, min_pattern_bits, parallel)")]
fn mine_pairwise(
    transactions: Vec<Vec<Item>>,
    min_support: f64,
    min_pattern_bits: usize,
    parallel: bool,
) -> PyResult<Vec<PyPattern>> {
    let miner = PairwiseMiner(PairwiseConfig {
        min_support_fraction: min_support,
        min_pattern_bits,
        parallel,
    });
    run(&miner, transactions)
}

/// Partition tree paths as patterns.
#[pyfunction(split_fraction = "0.5", min_len = "2")]
#[pyo3(text_signature = "(transactions, /, split_fraction, min_len)")]
fn mine_by_partition(
    transactions: Vec<Vec<Item>>,
    split_fraction: f64,
    min_len: usize,
) -> PyResult<Vec<PyPattern>> {
    let miner = PartitionMiner(PartitionConfig {
        split_fraction,
        min_pattern_len: min_len,
    });
    run(&miner, transactions)
}

#[pymodule]
fn itemsetmine(_: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<PyPattern>()?;
    m.add_function(wrap_pyfunction!(mine_iterative, m)?)?;
    m.add_function(wrap_pyfunction!(mine_pairwise, m)?)?;
    m.add_function(wrap_pyfunction!(mine_by_partition, m)?)?;
    Ok(())
}
