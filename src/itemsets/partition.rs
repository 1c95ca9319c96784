use std::collections::VecDeque;

use log::{debug, trace};

use crate::{
    config::{validate_fraction, PartitionConfig},
    dataset::{Dataset, Transaction},
    error::MiningError,
    index::build_index,
    pattern::{rank_patterns, Pattern},
    types::{Item, Itemset, NodeId, TransactionId},
};

pub const ROOT: NodeId = 0;

#[derive(Debug, Clone, PartialEq)]
pub struct PartitionNode {
    /// Item this node was split on. `None` for the root.
    pub item: Option<Item>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Rows still owned by this node, ancestor items stripped.
    pub residual: Dataset,
    /// Original position of each residual row.
    pub rows: Vec<TransactionId>,
}

/// Prefix tree of itemsets, stored as an arena.
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionTree {
    nodes: Vec<PartitionNode>,
    source: Dataset,
}

impl PartitionTree {
    fn new(source: &Dataset) -> Self {
        let root = PartitionNode {
            item: None,
            parent: None,
            children: vec![],
            residual: source.clone(),
            rows: (0..source.len()).collect(),
        };
        Self {
            nodes: vec![root],
            source: source.clone(),
        }
    }

    pub fn root(&self) -> &PartitionNode {
        &self.nodes[ROOT]
    }

    pub fn node(&self, id: NodeId) -> &PartitionNode {
        &self.nodes[id]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Itemset spelled by the path from the root to `id`, sorted.
    pub fn path(&self, id: NodeId) -> Itemset {
        let mut items = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = &self.nodes[current];
            items.extend(node.item);
            cursor = node.parent;
        }
        items.sort_unstable();
        items
    }

    pub fn leaves(&self) -> Vec<NodeId> {
        (0..self.nodes.len())
            .filter(|&id| self.nodes[id].children.is_empty())
            .collect()
    }

    /// Every node path with at least `min_len` items, measured against the
    /// source dataset and ranked longest first.
    pub fn patterns(&self, min_len: usize) -> Vec<Pattern> {
        let mut patterns: Vec<Pattern> = (0..self.nodes.len())
            .map(|id| self.path(id))
            .filter(|items| !items.is_empty() && items.len() >= min_len)
            .map(|items| Pattern::measure(items, &self.source))
            .collect();
        rank_patterns(&mut patterns);
        patterns.dedup_by(|a, b| a.items() == b.items());
        patterns
    }

    /// Rebuilds each source transaction from the residual row that owns it
    /// plus the owning node's path. `None` marks a row no node owns.
    pub fn reconstruct(&self) -> Vec<Option<Transaction>> {
        let mut rebuilt = vec![None; self.source.len()];
        for (id, node) in self.nodes.iter().enumerate() {
            let path = self.path(id);
            for (&row, residual) in node.rows.iter().zip(node.residual.iter()) {
                let items = residual.items().iter().chain(path.iter()).copied();
                rebuilt[row] = Some(Transaction::new(items));
            }
        }
        rebuilt
    }

    /// Splits off children of `id` on its most frequent item until no more
    /// than `split_fraction` of the node's rows remain.
    fn split(&mut self, id: NodeId, split_fraction: f64) -> Result<Vec<NodeId>, MiningError> {
        let before = self.nodes[id].residual.len();
        let floor = split_fraction * before as f64;
        let mut created = Vec::new();

        while !self.nodes[id].residual.is_empty() && self.nodes[id].residual.len() as f64 > floor {
            let item = match build_index(&self.nodes[id].residual) {
                Ok((_, histogram)) => match histogram.most_frequent() {
                    Some((item, count)) if count > 0 => item,
                    _ => break,
                },
                Err(MiningError::InsufficientVocabulary { distinct }) => {
                    trace!("Node {} is a leaf, {} distinct items left", id, distinct);
                    break;
                }
                Err(err) => return Err(err),
            };

            let parent = &mut self.nodes[id];
            let residual = std::mem::take(&mut parent.residual);
            let rows = std::mem::take(&mut parent.rows);

            let mut child_residual = Dataset::default();
            let mut child_rows = Vec::new();
            for (mut transaction, row) in residual.into_transactions().into_iter().zip(rows) {
                if transaction.remove(item) {
                    child_residual.push(transaction);
                    child_rows.push(row);
                } else {
                    parent.residual.push(transaction);
                    parent.rows.push(row);
                }
            }

            let child = self.nodes.len();
            trace!(
                "Node {} splits on {} into node {} ({} rows)",
                id,
                item,
                child,
                child_rows.len()
            );
            self.nodes[id].children.push(child);
            self.nodes.push(PartitionNode {
                item: Some(item),
                parent: Some(id),
                children: vec![],
                residual: child_residual,
                rows: child_rows,
            });
            created.push(child);
        }

        Ok(created)
    }
}

/// Top-down split of `dataset` on the most frequent item, breadth first.
pub fn mine_by_partition(dataset: &Dataset, split_fraction: f64) -> Result<PartitionTree, MiningError> {
    validate_fraction("split_fraction", split_fraction)?;

    let mut tree = PartitionTree::new(dataset);
    let mut pending: VecDeque<NodeId> = VecDeque::new();
    pending.push_back(ROOT);

    while let Some(id) = pending.pop_front() {
        let children = tree.split(id, split_fraction)?;
        pending.extend(children);
    }

    debug!(
        "Partition tree of {} nodes over {} sessions",
        tree.len(),
        dataset.len()
    );
    Ok(tree)
}

pub fn mine_by_partition_with(dataset: &Dataset, config: &PartitionConfig) -> Result<Vec<Pattern>, MiningError> {
    config.validate()?;
    let tree = mine_by_partition(dataset, config.split_fraction)?;
    Ok(tree.patterns(config.min_pattern_len))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{generate, pattern::support_count};
    use proptest::prelude::*;

    fn sample() -> Dataset {
        dataset![[1, 2, 3, 4], [1, 2, 3], [1, 2, 5], [1, 3, 6], [4, 5, 6]]
    }

    #[test]
    fn splits_dequeued_nodes() {
        let tree = mine_by_partition(&sample(), 0.5).unwrap();

        assert_eq!(tree.len(), 4);
        assert_eq!(tree.children(ROOT), &[1]);
        assert_eq!(tree.children(1), &[2]);
        assert_eq!(tree.children(2), &[3]);
        assert_eq!(tree.path(3), vec![1, 2, 3]);
        assert_eq!(tree.root().rows, vec![4]);
        assert_eq!(tree.node(1).rows, vec![3]);
        assert_eq!(tree.node(2).rows, vec![2]);
        assert_eq!(tree.node(3).rows, vec![0, 1]);
        assert_eq!(tree.node(3).residual, dataset![[4], []]);
        assert_eq!(tree.leaves(), vec![3]);
    }

    #[test]
    fn paths_become_patterns() {
        let dataset = sample();
        let tree = mine_by_partition(&dataset, 0.5).unwrap();
        let patterns = tree.patterns(2);

        assert_eq!(patterns.len(), 2);
        assert_eq!(patterns[0].items(), &[1, 2, 3]);
        assert_eq!(patterns[0].support_count(), 2);
        assert_eq!(patterns[1].items(), &[1, 2]);
        assert_eq!(patterns[1].support_count(), 3);
    }

    #[test]
    fn toy_dataset_splits_on_shared_items_first() {
        let dataset = generate::toy();
        let tree = mine_by_partition(&dataset, 0.5).unwrap();

        assert_eq!(tree.children(ROOT).len(), 1);
        let first = tree.children(ROOT)[0];
        assert_eq!(tree.node(first).item, Some(4));
        assert!(tree.root().residual.is_empty());

        // every session holds 4 and 5, so all rows move on to the {4, 5} node
        assert!(tree.node(first).rows.is_empty());
        assert_eq!(tree.children(first).len(), 1);
        let second = tree.children(first)[0];
        assert_eq!(tree.node(second).item, Some(5));
        assert_eq!(tree.node(second).rows, (0..22).collect::<Vec<_>>());
        assert_eq!(tree.path(second), vec![4, 5]);

        for pattern in tree.patterns(2) {
            assert_eq!(pattern.support_count(), support_count(&dataset, pattern.items()));
        }
        assert!(tree.patterns(2).iter().any(|p| p.items() == [2, 4, 5]));
    }

    #[test]
    fn full_fraction_never_splits() {
        let tree = mine_by_partition(&generate::toy(), 1.0).unwrap();
        assert_eq!(tree.len(), 1);
        assert!(tree.patterns(1).is_empty());
    }

    #[test]
    fn invalid_fraction_is_rejected() {
        assert!(matches!(
            mine_by_partition(&sample(), 1.5),
            Err(MiningError::InvalidThreshold { .. })
        ));
    }

    fn assert_owned_exactly_once(tree: &PartitionTree, dataset: &Dataset) {
        let mut owned: Vec<TransactionId> = (0..tree.len())
            .flat_map(|id| tree.node(id).rows.clone())
            .collect();
        owned.sort_unstable();
        assert_eq!(owned, (0..dataset.len()).collect::<Vec<_>>());

        let rebuilt: Vec<Transaction> = tree.reconstruct().into_iter().flatten().collect();
        assert_eq!(rebuilt.as_slice(), dataset.transactions());
    }

    #[test]
    fn ownership_holds_after_every_split() {
        for dataset in &[sample(), generate::toy(), generate::random(12, 15, generate::DEFAULT_SEED)] {
            let mut tree = PartitionTree::new(dataset);
            let mut pending: VecDeque<NodeId> = VecDeque::new();
            pending.push_back(ROOT);
            assert_owned_exactly_once(&tree, dataset);

            while let Some(id) = pending.pop_front() {
                let children = tree.split(id, 0.5).unwrap();
                assert_owned_exactly_once(&tree, dataset);
                pending.extend(children);
            }
            assert_eq!(&tree, &mine_by_partition(dataset, 0.5).unwrap());
        }
    }

    proptest! {
        #[test]
        fn every_transaction_is_owned_exactly_once(
            rows in prop::collection::vec(prop::collection::vec(0u64..9, 0..6), 1..20),
            fraction in 0.0f64..=1.0,
        ) {
            let dataset = Dataset::from_rows(rows);
            let tree = mine_by_partition(&dataset, fraction).unwrap();

            let mut owned: Vec<TransactionId> = (0..tree.len())
                .flat_map(|id| tree.node(id).rows.clone())
                .collect();
            owned.sort_unstable();
            prop_assert_eq!(owned, (0..dataset.len()).collect::<Vec<_>>());

            let rebuilt: Vec<Transaction> = tree.reconstruct().into_iter().flatten().collect();
            prop_assert_eq!(rebuilt.as_slice(), dataset.transactions());
        }
    }
}
