use std::collections::HashMap;

pub type Item = u64;
pub type TransactionId = usize;
pub type DenseIndex = usize;
pub type Itemset = Vec<Item>;

pub type ReverseLookup = HashMap<Item, DenseIndex>;

pub type NodeId = usize;
