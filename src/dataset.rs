use std::{
    fmt::{self, Display, Formatter},
    iter::FromIterator,
    ops::Index,
};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::types::{Item, TransactionId};

/// One session: a set of unique items, kept sorted.
///
/// Serialized as a plain list of items. Deserializing goes through
/// [`Transaction::new`], so duplicates collapse and order is restored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<Item>", into = "Vec<Item>")]
pub struct Transaction {
    items: Vec<Item>,
}

impl Transaction {
    /// Duplicates collapse to a single occurrence.
    pub fn new<I: IntoIterator<Item = Item>>(items: I) -> Self {
        Self {
            items: items.into_iter().sorted_unstable().dedup().collect(),
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, item: Item) -> bool {
        self.items.binary_search(&item).is_ok()
    }

    /// True iff this transaction is a superset of `items`.
    pub fn contains_all(&self, items: &[Item]) -> bool {
        items.iter().all(|&item| self.contains(item))
    }

    pub fn remove(&mut self, item: Item) -> bool {
        match self.items.binary_search(&item) {
            Ok(pos) => {
                self.items.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    pub fn remove_all(&mut self, items: &[Item]) {
        self.items.retain(|item| !items.contains(item));
    }
}

impl From<Vec<Item>> for Transaction {
    fn from(items: Vec<Item>) -> Self {
        Self::new(items)
    }
}

impl From<Transaction> for Vec<Item> {
    fn from(transaction: Transaction) -> Self {
        transaction.items
    }
}

impl FromIterator<Item> for Transaction {
    fn from_iter<I: IntoIterator<Item = Item>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl Display for Transaction {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{{ ")?;
        for item in &self.items {
            write!(f, "{} ", item)?;
        }
        write!(f, "}}")
    }
}

/// An ordered collection of transactions. A transaction's position is its
/// identity in every reported match list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    transactions: Vec<Transaction>,
}

impl Dataset {
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Self { transactions }
    }

    pub fn from_rows(rows: Vec<Vec<Item>>) -> Self {
        rows.into_iter().map(Transaction::new).collect()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub(crate) fn transactions_mut(&mut self) -> &mut [Transaction] {
        &mut self.transactions
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Transaction> {
        self.transactions.iter()
    }

    pub fn get(&self, id: TransactionId) -> Option<&Transaction> {
        self.transactions.get(id)
    }

    pub fn push(&mut self, transaction: Transaction) {
        self.transactions.push(transaction);
    }

    /// Copies the listed transactions, in the given order, into a new dataset.
    pub fn subset(&self, ids: &[TransactionId]) -> Dataset {
        ids.iter()
            .filter_map(|&id| self.transactions.get(id).cloned())
            .collect()
    }

    /// Sum of transaction sizes.
    pub fn total_items(&self) -> usize {
        self.transactions.iter().map(Transaction::len).sum()
    }

    pub fn into_transactions(self) -> Vec<Transaction> {
        self.transactions
    }
}

impl FromIterator<Transaction> for Dataset {
    fn from_iter<I: IntoIterator<Item = Transaction>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl Index<TransactionId> for Dataset {
    type Output = Transaction;

    fn index(&self, id: TransactionId) -> &Transaction {
        &self.transactions[id]
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Transaction;
    type IntoIter = std::slice::Iter<'a, Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.transactions.iter()
    }
}

impl Display for Dataset {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        for (id, transaction) in self.transactions.iter().enumerate() {
            writeln!(f, "id[{}] = {}", id, transaction)?;
        }
        Ok(())
    }
}
