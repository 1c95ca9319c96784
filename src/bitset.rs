use std::{
    hash::{Hash, Hasher},
    ops::BitAnd,
};

use bitvec::prelude::*;

use crate::{error::MiningError, types::DenseIndex};

const HASH_MIX: u64 = 0x9e37_79b9_7f4a_7c15;

/// Fixed-width bit vector over dense item positions.
///
/// Bits past `width()` in the last storage word are always zero.
#[derive(Debug, Clone)]
pub struct Bitset {
    bits: BitVec<u64, Lsb0>,
}

impl Bitset {
    pub fn new(width: usize) -> Self {
        Self {
            bits: bitvec![u64, Lsb0; 0; width],
        }
    }

    pub fn width(&self) -> usize {
        self.bits.len()
    }

    pub fn set(&mut self, bit: DenseIndex) {
        self.bits.set(bit, true);
    }

    pub fn reset(&mut self, bit: DenseIndex) {
        self.bits.set(bit, false);
    }

    pub fn get(&self, bit: DenseIndex) -> bool {
        self.bits[bit]
    }

    /// Population count.
    pub fn count(&self) -> usize {
        self.bits.count_ones()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.not_any()
    }

    pub fn ones(&self) -> impl Iterator<Item = DenseIndex> + '_ {
        self.bits.iter_ones()
    }

    pub fn words(&self) -> &[u64] {
        self.bits.as_raw_slice()
    }

    /// Bitwise AND, checking that both sides come from the same index.
    pub fn try_and(&self, other: &Bitset) -> Result<Bitset, MiningError> {
        if self.width() != other.width() {
            return Err(MiningError::BitsetWidthMismatch {
                left: self.width(),
                right: other.width(),
            });
        }
        let mut bits = self.bits.clone();
        bits &= other.bits.as_bitslice();
        Ok(Bitset { bits })
    }

    /// Popcount of `self & other` without allocating the intersection.
    pub fn intersection_count(&self, other: &Bitset) -> usize {
        assert_eq!(self.width(), other.width(), "bitset width mismatch");
        self.words()
            .iter()
            .zip(other.words())
            .map(|(a, b)| (a & b).count_ones() as usize)
            .sum()
    }

    /// True iff every bit set here is also set in `other`.
    pub fn is_subset_of(&self, other: &Bitset) -> bool {
        assert_eq!(self.width(), other.width(), "bitset width mismatch");
        self.words()
            .iter()
            .zip(other.words())
            .all(|(a, b)| a & !b == 0)
    }

    /// Deterministic combine-hash over the word array, seeded by the width.
    pub fn combined_hash(&self) -> u64 {
        self.words().iter().fold(self.width() as u64, |seed, &word| {
            seed ^ word
                .wrapping_add(HASH_MIX)
                .wrapping_add(seed << 6)
                .wrapping_add(seed >> 2)
        })
    }
}

impl PartialEq for Bitset {
    fn eq(&self, other: &Self) -> bool {
        self.width() == other.width() && self.words() == other.words()
    }
}

impl Eq for Bitset {}

impl Hash for Bitset {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.combined_hash());
    }
}

impl<'a> BitAnd<&'a Bitset> for &'a Bitset {
    type Output = Bitset;

    /// Panics when the widths differ: mixing indices is a caller bug.
    fn bitand(self, other: &'a Bitset) -> Bitset {
        match self.try_and(other) {
            Ok(bits) => bits,
            Err(err) => panic!("{}", err),
        }
    }
}
