//! Word-packed growable bitset.
//!
//! Used for code point sets (up to `0x110000` bits), visited sets during
//! graph traversal, and token sets keyed by ordinal.

use crate::charset::CharRange;

const WORD_BITS: u32 = u64::BITS;

/// A growable set of `u32` values stored as packed 64-bit words.
#[derive(Debug, Clone, Default)]
pub struct BitSet {
    words: Vec<u64>,
}

impl BitSet {
    /// Words up to and including the last non-zero one.
    fn significant_words(&self) -> &[u64] {
        let len = self
            .words
            .iter()
            .rposition(|word| *word != 0)
            .map_or(0, |pos| pos + 1);
        &self.words[..len]
    }
}

impl PartialEq for BitSet {
    fn eq(&self, other: &Self) -> bool {
        self.significant_words() == other.significant_words()
    }
}

impl Eq for BitSet {}

impl std::hash::Hash for BitSet {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.significant_words().hash(state);
    }
}

#[inline]
const fn word_index(bit: u32) -> usize {
    (bit / WORD_BITS) as usize
}

/// Mask with bits `start..=end` set (both within one word).
#[inline]
const fn span_mask(start: u32, end: u32) -> u64 {
    (u64::MAX >> (WORD_BITS - 1 - end)) & (u64::MAX << start)
}

impl BitSet {
    #[must_use]
    pub const fn new() -> Self {
        Self { words: Vec::new() }
    }

    /// Create a set able to hold `bits` values without reallocating.
    #[must_use]
    pub fn with_capacity(bits: u32) -> Self {
        Self {
            words: vec![0; word_index(bits) + 1],
        }
    }

    /// Build a set containing every code point covered by `ranges`.
    #[must_use]
    pub fn from_ranges(ranges: &[CharRange]) -> Self {
        let mut set = Self::new();
        for range in ranges {
            set.insert_range(range.lo, range.hi);
        }
        set
    }

    fn grow_to(&mut self, bit: u32) {
        let needed = word_index(bit) + 1;
        if self.words.len() < needed {
            self.words.resize(needed, 0);
        }
    }

    /// Insert a value. Returns `true` if it was not present before.
    pub fn insert(&mut self, bit: u32) -> bool {
        self.grow_to(bit);
        let word = &mut self.words[word_index(bit)];
        let mask = 1u64 << (bit % WORD_BITS);
        let fresh = *word & mask == 0;
        *word |= mask;
        fresh
    }

    /// Insert every value in `lo..=hi`.
    pub fn insert_range(&mut self, lo: u32, hi: u32) {
        if lo > hi {
            return;
        }
        self.grow_to(hi);
        let (first, last) = (word_index(lo), word_index(hi));
        for w in first..=last {
            let start = if w == first { lo % WORD_BITS } else { 0 };
            let end = if w == last { hi % WORD_BITS } else { WORD_BITS - 1 };
            self.words[w] |= span_mask(start, end);
        }
    }

    pub fn remove(&mut self, bit: u32) {
        if let Some(word) = self.words.get_mut(word_index(bit)) {
            *word &= !(1u64 << (bit % WORD_BITS));
        }
    }

    #[must_use]
    pub fn contains(&self, bit: u32) -> bool {
        self.words
            .get(word_index(bit))
            .is_some_and(|word| word & (1u64 << (bit % WORD_BITS)) != 0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|word| *word == 0)
    }

    /// Number of values in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.iter().map(|word| word.count_ones() as usize).sum()
    }

    pub fn clear(&mut self) {
        self.words.iter_mut().for_each(|word| *word = 0);
    }

    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.words
            .iter()
            .zip(&other.words)
            .any(|(a, b)| a & b != 0)
    }

    /// Keep only the values also present in `other`.
    pub fn intersect_with(&mut self, other: &Self) {
        for (idx, word) in self.words.iter_mut().enumerate() {
            *word &= other.words.get(idx).copied().unwrap_or(0);
        }
    }

    /// Add every value of `other`. Returns `true` if the set changed.
    pub fn union_with(&mut self, other: &Self) -> bool {
        if self.words.len() < other.words.len() {
            self.words.resize(other.words.len(), 0);
        }
        let mut changed = false;
        for (word, theirs) in self.words.iter_mut().zip(&other.words) {
            let merged = *word | theirs;
            changed |= merged != *word;
            *word = merged;
        }
        changed
    }

    /// Flip every bit in `0..limit`. `limit` must be a multiple of 64.
    pub fn complement_within(&mut self, limit: u32) {
        debug_assert_eq!(limit % WORD_BITS, 0);
        self.words.resize(word_index(limit), 0);
        for word in &mut self.words {
            *word = !*word;
        }
    }

    /// Iterate the values in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.words.iter().enumerate().flat_map(|(idx, &word)| {
            let base = idx as u32 * WORD_BITS;
            let mut bits = word;
            std::iter::from_fn(move || {
                if bits == 0 {
                    return None;
                }
                let offset = bits.trailing_zeros();
                bits &= bits - 1;
                Some(base + offset)
            })
        })
    }

    /// Convert to the minimal ascending list of inclusive ranges.
    #[must_use]
    pub fn to_ranges(&self) -> Vec<CharRange> {
        let mut ranges: Vec<CharRange> = Vec::new();
        for bit in self.iter() {
            match ranges.last_mut() {
                Some(last) if last.hi + 1 == bit => last.hi = bit,
                _ => ranges.push(CharRange::single(bit)),
            }
        }
        ranges
    }
}

impl FromIterator<u32> for BitSet {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        let mut set = Self::new();
        for bit in iter {
            set.insert(bit);
        }
        set
    }
}

impl Extend<u32> for BitSet {
    fn extend<I: IntoIterator<Item = u32>>(&mut self, iter: I) {
        for bit in iter {
            self.insert(bit);
        }
    }
}
