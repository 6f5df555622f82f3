//! Fixed-width bit set over configuration indices.
//!
//! Each sample gets two of these per variable (one per polarity). The width is
//! fixed at construction, so intersections are plain word-wise ANDs.

/// A bit set backed by a vector of u64 words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitSet {
    /// Storage: each u64 holds 64 bits
    words: Vec<u64>,
    /// Number of addressable bits
    width: usize,
}

impl BitSet {
    /// Number of bits per word.
    pub const BITS_PER_WORD: usize = 64;

    /// Creates an empty bit set able to hold `width` bits.
    pub fn new(width: usize) -> Self {
        Self {
            words: vec![0; Self::words_for(width)],
            width,
        }
    }

    /// Number of words needed to store `bits` bits.
    #[inline]
    pub fn words_for(bits: usize) -> usize {
        bits.div_ceil(Self::BITS_PER_WORD)
    }

    /// Returns the width in bits.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the number of set bits.
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Returns true if no bits are set.
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Raw word storage.
    #[inline]
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Gets the word index and bit position for a given bit index.
    #[inline]
    fn word_and_bit(index: usize) -> (usize, usize) {
        let word = index / Self::BITS_PER_WORD;
        let bit = index % Self::BITS_PER_WORD;
        (word, bit)
    }

    /// Returns true if the bit at the given index is set.
    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        if index >= self.width {
            return false;
        }
        let (word_idx, bit_idx) = Self::word_and_bit(index);
        (self.words[word_idx] & (1u64 << bit_idx)) != 0
    }

    /// Sets the bit at the given index. Returns true if the bit was not previously set.
    ///
    /// # Panics
    ///
    /// Panics if `index >= width`.
    #[inline]
    pub fn insert(&mut self, index: usize) -> bool {
        assert!(index < self.width, "bit {} out of range for width {}", index, self.width);
        let (word_idx, bit_idx) = Self::word_and_bit(index);
        let mask = 1u64 << bit_idx;
        let was_clear = (self.words[word_idx] & mask) == 0;
        self.words[word_idx] |= mask;
        was_clear
    }

    /// Returns the index of the lowest set bit, if any.
    pub fn first(&self) -> Option<usize> {
        first_common(&[self.words()])
    }

    /// Intersects this set with `other` in place.
    ///
    /// # Panics
    ///
    /// Panics if the widths differ.
    pub fn intersect_with(&mut self, other: &BitSet) {
        assert_eq!(self.width, other.width, "bit set widths differ");
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a &= *b;
        }
    }

    /// Returns an iterator over all set bit indices.
    pub fn iter(&self) -> BitSetIter<'_> {
        BitSetIter {
            bitset: self,
            word_idx: 0,
            current_word: self.words.first().copied().unwrap_or(0),
        }
    }
}

/// Finds the lowest bit index set in *every* word slice.
///
/// Slices must have equal length. The scan stops at the first word whose
/// intersection is non-zero, so no intermediate set is materialized.
#[inline]
pub fn first_common(sets: &[&[u64]]) -> Option<usize> {
    let Some((head, rest)) = sets.split_first() else {
        return None;
    };
    for (word_idx, &word) in head.iter().enumerate() {
        let mut acc = word;
        for set in rest {
            if acc == 0 {
                break;
            }
            acc &= set[word_idx];
        }
        if acc != 0 {
            return Some(word_idx * BitSet::BITS_PER_WORD + acc.trailing_zeros() as usize);
        }
    }
    None
}

/// Iterator over set bits in a BitSet.
pub struct BitSetIter<'a> {
    bitset: &'a BitSet,
    word_idx: usize,
    current_word: u64,
}

impl Iterator for BitSetIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current_word != 0 {
                let bit_idx = self.current_word.trailing_zeros() as usize;
                self.current_word &= self.current_word - 1; // Clear lowest set bit
                return Some(self.word_idx * BitSet::BITS_PER_WORD + bit_idx);
            }

            self.word_idx += 1;
            if self.word_idx >= self.bitset.words.len() {
                return None;
            }
            self.current_word = self.bitset.words[self.word_idx];
        }
    }
}
