//! Bit-indexed sample coverage.
//!
//! For every variable the index keeps two bit sets over configuration
//! positions: one marking configurations where the variable is true, one
//! where it is false. An unassigned (don't-care) variable sets neither bit, so
//! a configuration only covers an interaction if it explicitly assigns every
//! literal of it.
//!
//! A coverage query ANDs the bit sets of the queried literals word by word and
//! reports the lowest surviving bit. The cost is `O(t * W)` where `W` is the
//! number of 64-bit words per set, and a query never allocates.

use log::debug;

use crate::bitset::{first_common, BitSet};
use crate::error::{CoverageError, Result};
use crate::sample::Sample;
use crate::types::Lit;

/// Read-only index answering "which configuration covers this tuple first?".
#[derive(Debug, Clone)]
pub struct SampleBitIndex {
    /// Number of configurations.
    size: usize,
    /// Number of variables.
    width: usize,
    /// `sets[2 * v]`: configurations with `x(v+1) = true`,
    /// `sets[2 * v + 1]`: configurations with `x(v+1) = false`.
    sets: Vec<BitSet>,
}

impl SampleBitIndex {
    /// Builds the index for `sample` over `width` variables.
    ///
    /// Fails with [`CoverageError::InvalidArgument`] on an empty sample and
    /// with [`CoverageError::DataIntegrity`] if the sample width differs from
    /// `width`.
    pub fn new(sample: &Sample, width: usize) -> Result<Self> {
        if sample.is_empty() {
            return Err(CoverageError::InvalidArgument(
                "cannot index an empty sample".to_string(),
            ));
        }
        if sample.width() != width {
            return Err(CoverageError::DataIntegrity(format!(
                "sample width {} does not match literal width {}",
                sample.width(),
                width
            )));
        }

        let size = sample.len();
        let mut sets = vec![BitSet::new(size); 2 * width];
        for (position, configuration) in sample.iter().enumerate() {
            for lit in configuration.literals() {
                sets[Self::slot(lit)].insert(position);
            }
        }
        debug!(
            "SampleBitIndex::new(size = {}, width = {}, words = {})",
            size,
            width,
            BitSet::words_for(size)
        );

        Ok(Self { size, width, sets })
    }

    /// Builds the index using the sample's own width.
    pub fn from_sample(sample: &Sample) -> Result<Self> {
        Self::new(sample, sample.width())
    }

    #[inline]
    fn slot(lit: Lit) -> usize {
        2 * lit.var().index() + usize::from(lit.is_negative())
    }

    /// Number of indexed configurations.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of variables.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Configurations assigning `lit`.
    pub fn configurations_with(&self, lit: Lit) -> Result<&BitSet> {
        self.check(lit)?;
        Ok(&self.sets[Self::slot(lit)])
    }

    fn check(&self, lit: Lit) -> Result<()> {
        if lit.var().index() >= self.width {
            return Err(CoverageError::DataIntegrity(format!(
                "literal {} is out of range for width {}",
                lit.to_dimacs(),
                self.width
            )));
        }
        Ok(())
    }

    /// 1-based position of the first configuration covering every literal of
    /// `literals`, or 0 if none does.
    ///
    /// An empty tuple is covered by the first configuration.
    pub fn index(&self, literals: &[Lit]) -> Result<usize> {
        for &lit in literals {
            self.check(lit)?;
        }
        Ok(self.index_unchecked(literals))
    }

    /// Same as [`index`][SampleBitIndex::index] for literals already known to
    /// be in range.
    ///
    /// # Panics
    ///
    /// Panics if a literal is out of range.
    #[inline]
    pub fn index_unchecked(&self, literals: &[Lit]) -> usize {
        match literals {
            [] => 1,
            [a] => first(&[self.sets[Self::slot(*a)].words()]),
            [a, b] => first(&[self.sets[Self::slot(*a)].words(), self.sets[Self::slot(*b)].words()]),
            [a, b, c] => first(&[
                self.sets[Self::slot(*a)].words(),
                self.sets[Self::slot(*b)].words(),
                self.sets[Self::slot(*c)].words(),
            ]),
            _ => self.index_general(literals),
        }
    }

    fn index_general(&self, literals: &[Lit]) -> usize {
        let words = BitSet::words_for(self.size);
        for w in 0..words {
            let mut acc = !0u64;
            for &lit in literals {
                acc &= self.sets[Self::slot(lit)].words()[w];
                if acc == 0 {
                    break;
                }
            }
            if acc != 0 {
                return w * BitSet::BITS_PER_WORD + acc.trailing_zeros() as usize + 1;
            }
        }
        0
    }

    /// Returns true if any configuration covers `literals`.
    pub fn is_covered(&self, literals: &[Lit]) -> Result<bool> {
        Ok(self.index(literals)? > 0)
    }
}

#[inline]
fn first(sets: &[&[u64]]) -> usize {
    first_common(sets).map_or(0, |i| i + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::Configuration;

    fn lits(xs: &[i32]) -> Vec<Lit> {
        xs.iter().copied().map(Lit::from).collect()
    }

    fn two_config_sample() -> Sample {
        Sample::new(vec![
            Configuration::from_bools(&[true, true]),
            Configuration::from_bools(&[true, false]),
        ])
        .unwrap()
    }

    #[test]
    fn test_index_pairs() {
        let index = SampleBitIndex::from_sample(&two_config_sample()).unwrap();
        assert_eq!(index.index(&lits(&[1, 2])).unwrap(), 1);
        assert_eq!(index.index(&lits(&[1, -2])).unwrap(), 2);
        assert_eq!(index.index(&lits(&[-1, -2])).unwrap(), 0);
        assert_eq!(index.index(&lits(&[-1, 2])).unwrap(), 0);
        assert_eq!(index.index(&lits(&[-2])).unwrap(), 2);
        assert_eq!(index.index(&[]).unwrap(), 1);
    }

    #[test]
    fn test_empty_sample_fails() {
        let err = SampleBitIndex::new(&Sample::default(), 0).unwrap_err();
        assert!(matches!(err, CoverageError::InvalidArgument(_)));
    }

    #[test]
    fn test_width_mismatch_fails() {
        let err = SampleBitIndex::new(&two_config_sample(), 3).unwrap_err();
        assert!(matches!(err, CoverageError::DataIntegrity(_)));
    }

    #[test]
    fn test_out_of_range_literal() {
        let index = SampleBitIndex::from_sample(&two_config_sample()).unwrap();
        let err = index.index(&lits(&[1, 3])).unwrap_err();
        assert!(matches!(err, CoverageError::DataIntegrity(_)));
    }

    #[test]
    fn test_dont_care_is_not_coverage() {
        let sample = Sample::new(vec![
            Configuration::from_partial(vec![Some(true), None]),
            Configuration::from_partial(vec![Some(true), Some(false)]),
        ])
        .unwrap();
        let index = SampleBitIndex::from_sample(&sample).unwrap();
        assert_eq!(index.index(&lits(&[1, -2])).unwrap(), 2);
        assert_eq!(index.index(&lits(&[1, 2])).unwrap(), 0);
        assert_eq!(index.configurations_with(Lit::from(2)).unwrap().len(), 0);
    }

    #[test]
    fn test_index_across_words() {
        // Variable 1 true only in configuration 130, variable 2 true from 100 on.
        let configs = (0..150)
            .map(|i| Configuration::from_bools(&[i == 130, i >= 100, i % 2 == 0, i % 3 == 0, i % 5 == 0]))
            .collect();
        let sample = Sample::new(configs).unwrap();
        let index = SampleBitIndex::from_sample(&sample).unwrap();
        assert_eq!(index.index(&lits(&[2])).unwrap(), 101);
        assert_eq!(index.index(&lits(&[1, 2])).unwrap(), 131);
        assert_eq!(index.index(&lits(&[-1, 2, 3, 4])).unwrap(), 103);
        assert_eq!(index.index(&lits(&[2, 3, 4, 5])).unwrap(), 121);
        assert_eq!(index.index(&lits(&[1, -2])).unwrap(), 0);
    }

    #[test]
    fn test_specialized_paths_agree_with_general() {
        let configs = (0..70u32)
            .map(|i| Configuration::from_bools(&[i % 2 == 0, i % 3 == 0, i % 7 == 0, i > 64]))
            .collect();
        let index = SampleBitIndex::from_sample(&Sample::new(configs).unwrap()).unwrap();
        let queries: [&[i32]; 5] = [&[1], &[-1, 2], &[1, -2, 3], &[-3, 4], &[2, 3, -4]];
        for q in queries {
            let q = lits(q);
            assert_eq!(index.index_unchecked(&q), index.index_general(&q), "{:?}", q);
        }
    }
}
