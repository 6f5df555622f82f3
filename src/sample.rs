//! Configurations and ordered samples of configurations.
//!
//! A [`Configuration`] assigns every variable `1..=width` either a polarity
//! or nothing (don't-care). A [`Sample`] is an ordered list of configurations
//! sharing the same width; its order decides which configuration covers an
//! interaction first.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::{CoverageError, Result};
use crate::types::{Lit, Var};

/// A (possibly partial) assignment of all variables of a model.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Configuration {
    values: Vec<Option<bool>>,
}

impl Configuration {
    /// Total configuration: `values[i]` is the value of variable `i + 1`.
    pub fn from_bools(values: &[bool]) -> Self {
        Self {
            values: values.iter().map(|&b| Some(b)).collect(),
        }
    }

    /// Partial configuration: `None` marks a don't-care variable.
    pub fn from_partial(values: Vec<Option<bool>>) -> Self {
        Self { values }
    }

    /// Configuration in positional DIMACS form: position `i` holds `i + 1`,
    /// `-(i + 1)` or `0` (unassigned).
    pub fn from_dimacs(literals: &[i32]) -> Result<Self> {
        let values = literals
            .iter()
            .enumerate()
            .map(|(i, &lit)| {
                let expected = i as i64 + 1;
                match lit {
                    0 => Ok(None),
                    l if i64::from(l).abs() == expected => Ok(Some(l > 0)),
                    l => Err(CoverageError::DataIntegrity(format!(
                        "literal {} at position {} does not refer to variable {}",
                        l, i, expected
                    ))),
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { values })
    }

    /// Number of variables this configuration spans.
    pub fn width(&self) -> usize {
        self.values.len()
    }

    /// Value of `var`, or `None` if unassigned or out of range.
    pub fn value(&self, var: Var) -> Option<bool> {
        self.values.get(var.index()).copied().flatten()
    }

    /// Returns true if the configuration assigns `lit`'s polarity to its variable.
    pub fn satisfies(&self, lit: Lit) -> bool {
        self.value(lit.var()) == Some(lit.is_positive())
    }

    /// Assigned literals in variable order.
    pub fn literals(&self) -> impl Iterator<Item = Lit> + '_ {
        self.values.iter().enumerate().filter_map(|(i, v)| {
            let var = Var::new(i as u32 + 1);
            v.map(|b| if b { var.pos() } else { var.neg() })
        })
    }

    /// Returns true if every variable is assigned.
    pub fn is_total(&self) -> bool {
        self.values.iter().all(Option::is_some)
    }
}

/// An ordered list of configurations of equal width.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sample {
    width: usize,
    configurations: Vec<Configuration>,
}

impl Sample {
    /// Builds a sample whose width is taken from the first configuration.
    ///
    /// Fails with [`CoverageError::DataIntegrity`] if widths disagree.
    pub fn new(configurations: Vec<Configuration>) -> Result<Self> {
        let width = configurations.first().map_or(0, Configuration::width);
        Self::with_width(width, configurations)
    }

    /// Builds a sample over exactly `width` variables.
    pub fn with_width(width: usize, configurations: Vec<Configuration>) -> Result<Self> {
        if let Some((i, c)) = configurations.iter().enumerate().find(|(_, c)| c.width() != width) {
            return Err(CoverageError::DataIntegrity(format!(
                "configuration {} has width {}, expected {}",
                i,
                c.width(),
                width
            )));
        }
        Ok(Self { width, configurations })
    }

    /// Number of variables per configuration.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn len(&self) -> usize {
        self.configurations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configurations.is_empty()
    }

    pub fn configurations(&self) -> &[Configuration] {
        &self.configurations
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Configuration> {
        self.configurations.iter()
    }

    /// The first `k` configurations (all of them if `k >= len`).
    pub fn prefix(&self, k: usize) -> Sample {
        Sample {
            width: self.width,
            configurations: self.configurations[..k.min(self.len())].to_vec(),
        }
    }

    /// The first `floor(ratio * len)` configurations.
    pub fn ratio_prefix(&self, ratio: f64) -> Result<Sample> {
        if !(0.0..=1.0).contains(&ratio) {
            return Err(CoverageError::InvalidArgument(format!(
                "sample ratio {} is outside of [0, 1]",
                ratio
            )));
        }
        Ok(self.prefix((ratio * self.len() as f64).floor() as usize))
    }

    /// A copy with the configuration order shuffled by a seeded RNG.
    ///
    /// The same seed always yields the same order.
    pub fn shuffled(&self, seed: u64) -> Sample {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut configurations = self.configurations.clone();
        configurations.shuffle(&mut rng);
        Sample {
            width: self.width,
            configurations,
        }
    }
}

impl<'a> IntoIterator for &'a Sample {
    type Item = &'a Configuration;
    type IntoIter = std::slice::Iter<'a, Configuration>;

    fn into_iter(self) -> Self::IntoIter {
        self.configurations.iter()
    }
}
