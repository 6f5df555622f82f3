//! Canonical interactions and the set of interactions excluded from coverage
//! accounting.

use std::collections::HashSet;
use std::fmt;

use crate::error::{CoverageError, Result};
use crate::filter::VariableFilter;
use crate::types::Lit;

/// A set of literals over distinct variables, stored sorted.
///
/// Two interactions are equal iff their sorted literal arrays are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Interaction(Box<[Lit]>);

impl Interaction {
    /// Canonicalizes `literals`.
    ///
    /// Fails with [`CoverageError::DataIntegrity`] if two literals share a
    /// variable.
    pub fn new(literals: impl IntoIterator<Item = Lit>) -> Result<Self> {
        let mut literals: Vec<Lit> = literals.into_iter().collect();
        literals.sort_unstable();
        let mut vars: Vec<_> = literals.iter().map(|l| l.var()).collect();
        vars.sort_unstable();
        if vars.windows(2).any(|w| w[0] == w[1]) {
            return Err(CoverageError::DataIntegrity(format!(
                "interaction {:?} repeats a variable",
                literals.iter().map(|l| l.to_dimacs()).collect::<Vec<_>>()
            )));
        }
        Ok(Self(literals.into_boxed_slice()))
    }

    /// Canonicalizes DIMACS literals.
    pub fn from_dimacs(literals: &[i32]) -> Result<Self> {
        let lits = literals
            .iter()
            .map(|&l| {
                Lit::try_from_dimacs(l)
                    .ok_or_else(|| CoverageError::DataIntegrity("literal 0 in interaction".to_string()))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(lits)
    }

    pub fn literals(&self) -> &[Lit] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Interaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, lit) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", lit)?;
        }
        write!(f, "}}")
    }
}

/// Interactions removed from both the enumerated universe and the coverage
/// counts.
///
/// Iteration follows insertion order; membership is a hash lookup.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    order: Vec<Interaction>,
    members: HashSet<Box<[Lit]>>,
}

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an interaction. Returns false if it was already present.
    pub fn insert(&mut self, interaction: Interaction) -> bool {
        if !self.members.insert(interaction.0.clone()) {
            return false;
        }
        self.order.push(interaction);
        true
    }

    /// Membership test for an already sorted literal slice.
    #[inline]
    pub fn contains_sorted(&self, sorted: &[Lit]) -> bool {
        self.members.contains(sorted)
    }

    pub fn contains(&self, interaction: &Interaction) -> bool {
        self.members.contains(interaction.literals())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Interaction> {
        self.order.iter()
    }

    /// Checks that every interaction has exactly `t` literals over variables
    /// of `1..=width` that survive `filter`.
    pub fn validate(&self, t: usize, width: usize, filter: &VariableFilter) -> Result<()> {
        for interaction in &self.order {
            if interaction.len() != t {
                return Err(CoverageError::DataIntegrity(format!(
                    "excluded interaction {} has {} literals, expected {}",
                    interaction,
                    interaction.len(),
                    t
                )));
            }
            for lit in interaction.literals() {
                let var = lit.var();
                if var.index() >= width || filter.contains(var) {
                    return Err(CoverageError::DataIntegrity(format!(
                        "excluded interaction {} references {} which is filtered or out of range",
                        interaction, var
                    )));
                }
            }
        }
        Ok(())
    }
}

impl FromIterator<Interaction> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = Interaction>>(iter: I) -> Self {
        let mut set = Self::new();
        for interaction in iter {
            set.insert(interaction);
        }
        set
    }
}

impl<'a> IntoIterator for &'a ExclusionSet {
    type Item = &'a Interaction;
    type IntoIter = std::slice::Iter<'a, Interaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.order.iter()
    }
}
