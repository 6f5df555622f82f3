//! Variable filter: variables excluded from interaction enumeration.

use std::collections::BTreeSet;

use crate::error::{CoverageError, Result};
use crate::types::{Lit, Var};

/// A set of variables that take no part in any enumerated interaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableFilter {
    vars: BTreeSet<Var>,
}

impl VariableFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter from variables.
    pub fn from_vars(vars: impl IntoIterator<Item = Var>) -> Self {
        Self {
            vars: vars.into_iter().collect(),
        }
    }

    /// Filter from literals; only the variable of each literal matters.
    pub fn from_lits(lits: impl IntoIterator<Item = Lit>) -> Self {
        Self::from_vars(lits.into_iter().map(Lit::var))
    }

    pub fn insert(&mut self, var: Var) -> bool {
        self.vars.insert(var)
    }

    pub fn extend(&mut self, vars: impl IntoIterator<Item = Var>) {
        self.vars.extend(vars);
    }

    pub fn contains(&self, var: Var) -> bool {
        self.vars.contains(&var)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Var> + '_ {
        self.vars.iter().copied()
    }

    /// Checks that every filtered variable exists in a model of `width` variables.
    pub fn validate(&self, width: usize) -> Result<()> {
        match self.vars.iter().find(|v| v.index() >= width) {
            Some(v) => Err(CoverageError::DataIntegrity(format!(
                "filtered variable {} is out of range for width {}",
                v, width
            ))),
            None => Ok(()),
        }
    }

    /// Surviving variables of `1..=width`, ascending.
    pub fn surviving(&self, width: usize) -> Vec<Var> {
        (1..=width as u32)
            .map(Var::new)
            .filter(|v| !self.contains(*v))
            .collect()
    }

    /// Positive literals of the surviving variables, ascending.
    ///
    /// This is the per-position literal array the combination enumerator
    /// selects from.
    pub fn surviving_literals(&self, width: usize) -> Vec<Lit> {
        self.surviving(width).into_iter().map(Var::pos).collect()
    }
}

impl FromIterator<Var> for VariableFilter {
    fn from_iter<I: IntoIterator<Item = Var>>(iter: I) -> Self {
        Self::from_vars(iter)
    }
}
