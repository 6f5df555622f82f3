//! Coverage metrics: which variables and interactions an evaluation ignores.
//!
//! A metric is a combination of [`MetricOptions`]. Together with the
//! externally computed [`ModelAnalysis`] of a feature model it yields the
//! [`VariableFilter`] and [`ExclusionSet`] consumed by the coverage functions.

use std::fmt;

use log::debug;

use crate::combination::Combinations;
use crate::error::{CoverageError, Result};
use crate::exclusion::{ExclusionSet, Interaction};
use crate::filter::VariableFilter;
use crate::gray::gray_code;
use crate::types::{Lit, Var};

/// Filtering of abstract or concrete features.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AbstractFilter {
    #[default]
    None,
    /// Ignore abstract features.
    Abstract,
    /// Ignore concrete features.
    Concrete,
}

/// Collapsing of atomic sets to a single representative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AtomicFilter {
    #[default]
    None,
    /// Use atomic sets of features.
    Features,
    /// Use atomic sets of literals.
    Literals,
}

/// One coverage metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MetricOptions {
    /// Ignore core features.
    pub core: bool,
    /// Ignore dead features.
    pub dead: bool,
    pub abstract_filter: AbstractFilter,
    pub atomic: AtomicFilter,
    /// Exclude interactions implied by parent-child relations.
    pub parent_child: bool,
}

impl MetricOptions {
    /// Stable textual key, e.g. `true_false_abstract_none_true`.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for MetricOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let abstract_filter = match self.abstract_filter {
            AbstractFilter::None => "none",
            AbstractFilter::Abstract => "abstract",
            AbstractFilter::Concrete => "concrete",
        };
        let atomic = match self.atomic {
            AtomicFilter::None => "none",
            AtomicFilter::Features => "features",
            AtomicFilter::Literals => "literals",
        };
        write!(
            f,
            "{}_{}_{}_{}_{}",
            self.core, self.dead, abstract_filter, atomic, self.parent_child
        )
    }
}

/// Analysis results of a feature model, computed elsewhere.
#[derive(Debug, Clone, Default)]
pub struct ModelAnalysis {
    /// Literals fixed in every valid configuration.
    pub core: Vec<Lit>,
    /// Literals never possible in a valid configuration.
    pub dead: Vec<Lit>,
    pub abstract_vars: Vec<Var>,
    pub concrete_vars: Vec<Var>,
    /// Atomic sets over literals (members always take equal values).
    pub atomic_literal_sets: Vec<Vec<Lit>>,
    /// Atomic sets over features.
    pub atomic_feature_sets: Vec<Vec<Lit>>,
    /// Parent-child literal pairs whose interaction is structurally implied.
    pub parent_child: Vec<(Lit, Lit)>,
}

impl ModelAnalysis {
    /// Variables ignored by `options` in a model of `width` variables.
    pub fn variable_filter(&self, width: usize, options: &MetricOptions) -> Result<VariableFilter> {
        let mut filter = VariableFilter::new();
        if options.core {
            filter.extend(self.core.iter().map(|l| l.var()));
        }
        if options.dead {
            filter.extend(self.dead.iter().map(|l| l.var()));
        }
        match options.abstract_filter {
            AbstractFilter::None => {}
            AbstractFilter::Abstract => filter.extend(self.abstract_vars.iter().copied()),
            AbstractFilter::Concrete => filter.extend(self.concrete_vars.iter().copied()),
        }
        let atomic_sets = match options.atomic {
            AtomicFilter::None => &[][..],
            AtomicFilter::Features => &self.atomic_feature_sets[..],
            AtomicFilter::Literals => &self.atomic_literal_sets[..],
        };
        for set in atomic_sets {
            let mut members: Vec<Var> = Vec::with_capacity(set.len());
            for var in set.iter().map(|l| l.var()) {
                let dropped = match options.abstract_filter {
                    AbstractFilter::None => false,
                    AbstractFilter::Abstract => self.abstract_vars.contains(&var),
                    AbstractFilter::Concrete => self.concrete_vars.contains(&var),
                };
                if !dropped && !members.contains(&var) {
                    members.push(var);
                }
            }
            // The first member represents the whole set.
            if members.len() > 1 {
                filter.extend(members.into_iter().skip(1));
            }
        }

        filter.validate(width)?;
        debug!("metric {}: {} of {} variables filtered", options, filter.len(), width);
        Ok(filter)
    }

    /// Interactions excluded by `options` for interaction size `t`.
    ///
    /// Parent-child pairs touching a filtered variable are dropped. For
    /// `t == 2` each remaining pair is excluded; for `t > 2` every extension of
    /// a pair by `t - 2` further surviving variables, under every sign
    /// assignment of the extension, is excluded.
    pub fn exclusion_set(
        &self,
        width: usize,
        t: usize,
        filter: &VariableFilter,
        options: &MetricOptions,
    ) -> Result<ExclusionSet> {
        let mut exclusions = ExclusionSet::new();
        if !options.parent_child || t < 2 {
            return Ok(exclusions);
        }

        let mut pairs = Vec::with_capacity(self.parent_child.len());
        for &(parent, child) in &self.parent_child {
            for lit in [parent, child] {
                if lit.var().index() >= width {
                    return Err(CoverageError::DataIntegrity(format!(
                        "parent-child literal {} is out of range for width {}",
                        lit.to_dimacs(),
                        width
                    )));
                }
            }
            if parent.var() != child.var() && !filter.contains(parent.var()) && !filter.contains(child.var()) {
                pairs.push([parent, child]);
            }
        }

        if t == 2 {
            for pair in &pairs {
                exclusions.insert(Interaction::new(pair.iter().copied())?);
            }
        } else if t - 2 <= filter.surviving(width).len() {
            let surviving = filter.surviving_literals(width);
            if t - 2 >= usize::BITS as usize {
                return Err(CoverageError::InvalidArgument(format!(
                    "t = {} is too large to extend parent-child pairs",
                    t
                )));
            }
            let gray = gray_code(t - 2);
            let mut combinations = Combinations::new(t - 2, surviving.len());
            let mut select = vec![Lit::from_dimacs(1); t - 2];
            while let Some(combo) = combinations.advance() {
                for pair in &pairs {
                    let touches = |s: &[Lit]| s.iter().any(|l| l.var() == pair[0].var() || l.var() == pair[1].var());
                    combo.select_into(&surviving, &mut select);
                    if touches(&select) {
                        continue;
                    }
                    let extend = |select: &[Lit]| Interaction::new(pair.iter().chain(select).copied());
                    exclusions.insert(extend(&select)?);
                    for &g in &gray {
                        select[g].flip();
                        exclusions.insert(extend(&select)?);
                    }
                }
            }
        }

        debug!(
            "metric {}: {} parent-child pairs, {} excluded {}-wise interactions",
            options,
            pairs.len(),
            exclusions.len(),
            t
        );
        Ok(exclusions)
    }
}
