//! T-wise coverage accounting.
//!
//! Every `t`-combination of surviving variables is visited once; for each of
//! its `2^t` sign assignments (walked in Gray-code order) the
//! [`SampleBitIndex`] reports the first covering configuration. Workers tally
//! into private state, which is merged by element-wise sum after the scan, so
//! the result does not depend on the number of workers.
//!
//! # Example
//!
//! ```
//! use twise_coverage::coverage::{compute_coverage_count, compute_partial_coverage_histogram};
//! use twise_coverage::exclusion::ExclusionSet;
//! use twise_coverage::filter::VariableFilter;
//! use twise_coverage::sample::{Configuration, Sample};
//!
//! let sample = Sample::new(vec![
//!     Configuration::from_bools(&[true, true]),
//!     Configuration::from_bools(&[true, false]),
//! ])
//! .unwrap();
//! let filter = VariableFilter::new();
//! let exclusions = ExclusionSet::new();
//!
//! let histogram = compute_partial_coverage_histogram(&sample, 2, &filter, &exclusions).unwrap();
//! assert_eq!(histogram.counts(), &[1, 1]);
//! assert_eq!(compute_coverage_count(&sample, 2, &filter, &exclusions).unwrap(), 2);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use log::{debug, info};
use num_bigint::BigUint;

use crate::combination::for_each_parallel;
use crate::error::{CoverageError, Result};
use crate::exclusion::ExclusionSet;
use crate::filter::VariableFilter;
use crate::gray::gray_code;
use crate::index::SampleBitIndex;
use crate::sample::Sample;
use crate::types::Lit;
use crate::utils::{binomial, binomial_big};

/// How excluded interactions are kept out of the counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExclusionMode {
    /// Count everything, then subtract each excluded interaction at its own
    /// coverage index.
    #[default]
    Correct,
    /// Skip excluded interactions during enumeration.
    Screen,
}

/// Advisory progress counter: number of processed variable combinations.
#[derive(Debug, Default)]
pub struct Progress {
    combinations: AtomicU64,
}

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn combinations(&self) -> u64 {
        self.combinations.load(Ordering::Relaxed)
    }

    fn add(&self, n: u64) {
        self.combinations.fetch_add(n, Ordering::Relaxed);
    }
}

/// Tuning knobs for a coverage computation. None of them change results.
#[derive(Debug, Clone, Default)]
pub struct CoverageConfig {
    /// Number of workers (default: 0 = available parallelism, 1 = run on the
    /// calling thread).
    pub threads: usize,
    /// Exclusion handling (default: [`ExclusionMode::Correct`]).
    pub exclusions: ExclusionMode,
    /// Optional progress counter (default: none).
    pub progress: Option<Arc<Progress>>,
}

impl CoverageConfig {
    /// Single-threaded configuration.
    pub fn sequential() -> Self {
        Self {
            threads: 1,
            ..Self::default()
        }
    }

    /// Effective number of workers.
    pub fn worker_count(&self) -> usize {
        if self.threads == 0 {
            std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
        } else {
            self.threads
        }
    }
}

/// Number of interactions first covered at each sample position.
///
/// Entry `i` counts the interactions whose first covering configuration is the
/// `(i + 1)`-th one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CoverageHistogram(Vec<u64>);

impl CoverageHistogram {
    pub fn counts(&self) -> &[u64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of covered interactions.
    pub fn total(&self) -> u64 {
        self.0.iter().sum()
    }

    /// Entry `k - 1`: interactions covered by the first `k` configurations.
    pub fn cumulative(&self) -> Vec<u64> {
        self.0
            .iter()
            .scan(0u64, |acc, &c| {
                *acc += c;
                Some(*acc)
            })
            .collect()
    }

    /// Entry `k - 1`: sum of the last `k` entries, i.e. the histogram read
    /// backward from the end and prefix-summed.
    pub fn tail_sums(&self) -> Vec<u64> {
        self.0
            .iter()
            .rev()
            .scan(0u64, |acc, &c| {
                *acc += c;
                Some(*acc)
            })
            .collect()
    }

    pub fn into_inner(self) -> Vec<u64> {
        self.0
    }
}

impl From<Vec<u64>> for CoverageHistogram {
    fn from(counts: Vec<u64>) -> Self {
        Self(counts)
    }
}

/// Exact size of the interaction universe, `2^t * C(n, t)`.
pub fn total_interactions(n: usize, t: usize) -> BigUint {
    binomial_big(n as u64, t as u64) << t
}

/// `2^t * C(n, t) - exclusion_count`.
///
/// Fails with [`CoverageError::Overflow`] if the universe does not fit into a
/// `u64` and with [`CoverageError::DataIntegrity`] if more interactions are
/// excluded than exist.
pub fn total_interaction_count(n: usize, t: usize, exclusion_count: u64) -> Result<u64> {
    let overflow = || CoverageError::Overflow(format!("2^{} * C({}, {}) does not fit into u64", t, n, t));
    let combinations = binomial(n as u64, t as u64).ok_or_else(overflow)?;
    let total = if combinations == 0 {
        0
    } else {
        if t >= 64 {
            return Err(overflow());
        }
        let signs = 1u64 << t;
        u64::try_from(combinations)
            .ok()
            .and_then(|c| c.checked_mul(signs))
            .ok_or_else(overflow)?
    };
    total.checked_sub(exclusion_count).ok_or_else(|| {
        CoverageError::DataIntegrity(format!(
            "{} excluded interactions exceed the universe of {}",
            exclusion_count, total
        ))
    })
}

/// Histogram of first-coverage positions, with the default configuration.
pub fn compute_partial_coverage_histogram(
    sample: &Sample,
    t: usize,
    filter: &VariableFilter,
    exclusions: &ExclusionSet,
) -> Result<CoverageHistogram> {
    compute_partial_coverage_histogram_with_config(sample, t, filter, exclusions, &CoverageConfig::default())
}

/// Histogram of first-coverage positions.
///
/// The result has one entry per configuration of `sample` (empty for an empty
/// sample). Excluded interactions never contribute.
pub fn compute_partial_coverage_histogram_with_config(
    sample: &Sample,
    t: usize,
    filter: &VariableFilter,
    exclusions: &ExclusionSet,
    config: &CoverageConfig,
) -> Result<CoverageHistogram> {
    let Some(scan) = Scan::prepare(sample, t, filter, exclusions, config)? else {
        return Ok(CoverageHistogram(vec![0u64; sample.len()]));
    };
    let size = sample.len();

    let mut result = vec![0u64; size];
    for tally in scan.run(|| Positions(vec![0u64; size]))? {
        for (r, c) in result.iter_mut().zip(&tally.0) {
            *r += c;
        }
    }

    if config.exclusions == ExclusionMode::Correct {
        for interaction in exclusions {
            let position = scan.index.index(interaction.literals())?;
            if position > 0 {
                let slot = &mut result[position - 1];
                *slot = slot.checked_sub(1).ok_or_else(|| {
                    CoverageError::DataIntegrity(format!(
                        "excluded interaction {} was never enumerated",
                        interaction
                    ))
                })?;
            }
        }
    }

    let histogram = CoverageHistogram(result);
    info!(
        "partial coverage: t = {}, n = {}, sample = {}, covered = {}",
        t,
        scan.literals.len(),
        size,
        histogram.total()
    );
    Ok(histogram)
}

/// Number of covered non-excluded interactions, with the default configuration.
pub fn compute_coverage_count(
    sample: &Sample,
    t: usize,
    filter: &VariableFilter,
    exclusions: &ExclusionSet,
) -> Result<u64> {
    compute_coverage_count_with_config(sample, t, filter, exclusions, &CoverageConfig::default())
}

/// Number of covered non-excluded interactions.
pub fn compute_coverage_count_with_config(
    sample: &Sample,
    t: usize,
    filter: &VariableFilter,
    exclusions: &ExclusionSet,
    config: &CoverageConfig,
) -> Result<u64> {
    let Some(scan) = Scan::prepare(sample, t, filter, exclusions, config)? else {
        return Ok(0);
    };

    let mut covered: u64 = scan.run(|| Count(0))?.iter().map(|c| c.0).sum();

    if config.exclusions == ExclusionMode::Correct {
        let mut covered_excluded = 0u64;
        for interaction in exclusions {
            if scan.index.is_covered(interaction.literals())? {
                covered_excluded += 1;
            }
        }
        covered = covered.checked_sub(covered_excluded).ok_or_else(|| {
            CoverageError::DataIntegrity("excluded interactions were never enumerated".to_string())
        })?;
    }

    info!(
        "coverage: t = {}, n = {}, sample = {}, covered = {}",
        t,
        scan.literals.len(),
        sample.len(),
        covered
    );
    Ok(covered)
}

/// Per-worker sink for coverage positions (1-based, never 0).
trait Tally: Send {
    fn record(&mut self, position: usize);
}

struct Positions(Vec<u64>);

impl Tally for Positions {
    #[inline]
    fn record(&mut self, position: usize) {
        self.0[position - 1] += 1;
    }
}

struct Count(u64);

impl Tally for Count {
    #[inline]
    fn record(&mut self, _position: usize) {
        self.0 += 1;
    }
}

/// Private accumulation context of one worker.
struct Worker<T> {
    tally: T,
    /// Current literal tuple, flipped in place along the Gray code.
    select: Vec<Lit>,
    /// Scratch buffer for canonical lookups in the exclusion set.
    sorted: Vec<Lit>,
    /// Combinations processed since the last progress flush.
    pending: u64,
}

const PROGRESS_BATCH: u64 = 1024;

/// Validated inputs of one scan.
struct Scan<'a> {
    t: usize,
    literals: Vec<Lit>,
    gray: Vec<usize>,
    index: SampleBitIndex,
    screen: Option<&'a ExclusionSet>,
    config: &'a CoverageConfig,
}

impl<'a> Scan<'a> {
    /// Returns `None` if there is nothing to scan (empty sample, or `t`
    /// larger than the number of surviving variables).
    fn prepare(
        sample: &Sample,
        t: usize,
        filter: &VariableFilter,
        exclusions: &'a ExclusionSet,
        config: &'a CoverageConfig,
    ) -> Result<Option<Self>> {
        if t == 0 {
            return Err(CoverageError::InvalidArgument(
                "t must be at least 1 to enumerate interactions".to_string(),
            ));
        }
        if sample.is_empty() {
            debug!("empty sample, nothing to scan");
            return Ok(None);
        }

        let width = sample.width();
        filter.validate(width)?;
        exclusions.validate(t, width, filter)?;

        let literals = filter.surviving_literals(width);
        if t > literals.len() {
            debug!("t = {} exceeds n = {}, no interactions to scan", t, literals.len());
            return Ok(None);
        }
        if t >= usize::BITS as usize {
            return Err(CoverageError::InvalidArgument(format!(
                "t = {} is too large to enumerate sign assignments",
                t
            )));
        }
        let index = SampleBitIndex::new(sample, width)?;
        let screen = match config.exclusions {
            ExclusionMode::Screen if !exclusions.is_empty() => Some(exclusions),
            _ => None,
        };
        debug!(
            "scan: t = {}, width = {}, n = {}, sample = {}, exclusions = {} ({:?})",
            t,
            width,
            literals.len(),
            sample.len(),
            exclusions.len(),
            config.exclusions
        );

        Ok(Some(Self {
            t,
            literals,
            gray: gray_code(t),
            index,
            screen,
            config,
        }))
    }

    fn run<T, M>(&self, make_tally: M) -> Result<Vec<T>>
    where
        T: Tally,
        M: Fn() -> T + Sync,
    {
        let t = self.t;
        let make_worker = || Worker {
            tally: make_tally(),
            select: vec![Lit::from_dimacs(1); t],
            sorted: Vec::with_capacity(t),
            pending: 0,
        };

        let workers = for_each_parallel(
            t,
            self.literals.len(),
            self.config.worker_count(),
            make_worker,
            |worker: &mut Worker<T>, combo| {
                combo.select_into(&self.literals, &mut worker.select);
                self.visit(worker);
                for &g in &self.gray {
                    worker.select[g].flip();
                    self.visit(worker);
                }
                self.bump(worker);
                Ok(())
            },
        )?;

        if let Some(progress) = &self.config.progress {
            progress.add(workers.iter().map(|w| w.pending).sum());
        }
        Ok(workers.into_iter().map(|w| w.tally).collect())
    }

    #[inline]
    fn visit<T: Tally>(&self, worker: &mut Worker<T>) {
        if let Some(exclusions) = self.screen {
            worker.sorted.clear();
            worker.sorted.extend_from_slice(&worker.select);
            worker.sorted.sort_unstable();
            if exclusions.contains_sorted(&worker.sorted) {
                return;
            }
        }
        let position = self.index.index_unchecked(&worker.select);
        if position > 0 {
            worker.tally.record(position);
        }
    }

    #[inline]
    fn bump<T>(&self, worker: &mut Worker<T>) {
        if let Some(progress) = &self.config.progress {
            worker.pending += 1;
            if worker.pending == PROGRESS_BATCH {
                progress.add(PROGRESS_BATCH);
                worker.pending = 0;
            }
        }
    }
}
