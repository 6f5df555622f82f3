//! Lexicographic enumeration of `t`-subsets of `{0, .., n-1}`.
//!
//! [`Combinations`] walks the subsets in strict lexicographic order, reusing a
//! single index buffer. [`for_each_parallel`] splits the same sequence into
//! contiguous rank ranges, one per worker; each worker owns an accumulation
//! context created by a caller-supplied factory.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use log::debug;
use parking_lot::Mutex;

use crate::error::{CoverageError, Result};
use crate::types::Lit;
use crate::utils::binomial;

/// One `t`-subset of indices, sorted ascending.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Combination {
    indices: Vec<usize>,
}

impl Combination {
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Maps the chosen indices into a fresh array of literals.
    ///
    /// # Panics
    ///
    /// Panics if an index is out of range for `literals`.
    pub fn select(&self, literals: &[Lit]) -> Vec<Lit> {
        self.indices.iter().map(|&i| literals[i]).collect()
    }

    /// Like [`select`][Combination::select], but writes into `out`.
    ///
    /// # Panics
    ///
    /// Panics if `out.len() != self.len()`.
    #[inline]
    pub fn select_into(&self, literals: &[Lit], out: &mut [Lit]) {
        assert_eq!(out.len(), self.indices.len());
        for (o, &i) in out.iter_mut().zip(&self.indices) {
            *o = literals[i];
        }
    }
}

/// Lexicographic enumerator of all `t`-subsets of `{0, .., n-1}`.
///
/// The enumerator is restartable via [`reset`][Combinations::reset]. The
/// allocation-free way to consume it is [`advance`][Combinations::advance];
/// the [`Iterator`] impl clones each combination.
#[derive(Debug, Clone)]
pub struct Combinations {
    t: usize,
    n: usize,
    current: Combination,
    /// First combination of the sequence (for `reset`).
    first: Vec<usize>,
    started: bool,
    exhausted: bool,
    /// Remaining number of combinations to yield, if bounded.
    limit: Option<u128>,
}

impl Combinations {
    /// All `t`-subsets of `{0, .., n-1}`.
    pub fn new(t: usize, n: usize) -> Self {
        let first: Vec<usize> = (0..t).collect();
        Self {
            t,
            n,
            current: Combination { indices: first.clone() },
            first,
            started: false,
            exhausted: t > n,
            limit: None,
        }
    }

    /// The suffix of the lexicographic sequence starting at `rank` (0-based).
    ///
    /// Fails with [`CoverageError::InvalidArgument`] if `rank >= C(n, t)`.
    pub fn starting_at(t: usize, n: usize, rank: u128) -> Result<Self> {
        let first = unrank(t, n, rank)?;
        Ok(Self {
            t,
            n,
            current: Combination { indices: first.clone() },
            first,
            started: false,
            exhausted: false,
            limit: None,
        })
    }

    /// Yields at most `count` combinations.
    pub fn with_limit(mut self, count: u128) -> Self {
        self.limit = Some(count);
        self
    }

    /// Number of combinations `C(n, t)`, or `None` on overflow.
    pub fn count_total(t: usize, n: usize) -> Option<u128> {
        binomial(n as u64, t as u64)
    }

    pub fn t(&self) -> usize {
        self.t
    }

    pub fn n(&self) -> usize {
        self.n
    }

    /// Restarts the enumeration from its first combination.
    pub fn reset(&mut self) {
        self.current.indices.clone_from(&self.first);
        self.started = false;
        self.exhausted = self.t > self.n;
    }

    /// Moves to the next combination and returns a reference to it.
    pub fn advance(&mut self) -> Option<&Combination> {
        if self.exhausted {
            return None;
        }
        if let Some(limit) = self.limit.as_mut() {
            if *limit == 0 {
                self.exhausted = true;
                return None;
            }
            *limit -= 1;
        }
        if !self.started {
            self.started = true;
            return Some(&self.current);
        }

        let t = self.t;
        let n = self.n;
        let indices = &mut self.current.indices;
        // Rightmost position that can still be incremented.
        let Some(i) = (0..t).rev().find(|&i| indices[i] < n - t + i) else {
            self.exhausted = true;
            return None;
        };
        indices[i] += 1;
        for j in i + 1..t {
            indices[j] = indices[j - 1] + 1;
        }
        Some(&self.current)
    }
}

impl Iterator for Combinations {
    type Item = Combination;

    fn next(&mut self) -> Option<Self::Item> {
        self.advance().cloned()
    }
}

/// Lexicographic rank of a combination among all `t`-subsets of `{0, .., n-1}`.
pub fn rank(indices: &[usize], n: usize) -> Result<u128> {
    let t = indices.len();
    let mut result: u128 = 0;
    let mut lo = 0;
    for (pos, &c) in indices.iter().enumerate() {
        if c < lo || c >= n {
            return Err(CoverageError::InvalidArgument(format!(
                "{:?} is not a sorted combination over {} indices",
                indices, n
            )));
        }
        for skipped in lo..c {
            result += binomial_or_overflow(n - 1 - skipped, t - 1 - pos)?;
        }
        lo = c + 1;
    }
    Ok(result)
}

/// The combination with the given lexicographic rank.
pub fn unrank(t: usize, n: usize, mut rank: u128) -> Result<Vec<usize>> {
    let total = binomial_or_overflow(n, t)?;
    if rank >= total {
        return Err(CoverageError::InvalidArgument(format!(
            "rank {} is out of range for C({}, {}) = {}",
            rank, n, t, total
        )));
    }
    let mut indices = Vec::with_capacity(t);
    let mut c = 0;
    for pos in 0..t {
        loop {
            // Number of combinations that put `c` at this position.
            let block = binomial_or_overflow(n - 1 - c, t - 1 - pos)?;
            if rank < block {
                break;
            }
            rank -= block;
            c += 1;
        }
        indices.push(c);
        c += 1;
    }
    Ok(indices)
}

fn binomial_or_overflow(n: usize, k: usize) -> Result<u128> {
    binomial(n as u64, k as u64)
        .ok_or_else(|| CoverageError::Overflow(format!("C({}, {}) does not fit into u128", n, k)))
}

/// Splits `total` items into at most `parts` contiguous `(start, len)` ranges.
pub fn partition(total: u128, parts: usize) -> Vec<(u128, u128)> {
    let parts = (parts.max(1) as u128).min(total.max(1));
    let base = total / parts;
    let extra = total % parts;
    let mut start = 0;
    (0..parts)
        .map(|p| {
            let len = base + u128::from(p < extra);
            let range = (start, len);
            start += len;
            range
        })
        .filter(|&(_, len)| len > 0)
        .collect()
}

/// Runs `body` over every `t`-subset of `{0, .., n-1}` on `threads` workers.
///
/// Each worker processes one contiguous lexicographic slice with its own
/// context from `make_env`; contexts are collected into a shared list once per
/// worker and returned in no particular order. If any worker fails, the other
/// workers stop early and the first error is returned. A panic in `body` is
/// reported as [`CoverageError::WorkerPanicked`], also when the slice runs on
/// the calling thread.
pub fn for_each_parallel<E, M, F>(t: usize, n: usize, threads: usize, make_env: M, body: F) -> Result<Vec<E>>
where
    E: Send,
    M: Fn() -> E + Sync,
    F: Fn(&mut E, &Combination) -> Result<()> + Sync,
{
    let total = binomial_or_overflow(n, t)?;
    let ranges = partition(total, threads);
    debug!(
        "for_each_parallel(t = {}, n = {}, combinations = {}, workers = {})",
        t,
        n,
        total,
        ranges.len()
    );

    let run_slice = |start: u128, len: u128, failed: &AtomicBool| -> Result<E> {
        let mut env = make_env();
        let mut combinations = Combinations::starting_at(t, n, start)?.with_limit(len);
        while let Some(combo) = combinations.advance() {
            if failed.load(Ordering::Relaxed) {
                break;
            }
            if let Err(e) = body(&mut env, combo) {
                failed.store(true, Ordering::Relaxed);
                return Err(e);
            }
        }
        Ok(env)
    };

    let failed = AtomicBool::new(false);

    if ranges.len() <= 1 {
        return ranges
            .into_iter()
            .map(|(start, len)| {
                panic::catch_unwind(AssertUnwindSafe(|| run_slice(start, len, &failed)))
                    .unwrap_or(Err(CoverageError::WorkerPanicked))
            })
            .collect();
    }

    let envs = Mutex::new(Vec::with_capacity(ranges.len()));
    let outcomes: Vec<Result<()>> = thread::scope(|scope| {
        let handles: Vec<_> = ranges
            .iter()
            .map(|&(start, len)| {
                let envs = &envs;
                let failed = &failed;
                let run_slice = &run_slice;
                debug!("worker slice: start = {}, len = {}", start, len);
                scope.spawn(move || -> Result<()> {
                    let env = run_slice(start, len, failed)?;
                    envs.lock().push(env);
                    Ok(())
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap_or(Err(CoverageError::WorkerPanicked)))
            .collect()
    });

    outcomes.into_iter().collect::<Result<()>>()?;
    Ok(envs.into_inner())
}
