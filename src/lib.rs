//! # twise-coverage: t-wise interaction coverage of configuration samples
//!
//! **`twise-coverage`** measures how thoroughly a sample of configurations
//! (e.g. produced by a combinatorial interaction testing sampler) covers all
//! *t-wise interactions* of a variable universe.
//!
//! ## What is a t-wise interaction?
//!
//! An interaction is a set of `t` literals over `t` distinct variables, such
//! as `{x1, ~x4}` for `t = 2`. A configuration covers an interaction if it
//! assigns every literal of it. Over `n` variables there are `2^t * C(n, t)`
//! interactions; a good sample covers many of them with few configurations.
//!
//! ## Key Features
//!
//! - **Bit-indexed samples**: each literal maps to a bit set over sample
//!   positions, so "which configuration covers this interaction first?" is a
//!   word-wise AND of `t` bit sets. See [`index`].
//! - **Gray-code enumeration**: the `2^t` sign assignments of a variable
//!   combination are visited with one flip per step. See [`gray`].
//! - **Parallel accumulation**: the lexicographic combination space is split
//!   into contiguous slices, one per worker, each with private counters. See
//!   [`combination`] and [`coverage`].
//! - **Filters**: variables (core, dead, abstract, ...) and single
//!   interactions (parent-child pairs) can be excluded. See [`filter`],
//!   [`exclusion`] and [`metric`].
//!
//! ## Basic Usage
//!
//! ```rust
//! use twise_coverage::coverage::{compute_partial_coverage_histogram, total_interaction_count};
//! use twise_coverage::exclusion::ExclusionSet;
//! use twise_coverage::filter::VariableFilter;
//! use twise_coverage::sample::{Configuration, Sample};
//!
//! let sample = Sample::new(vec![
//!     Configuration::from_bools(&[true, true, false]),
//!     Configuration::from_bools(&[false, true, true]),
//!     Configuration::from_bools(&[true, false, true]),
//! ])
//! .unwrap();
//!
//! let histogram =
//!     compute_partial_coverage_histogram(&sample, 2, &VariableFilter::new(), &ExclusionSet::new()).unwrap();
//!
//! // Each configuration covers 3 pairs; later ones only add what is new.
//! assert_eq!(histogram.counts(), &[3, 3, 3]);
//! assert_eq!(histogram.cumulative(), vec![3, 6, 9]);
//! assert_eq!(total_interaction_count(3, 2, 0).unwrap(), 12);
//! ```

pub mod bitset;
pub mod combination;
pub mod coverage;
pub mod error;
pub mod exclusion;
pub mod filter;
pub mod gray;
pub mod index;
pub mod metric;
pub mod sample;
pub mod types;
pub mod utils;
