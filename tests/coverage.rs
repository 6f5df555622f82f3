use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use test_log::test;

use twise_coverage::coverage::{
    compute_coverage_count, compute_coverage_count_with_config, compute_partial_coverage_histogram,
    compute_partial_coverage_histogram_with_config, total_interaction_count, CoverageConfig, ExclusionMode,
};
use twise_coverage::error::CoverageError;
use twise_coverage::exclusion::{ExclusionSet, Interaction};
use twise_coverage::filter::VariableFilter;
use twise_coverage::metric::{MetricOptions, ModelAnalysis};
use twise_coverage::sample::{Configuration, Sample};
use twise_coverage::types::{Lit, Var};

fn random_sample(seed: u64, width: usize, size: usize) -> Sample {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let configs = (0..size)
        .map(|_| {
            let values: Vec<bool> = (0..width).map(|_| rng.random_bool(0.5)).collect();
            Configuration::from_bools(&values)
        })
        .collect();
    Sample::new(configs).unwrap()
}

fn random_partial_sample(seed: u64, width: usize, size: usize) -> Sample {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let configs = (0..size)
        .map(|_| {
            let values = (0..width)
                .map(|_| match rng.random_range(0..3) {
                    0 => None,
                    1 => Some(true),
                    _ => Some(false),
                })
                .collect();
            Configuration::from_partial(values)
        })
        .collect();
    Sample::new(configs).unwrap()
}

/// All interactions over `vars` of size `t`, by plain recursion.
fn all_interactions(vars: &[Var], t: usize) -> Vec<Vec<Lit>> {
    fn go(vars: &[Var], t: usize, prefix: &mut Vec<Lit>, out: &mut Vec<Vec<Lit>>) {
        if prefix.len() == t {
            out.push(prefix.clone());
            return;
        }
        for (i, &v) in vars.iter().enumerate() {
            for lit in [v.pos(), v.neg()] {
                prefix.push(lit);
                go(&vars[i + 1..], t, prefix, out);
                prefix.pop();
            }
        }
    }
    let mut out = Vec::new();
    go(vars, t, &mut Vec::new(), &mut out);
    out
}

/// First covering position (1-based) by scanning configurations directly.
fn first_cover(sample: &Sample, interaction: &[Lit]) -> usize {
    sample
        .iter()
        .position(|c| interaction.iter().all(|&l| c.satisfies(l)))
        .map_or(0, |p| p + 1)
}

fn brute_force_histogram(sample: &Sample, t: usize, filter: &VariableFilter, exclusions: &ExclusionSet) -> Vec<u64> {
    let mut histogram = vec![0u64; sample.len()];
    for interaction in all_interactions(&filter.surviving(sample.width()), t) {
        if exclusions.contains(&Interaction::new(interaction.iter().copied()).unwrap()) {
            continue;
        }
        let position = first_cover(sample, &interaction);
        if position > 0 {
            histogram[position - 1] += 1;
        }
    }
    histogram
}

fn uncovered(sample: &Sample, t: usize, filter: &VariableFilter, exclusions: &ExclusionSet) -> u64 {
    all_interactions(&filter.surviving(sample.width()), t)
        .into_iter()
        .filter(|i| !exclusions.contains(&Interaction::new(i.iter().copied()).unwrap()))
        .filter(|i| first_cover(sample, i) == 0)
        .count() as u64
}

fn with_threads(threads: usize) -> CoverageConfig {
    CoverageConfig {
        threads,
        ..CoverageConfig::default()
    }
}

#[test]
fn test_two_configuration_scenario() {
    let sample = Sample::new(vec![
        Configuration::from_bools(&[true, true]),
        Configuration::from_bools(&[true, false]),
    ])
    .unwrap();
    let none = VariableFilter::new();
    let empty = ExclusionSet::new();

    let histogram = compute_partial_coverage_histogram(&sample, 2, &none, &empty).unwrap();
    assert_eq!(histogram.counts(), &[1, 1]);
    assert_eq!(compute_coverage_count(&sample, 2, &none, &empty).unwrap(), 2);
    assert_eq!(total_interaction_count(2, 2, 0).unwrap(), 4);

    let exclusions: ExclusionSet = [Interaction::from_dimacs(&[-1, -2]).unwrap()].into_iter().collect();
    assert_eq!(total_interaction_count(2, 2, exclusions.len() as u64).unwrap(), 3);
    assert_eq!(compute_coverage_count(&sample, 2, &none, &exclusions).unwrap(), 2);
}

#[test]
fn test_matches_brute_force() {
    for (seed, width, size, t) in [(1, 6, 5, 1), (2, 7, 9, 2), (3, 8, 70, 2), (4, 7, 12, 3), (5, 6, 130, 4)] {
        let sample = random_sample(seed, width, size);
        let none = VariableFilter::new();
        let empty = ExclusionSet::new();
        let histogram = compute_partial_coverage_histogram(&sample, t, &none, &empty).unwrap();
        assert_eq!(
            histogram.counts(),
            &brute_force_histogram(&sample, t, &none, &empty)[..],
            "seed = {}, t = {}",
            seed,
            t
        );
    }
}

#[test]
fn test_partial_configurations_match_brute_force() {
    let sample = random_partial_sample(11, 7, 40);
    let filter = VariableFilter::from_vars([Var::new(2)]);
    let empty = ExclusionSet::new();
    for t in 1..=3 {
        let histogram = compute_partial_coverage_histogram(&sample, t, &filter, &empty).unwrap();
        assert_eq!(histogram.counts(), &brute_force_histogram(&sample, t, &filter, &empty)[..]);
    }
}

#[test]
fn test_histogram_sum_invariant() {
    let sample = random_sample(7, 9, 20);
    let analysis = ModelAnalysis {
        core: vec![Lit::from(9)],
        parent_child: vec![(Lit::from(-1), Lit::from(2)), (Lit::from(3), Lit::from(-4))],
        ..ModelAnalysis::default()
    };
    let options = MetricOptions {
        core: true,
        parent_child: true,
        ..MetricOptions::default()
    };
    let filter = analysis.variable_filter(sample.width(), &options).unwrap();
    let n = filter.surviving(sample.width()).len();
    for t in 2..=3 {
        let exclusions = analysis.exclusion_set(sample.width(), t, &filter, &options).unwrap();
        assert!(!exclusions.is_empty());
        let histogram = compute_partial_coverage_histogram(&sample, t, &filter, &exclusions).unwrap();
        let total = total_interaction_count(n, t, exclusions.len() as u64).unwrap();
        assert_eq!(histogram.total() + uncovered(&sample, t, &filter, &exclusions), total);
        assert_eq!(histogram.counts(), &brute_force_histogram(&sample, t, &filter, &exclusions)[..]);
    }
}

#[test]
fn test_exclusion_modes_agree() {
    let sample = random_sample(21, 8, 15);
    let analysis = ModelAnalysis {
        parent_child: vec![(Lit::from(1), Lit::from(2)), (Lit::from(-5), Lit::from(6))],
        ..ModelAnalysis::default()
    };
    let options = MetricOptions {
        parent_child: true,
        ..MetricOptions::default()
    };
    let filter = VariableFilter::new();
    let exclusions = analysis.exclusion_set(8, 3, &filter, &options).unwrap();
    let correct = CoverageConfig {
        exclusions: ExclusionMode::Correct,
        ..CoverageConfig::default()
    };
    let screen = CoverageConfig {
        exclusions: ExclusionMode::Screen,
        ..CoverageConfig::default()
    };
    assert_eq!(
        compute_partial_coverage_histogram_with_config(&sample, 3, &filter, &exclusions, &correct).unwrap(),
        compute_partial_coverage_histogram_with_config(&sample, 3, &filter, &exclusions, &screen).unwrap()
    );
    assert_eq!(
        compute_coverage_count_with_config(&sample, 3, &filter, &exclusions, &correct).unwrap(),
        compute_coverage_count_with_config(&sample, 3, &filter, &exclusions, &screen).unwrap()
    );
}

#[test]
fn test_deterministic_under_parallelism() {
    let sample = random_sample(42, 14, 100);
    let filter = VariableFilter::from_vars([Var::new(3), Var::new(10)]);
    let empty = ExclusionSet::new();
    let sequential = compute_partial_coverage_histogram_with_config(&sample, 3, &filter, &empty, &with_threads(1))
        .unwrap();
    for threads in [2, 3, 8, 64] {
        let parallel =
            compute_partial_coverage_histogram_with_config(&sample, 3, &filter, &empty, &with_threads(threads))
                .unwrap();
        assert_eq!(sequential, parallel, "threads = {}", threads);
        let count = compute_coverage_count_with_config(&sample, 3, &filter, &empty, &with_threads(threads)).unwrap();
        assert_eq!(count, sequential.total());
    }
}

#[test]
fn test_coverage_is_monotone_and_bounded() {
    let sample = random_sample(5, 10, 12);
    let none = VariableFilter::new();
    let empty = ExclusionSet::new();
    let total = total_interaction_count(10, 2, 0).unwrap();
    let mut previous = 0;
    for k in 0..=sample.len() {
        let count = compute_coverage_count(&sample.prefix(k), 2, &none, &empty).unwrap();
        assert!(count >= previous);
        assert!(count <= total);
        previous = count;
    }
    let histogram = compute_partial_coverage_histogram(&sample, 2, &none, &empty).unwrap();
    assert_eq!(histogram.cumulative().last().copied(), Some(previous));
}

#[test]
fn test_prefix_histogram_is_prefix() {
    let sample = random_sample(9, 9, 25);
    let none = VariableFilter::new();
    let empty = ExclusionSet::new();
    let full = compute_partial_coverage_histogram(&sample, 2, &none, &empty).unwrap();
    let half = compute_partial_coverage_histogram(&sample.prefix(10), 2, &none, &empty).unwrap();
    assert_eq!(half.counts(), &full.counts()[..10]);
}

#[test]
fn test_shuffle_preserves_total() {
    let sample = random_sample(3, 8, 30);
    let none = VariableFilter::new();
    let empty = ExclusionSet::new();
    let original = compute_coverage_count(&sample, 2, &none, &empty).unwrap();
    let shuffled = compute_coverage_count(&sample.shuffled(17), 2, &none, &empty).unwrap();
    assert_eq!(original, shuffled);
}

#[test]
fn test_errors() {
    let sample = random_sample(1, 4, 3);
    let none = VariableFilter::new();
    let empty = ExclusionSet::new();

    let err = compute_partial_coverage_histogram(&sample, 0, &none, &empty).unwrap_err();
    assert!(matches!(err, CoverageError::InvalidArgument(_)));

    let out_of_range = VariableFilter::from_vars([Var::new(5)]);
    let err = compute_coverage_count(&sample, 2, &out_of_range, &empty).unwrap_err();
    assert!(matches!(err, CoverageError::DataIntegrity(_)));

    let wrong_size: ExclusionSet = [Interaction::from_dimacs(&[1, 2, 3]).unwrap()].into_iter().collect();
    let err = compute_coverage_count(&sample, 2, &none, &wrong_size).unwrap_err();
    assert!(matches!(err, CoverageError::DataIntegrity(_)));
}

#[test]
fn test_t_exceeds_universe() {
    let sample = random_sample(1, 3, 4);
    let histogram =
        compute_partial_coverage_histogram(&sample, 4, &VariableFilter::new(), &ExclusionSet::new()).unwrap();
    assert_eq!(histogram.counts(), &[0, 0, 0, 0]);
    assert_eq!(total_interaction_count(3, 4, 0).unwrap(), 0);
}
