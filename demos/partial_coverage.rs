use clap::Parser;
use log::info;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use twise_coverage::coverage::{
    compute_partial_coverage_histogram_with_config, total_interaction_count, CoverageConfig, ExclusionMode,
};
use twise_coverage::metric::{MetricOptions, ModelAnalysis};
use twise_coverage::sample::{Configuration, Sample};
use twise_coverage::types::Lit;

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Interaction size.
    #[arg(value_name = "INT", default_value = "2")]
    t: usize,

    /// Number of variables.
    #[clap(long, value_name = "INT", default_value = "30")]
    width: usize,

    /// Number of configurations in the random sample.
    #[clap(long, value_name = "INT", default_value = "20")]
    size: usize,

    /// Random seed for the sample.
    #[clap(long, value_name = "INT", default_value = "0")]
    seed: u64,

    /// Shuffle the sample with this seed before measuring.
    #[clap(long, value_name = "INT")]
    shuffle: Option<u64>,

    /// Variables to ignore (comma-separated ids).
    #[clap(long, value_delimiter = ',')]
    filter: Vec<u32>,

    /// Parent-child pairs to exclude, as `parent:child` DIMACS literals.
    #[clap(long, value_delimiter = ',')]
    parent_child: Vec<String>,

    /// Number of worker threads (0 = all cores).
    #[clap(long, value_name = "INT", default_value = "0")]
    threads: usize,

    /// Skip excluded interactions during enumeration instead of correcting afterwards.
    #[clap(long)]
    screen: bool,
}

fn parse_pair(s: &str) -> color_eyre::Result<(Lit, Lit)> {
    let (a, b) = s
        .split_once(':')
        .ok_or_else(|| color_eyre::eyre::eyre!("expected `parent:child`, got `{}`", s))?;
    let parse = |x: &str| -> color_eyre::Result<Lit> {
        Lit::try_from_dimacs(x.trim().parse()?).ok_or_else(|| color_eyre::eyre::eyre!("literal 0 in `{}`", s))
    };
    Ok((parse(a)?, parse(b)?))
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = std::time::Instant::now();

    let args = Cli::parse();
    println!("args = {:?}", args);

    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let configs = (0..args.size)
        .map(|_| {
            let values: Vec<bool> = (0..args.width).map(|_| rng.random_bool(0.5)).collect();
            Configuration::from_bools(&values)
        })
        .collect();
    let mut sample = Sample::new(configs)?;
    if let Some(seed) = args.shuffle {
        sample = sample.shuffled(seed);
    }

    // Treat the requested variables as core features of a synthetic model.
    let analysis = ModelAnalysis {
        core: args
            .filter
            .iter()
            .map(|&v| Lit::try_from_dimacs(v as i32).ok_or_else(|| color_eyre::eyre::eyre!("variable ids start at 1")))
            .collect::<color_eyre::Result<_>>()?,
        parent_child: args
            .parent_child
            .iter()
            .map(|s| parse_pair(s))
            .collect::<color_eyre::Result<_>>()?,
        ..ModelAnalysis::default()
    };
    let options = MetricOptions {
        core: true,
        parent_child: true,
        ..MetricOptions::default()
    };
    info!("metric = {}", options);

    let filter = analysis.variable_filter(sample.width(), &options)?;
    let exclusions = analysis.exclusion_set(sample.width(), args.t, &filter, &options)?;
    let n = filter.surviving(sample.width()).len();
    let total = total_interaction_count(n, args.t, exclusions.len() as u64)?;
    println!(
        "n = {}, excluded = {}, total interactions = {}",
        n,
        exclusions.len(),
        total
    );

    let config = CoverageConfig {
        threads: args.threads,
        exclusions: if args.screen {
            ExclusionMode::Screen
        } else {
            ExclusionMode::Correct
        },
        progress: None,
    };
    let time_coverage = std::time::Instant::now();
    let histogram = compute_partial_coverage_histogram_with_config(&sample, args.t, &filter, &exclusions, &config)?;
    println!("coverage computed in {:.3}s", time_coverage.elapsed().as_secs_f64());

    println!("{:>6} {:>10} {:>12} {:>8}", "size", "new", "covered", "ratio");
    for (k, (new, covered)) in histogram.counts().iter().zip(histogram.cumulative()).enumerate() {
        let ratio = if total == 0 { 1.0 } else { covered as f64 / total as f64 };
        println!("{:>6} {:>10} {:>12} {:>8.4}", k + 1, new, covered, ratio);
    }

    println!("Total time: {:.3}s", time_total.elapsed().as_secs_f64());
    Ok(())
}
