use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use u_cachealloc::allocation::write_allocation;
use u_cachealloc::model::Instance;
use u_cachealloc::mutation::AddPolicy;
use u_cachealloc::search::{LocalSearchRunner, ProgressPrinter, SearchConfig, Silent};

/// Allocate videos to edge caches by greedy seeding and hill climbing.
#[derive(Debug, Parser)]
#[command(name = "u-cachealloc", version, about)]
struct Opts {
    /// Instance files to solve, in order.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Directory for `.out` files.
    #[arg(short, long, default_value = "output")]
    output_dir: PathBuf,

    /// Search iterations per chain.
    #[arg(short, long, default_value_t = 100_000)]
    iterations: usize,

    /// Random seed.
    #[arg(short, long, default_value_t = 1)]
    seed: u64,

    /// Number of independent search chains.
    #[arg(short, long, default_value_t = 1)]
    chains: usize,

    /// Only add videos that are not on any cache yet.
    #[arg(long)]
    exclusive_add: bool,

    /// Do not draw the progress bar.
    #[arg(long)]
    no_progress: bool,
}

fn enable_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();
}

fn output_path(dir: &Path, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "instance".to_string());
    dir.join(format!("{stem}.out"))
}

fn solve_file(input: &Path, opts: &Opts, config: &SearchConfig) -> Result<()> {
    let text = fs::read_to_string(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let instance: Instance = text
        .parse()
        .with_context(|| format!("parsing {}", input.display()))?;

    tracing::info!(
        "Solving {} with {} videos, {} endpoints, {} caches and {} requests",
        input.display(),
        instance.num_videos(),
        instance.num_endpoints(),
        instance.num_caches(),
        instance.total_requests()
    );

    let t0 = Instant::now();
    // chains report no per-iteration progress
    let outcome = if opts.no_progress || config.chains > 1 {
        LocalSearchRunner::solve(&instance, config, &mut Silent)
    } else {
        let mut printer = ProgressPrinter::new(io::stdout(), config.max_iterations);
        LocalSearchRunner::solve(&instance, config, &mut printer)
    };
    let result = outcome.with_context(|| format!("optimizing {}", input.display()))?;

    let path = output_path(&opts.output_dir, input);
    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    let mut out = BufWriter::new(file);
    write_allocation(&result.allocation, &mut out)
        .and_then(|()| out.flush())
        .with_context(|| format!("writing {}", path.display()))?;

    tracing::info!(
        "{}: score {} -> {} in {} ms, written to {}",
        input.display(),
        result.initial_score,
        result.score,
        t0.elapsed().as_millis(),
        path.display()
    );
    Ok(())
}

fn main() -> Result<()> {
    enable_tracing();
    let opts = Opts::parse();

    let mut config = SearchConfig::default()
        .with_max_iterations(opts.iterations)
        .with_seed(opts.seed)
        .with_chains(opts.chains);
    if opts.exclusive_add {
        config = config.with_add_policy(AddPolicy::Exclusive);
    }
    config.validate().context("invalid options")?;

    fs::create_dir_all(&opts.output_dir)
        .with_context(|| format!("creating {}", opts.output_dir.display()))?;

    for input in &opts.inputs {
        solve_file(input, &opts, &config)?;
    }
    Ok(())
}
