//! Cache hierarchy simulator CLI.
//!
//! This binary replays a memory trace against a cache hierarchy and prints the statistics.
//! It performs:
//! 1. **Setup:** Loads a JSON hierarchy configuration or uses the reference L1/L2/L3 hierarchy.
//! 2. **Replay:** Runs every trace record, issuing stride prefetches unless disabled.
//! 3. **Report:** Prints per-level statistics as text (lower levels nested) or JSON.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use serde::Serialize;
use tracing::error;
use tracing_subscriber::EnvFilter;

use memsim_core::stats::LevelReport;
use memsim_core::{Config, RunSummary, SimError, Simulator};

#[derive(Parser, Debug)]
#[command(
    name = "memsim",
    author,
    version,
    about = "Trace-driven multi-level cache hierarchy simulator",
    long_about = "Replay a memory trace (`r <hex addr>` / `w <hex addr>` records) against a \
                  set-associative cache hierarchy and report per-level statistics.\n\n\
                  Examples:\n  memsim traces/matrix.trace\n  \
                  memsim traces/matrix.trace --config l1l2.json --no-prefetch --json"
)]
struct Cli {
    /// Trace file to replay.
    trace: PathBuf,

    /// JSON hierarchy configuration (defaults to the reference L1/L2/L3 hierarchy).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Disable the stride prefetch controller.
    #[arg(long)]
    no_prefetch: bool,

    /// Print statistics as JSON.
    #[arg(long)]
    json: bool,

    /// Print each level's configuration before the statistics.
    #[arg(long)]
    info: bool,

    /// With --info, also print the state of every block.
    #[arg(long, requires = "info")]
    verbose_blocks: bool,

    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(short, long)]
    verbose: bool,
}

/// Machine-readable result of a run.
#[derive(Serialize)]
struct JsonReport {
    summary: RunSummary,
    levels: Vec<LevelReport>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        error!(error = %e, "simulation aborted");
        eprintln!("[!] FATAL: {e}");
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<(), SimError> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if cli.no_prefetch {
        config.prefetch.enabled = false;
    }

    let mut sim = Simulator::new(&config)?;
    let summary = sim.run_file(&cli.trace)?;

    if cli.info {
        print!("{}", sim.info_report(cli.verbose_blocks));
    }

    if cli.json {
        let report = JsonReport {
            summary,
            levels: sim.level_reports(),
        };
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("[!] failed to serialize report: {e}");
                process::exit(1);
            }
        }
    } else {
        print!("{}", sim.statistics_report()?);
        println!(
            "Records: {}  Reads: {}  Writes: {}  Prefetches: {}",
            summary.records, summary.reads, summary.writes, summary.prefetches_issued
        );
    }
    Ok(())
}
