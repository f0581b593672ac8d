//! Suitor b-matching CLI.
//!
//! Loads a weighted edge list, then for each capacity method in
//! `0..=b_limit` runs one matching round and prints the total matched
//! weight (one integer per line) to stdout. Diagnostics go to stderr and
//! are not part of the output contract.

use clap::Parser;
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::{fmt, EnvFilter};

use suitor_cli::{execute_sweep, CliExitCode, Sweep};
use suitor_core::EngineConfig;

/// Greedy maximum-weight b-matching over an edge-list file.
#[derive(Parser)]
#[command(name = "suitor-cli")]
#[command(version)]
#[command(about = "Compute maximum-weight b-matchings with the Suitor algorithm")]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Force the single-threaded reference engine
    #[arg(long)]
    sequential: bool,

    /// Number of worker threads
    workers: usize,

    /// Edge-list input file (`from to weight` records, `#` comments)
    input: PathBuf,

    /// Sweep capacity methods 0..=B_LIMIT
    b_limit: u32,
}

fn main() {
    let cli = Cli::parse();

    // Logging goes to stderr; stdout carries only the per-method weights.
    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    let sweep = Sweep {
        config: EngineConfig::with_workers(cli.workers),
        input: cli.input,
        b_limit: cli.b_limit,
        sequential: cli.sequential,
    };

    let exit_code = match execute_sweep(&sweep) {
        Ok(weights) => {
            for weight in weights {
                println!("{weight}");
            }
            CliExitCode::Success
        }
        Err(err) => {
            error!(%err, "matching sweep failed");
            CliExitCode::from(&err)
        }
    };

    std::process::exit(exit_code.into());
}
