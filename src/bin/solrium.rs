//! solrium CLI binary.

use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use solrium::cli::args::*;
use solrium::cli::commands::*;

fn main() {
    let args = SolriumArgs::parse();

    let level = match args.verbosity() {
        0 => "error",
        1 => "warn",
        2 => "info",
        _ => "debug",
    };
    // RUST_LOG wins over -v/-q.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Err(e) = execute_command(args) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
