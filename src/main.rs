mod cli;
mod commands;
mod extract;
mod model;
mod signatures;
mod util;

use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::{GateOutcome, INPUT_ERROR_EXIT_CODE};

fn main() {
    init_tracing();

    match run() {
        Ok(outcome) => std::process::exit(outcome.exit_code()),
        Err(err) => {
            eprintln!("ERROR: {err}");
            error!(error = %err, "command failed");
            for cause in err.chain().skip(1) {
                error!(cause = %cause, "caused by");
            }
            std::process::exit(INPUT_ERROR_EXIT_CODE);
        }
    }
}

fn run() -> Result<GateOutcome> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Compare(args) => commands::compare::run(args),
        Commands::Tune(args) => commands::tune::run(args),
        Commands::Triage(args) => commands::triage::run(args),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
