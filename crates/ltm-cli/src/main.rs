//! `ltm-bridge`: file-based shell over the LTM-Bridge ledger core.
//!
//! Two commands: `scan` validates a snapshot file and prints its metrics
//! and audit checklist; `commit` drives one or more snapshot files through
//! the accept pipeline against a file-backed ledger.

mod cli_args;
mod commands;
mod file_sink;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    let cli = cli_args::Cli::parse();
    match commands::run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("[!] {error:#}");
            ExitCode::FAILURE
        }
    }
}
