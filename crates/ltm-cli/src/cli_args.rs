use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "ltm-bridge",
    about = "State ledger for LTM context snapshots: validation, metrics, and semantic diffs",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate a snapshot file and print its metrics and audit checklist.
    Scan {
        #[arg(help = "Path to a snapshot JSON file")]
        file: PathBuf,
    },
    /// Run snapshot files through the accept pipeline into the ledger.
    Commit {
        #[arg(required = true, help = "Snapshot JSON files, committed in order")]
        files: Vec<PathBuf>,

        #[arg(
            long,
            env = "LTM_PROJECT",
            default_value = "global-ledger",
            help = "Project name used to label snapshot records"
        )]
        project: String,

        #[arg(
            long = "ledger-dir",
            env = "LTM_LEDGER_DIR",
            default_value = ".ltm",
            help = "Ledger root directory; snapshots land under <dir>/snapshots"
        )]
        ledger_dir: PathBuf,
    },
}
