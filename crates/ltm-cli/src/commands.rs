use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;

use ltm_ledger::{AcceptOutcome, LedgerSession, RejectReason};
use ltm_schema::{validator, Snapshot};

use crate::cli_args::{Cli, Command};
use crate::file_sink::FileSink;

/// Dispatches the parsed command. `Ok(false)` means the command ran but at
/// least one snapshot was rejected, which maps to a failing exit code.
pub fn run(cli: Cli) -> Result<bool> {
    match cli.command {
        Command::Scan { file } => run_scan(&file),
        Command::Commit {
            files,
            project,
            ledger_dir,
        } => run_commit(&files, &project, &ledger_dir),
    }
}

fn load_snapshot(path: &Path) -> Result<Snapshot> {
    tracing::debug!(path = %path.display(), "loading snapshot");
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot file {}", path.display()))?;
    Snapshot::from_json_str(&raw)
        .with_context(|| format!("failed to decode snapshot file {}", path.display()))
}

/// Builds the scan output: tier (or missing-field abort), benchmark
/// metrics, audit checklist, and a completion line with the system time.
fn scan_report(snapshot: &Snapshot) -> Result<(bool, Vec<String>)> {
    let mut lines = Vec::new();

    match validator::validate(snapshot) {
        Err(error) => {
            lines.push(format!("[!] {error}"));
            return Ok((false, lines));
        }
        Ok(tier) => lines.push(format!("[+] schema detected: {tier}")),
    }

    let metrics = validator::metrics(snapshot)?;
    lines.push("--- benchmark data ---".to_string());
    lines.push(format!("| est. tokens:  {:.2}", metrics.estimated_tokens));
    lines.push(format!("| logical UVs:  {}", metrics.unresolved_vectors));
    lines.push(format!("| risk nodes:   {}", metrics.risks));
    lines.push(format!("| dependencies: {}", metrics.dependencies));
    lines.push("----------------------".to_string());

    lines.push("[#] handshake audit checklist:".to_string());
    for line in validator::audit_checklist(snapshot) {
        lines.push(format!("  {line}"));
    }

    lines.push(format!(
        "[+] scan complete, system time: {}",
        Local::now().to_rfc3339()
    ));
    Ok((true, lines))
}

fn run_scan(path: &Path) -> Result<bool> {
    let snapshot = load_snapshot(path)?;
    let (valid, lines) = scan_report(&snapshot)?;
    for line in lines {
        println!("{line}");
    }
    Ok(valid)
}

fn run_commit(files: &[PathBuf], project: &str, ledger_dir: &Path) -> Result<bool> {
    let mut session = LedgerSession::new();
    let mut sink = FileSink::new(ledger_dir, project);
    let mut all_adopted = true;

    for path in files {
        let snapshot = load_snapshot(path)?;
        let outcome = session.commit(snapshot, &mut sink)?;
        match outcome {
            AcceptOutcome::Adopted {
                tier,
                summary,
                receipt,
                critical,
            } => {
                // Escalation happens only for snapshots that passed
                // validation; the pipeline carries the critical set out.
                for risk in &critical {
                    println!(
                        "[!!!] CRITICAL RISK {}: {}",
                        risk.id,
                        risk.desc.as_deref().unwrap_or("(no description)")
                    );
                }
                println!("[#] diff: {summary}");
                println!("[+] {tier} snapshot recorded at {receipt}");
            }
            AcceptOutcome::Rejected(RejectReason::Schema(error)) => {
                println!("[!] abort {}: {error}", path.display());
                all_adopted = false;
            }
            AcceptOutcome::Rejected(RejectReason::Persist(error)) => {
                println!("[!] abort {}: persistence failed: {error:#}", path.display());
                all_adopted = false;
            }
        }
    }

    Ok(all_adopted)
}
