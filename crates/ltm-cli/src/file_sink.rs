use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;

use ltm_core::write_text_atomic;
use ltm_ledger::PersistSink;
use ltm_schema::Snapshot;

/// File-backed persistence: each accepted snapshot becomes a timestamped
/// pretty-printed JSON record under `<ledger_dir>/snapshots`.
pub struct FileSink {
    snapshots_dir: PathBuf,
    project: String,
}

impl FileSink {
    pub fn new(ledger_dir: &Path, project: &str) -> Self {
        Self {
            snapshots_dir: ledger_dir.join("snapshots"),
            project: project.to_string(),
        }
    }
}

impl PersistSink for FileSink {
    fn persist(&mut self, snapshot: &Snapshot, _summary: &str) -> Result<String> {
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let path = self
            .snapshots_dir
            .join(format!("{}_{stamp}.json", self.project));
        let body = serde_json::to_string_pretty(snapshot)
            .context("failed to encode snapshot for the ledger")?;
        write_text_atomic(&path, &body)?;
        Ok(path.display().to_string())
    }
}
