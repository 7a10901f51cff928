use std::collections::HashSet;

use ltm_schema::Snapshot;

/// Reported when the differ has no last accepted snapshot to compare with.
pub const FIRST_SNAPSHOT_SENTINEL: &str = "[first snapshot of session]";

/// Reported when no change category produced output.
pub const NO_CHANGES_SENTINEL: &str = "no semantic changes detected";

/// Joins the non-empty change categories of one diff report.
pub const DIFF_SEPARATOR: &str = " | ";

/// Computes human-readable semantic deltas between the last accepted
/// snapshot of a session and each newly offered one.
///
/// The differ never adopts on its own: `adopt` is the caller's signal that
/// every downstream persistence step succeeded. Adopting speculatively
/// would desynchronize future diffs from what was actually recorded.
#[derive(Debug, Default)]
pub struct SnapshotDiffer {
    last_accepted: Option<Snapshot>,
}

impl SnapshotDiffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The snapshot diffs are currently computed against, if any.
    pub fn last_accepted(&self) -> Option<&Snapshot> {
        self.last_accepted.as_ref()
    }

    /// Summarizes `next` against the last accepted snapshot across three
    /// independent categories: risk additions, task-vector transitions,
    /// and progress delta.
    pub fn diff(&self, next: &Snapshot) -> String {
        let Some(previous) = &self.last_accepted else {
            return FIRST_SNAPSHOT_SENTINEL.to_string();
        };

        let mut report = Vec::new();

        let known_risks: HashSet<&str> = previous.risk_ids().collect();
        let mut seen = HashSet::new();
        let added: Vec<&str> = next
            .risk_ids()
            .filter(|id| !known_risks.contains(id) && seen.insert(*id))
            .collect();
        if !added.is_empty() {
            report.push(format!("new risks: {}", added.join(", ")));
        }

        let old_tasks: HashSet<&str> = previous.task_ids().collect();
        let new_tasks: HashSet<&str> = next.task_ids().collect();
        let completed = old_tasks.difference(&new_tasks).count();
        let started = new_tasks.difference(&old_tasks).count();
        if completed > 0 {
            report.push(format!("completed {completed} task(s)"));
        }
        if started > 0 {
            report.push(format!("started {started} task(s)"));
        }

        let old_pct = previous.progress_pct();
        let new_pct = next.progress_pct();
        if old_pct != new_pct {
            report.push(format!("progress: {old_pct}% -> {new_pct}%"));
        }

        if report.is_empty() {
            NO_CHANGES_SENTINEL.to_string()
        } else {
            report.join(DIFF_SEPARATOR)
        }
    }

    /// Makes `next` the comparison baseline. Call only after persistence
    /// of `next` fully succeeded.
    pub fn adopt(&mut self, next: Snapshot) {
        self.last_accepted = Some(next);
    }
}
