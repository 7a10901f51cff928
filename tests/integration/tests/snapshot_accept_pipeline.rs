//! End-to-end accept-pipeline coverage: raw transport JSON through decode,
//! validation, diffing, persistence, and adoption.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Result};

use ltm_core::write_text_atomic;
use ltm_ledger::{
    AcceptOutcome, LedgerSession, PersistSink, RejectReason, FIRST_SNAPSHOT_SENTINEL,
    NO_CHANGES_SENTINEL,
};
use ltm_schema::{validator, SchemaTier, Snapshot};

fn base_document() -> serde_json::Value {
    serde_json::json!({
        "ALN": "operator<->agent",
        "MR": "ship the ledger core",
        "CTX": {"repo": "ltm-bridge"},
        "OBJ": ["v1"],
        "CON": "single session",
        "ST_H": "f00d",
        "UV": [["T1", {"note": "decode"}], ["T2", {"note": "diff"}]],
        "PAY": {"pct": 40},
        "RSK": [{"id": "R1", "level": "low", "desc": "churn"}],
        "DEP": [{"id": "D1", "comp": "serde"}],
        "BC": "rehydrate from ST_H"
    })
}

fn decode(value: serde_json::Value) -> Snapshot {
    Snapshot::from_value(value).expect("decode")
}

/// Writes each accepted snapshot as `<n>.json` into a temp ledger dir,
/// optionally failing to simulate a broken publish step.
struct LedgerDirSink {
    dir: PathBuf,
    written: usize,
    fail_next: bool,
}

impl LedgerDirSink {
    fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            written: 0,
            fail_next: false,
        }
    }
}

impl PersistSink for LedgerDirSink {
    fn persist(&mut self, snapshot: &Snapshot, summary: &str) -> Result<String> {
        if self.fail_next {
            self.fail_next = false;
            bail!("publish rejected by remote");
        }
        self.written += 1;
        let path = self.dir.join(format!("{}.json", self.written));
        let body = snapshot.canonical_json()?;
        write_text_atomic(&path, &body)?;
        write_text_atomic(&self.dir.join(format!("{}.diff", self.written)), summary)?;
        Ok(path.display().to_string())
    }
}

#[test]
fn full_session_flow_from_transport_json() {
    let temp = tempfile::tempdir().expect("tempdir");
    let mut sink = LedgerDirSink::new(temp.path().to_path_buf());
    let mut session = LedgerSession::new();

    // First snapshot: extended tier, first-snapshot sentinel.
    let outcome = session
        .commit(decode(base_document()), &mut sink)
        .expect("commit");
    match outcome {
        AcceptOutcome::Adopted { tier, summary, .. } => {
            assert_eq!(tier, SchemaTier::Extended);
            assert_eq!(summary, FIRST_SNAPSHOT_SENTINEL);
        }
        other => panic!("expected adoption, got {other:?}"),
    }

    // Second revision: T1 done, T3 opened, new critical risk, progress up.
    let mut revision = base_document();
    revision["UV"] = serde_json::json!([["T2", {}], ["T3", {}]]);
    revision["RSK"] = serde_json::json!([
        {"id": "R1", "level": "low"},
        {"id": "R2", "level": "critical", "desc": "schema drift"}
    ]);
    revision["PAY"] = serde_json::json!({"pct": 55});

    let outcome = session
        .commit(decode(revision.clone()), &mut sink)
        .expect("commit");
    match outcome {
        AcceptOutcome::Adopted {
            summary, critical, ..
        } => {
            assert_eq!(
                summary,
                "new risks: R2 | completed 1 task(s) | started 1 task(s) | progress: 40% -> 55%"
            );
            // Escalation data rides on the adopted outcome.
            assert_eq!(critical.len(), 1);
            assert_eq!(critical[0].id, "R2");
        }
        other => panic!("expected adoption, got {other:?}"),
    }

    // Committing the identical revision is a semantic no-op.
    let outcome = session.commit(decode(revision), &mut sink).expect("commit");
    match outcome {
        AcceptOutcome::Adopted { summary, .. } => assert_eq!(summary, NO_CHANGES_SENTINEL),
        other => panic!("expected adoption, got {other:?}"),
    }

    // Every adopted snapshot is on disk, well formed.
    for index in 1..=3 {
        let body = fs::read_to_string(temp.path().join(format!("{index}.json"))).expect("read");
        let value: serde_json::Value = serde_json::from_str(&body).expect("parse");
        assert!(value.get("ST_H").is_some());
    }
}

#[test]
fn schema_rejection_stops_the_pipeline_before_persistence() {
    let temp = tempfile::tempdir().expect("tempdir");
    let mut sink = LedgerDirSink::new(temp.path().to_path_buf());
    let mut session = LedgerSession::new();

    let mut incomplete = base_document();
    incomplete.as_object_mut().expect("object").remove("PAY");
    incomplete.as_object_mut().expect("object").remove("ST_H");

    let outcome = session.commit(decode(incomplete), &mut sink).expect("commit");
    match outcome {
        AcceptOutcome::Rejected(RejectReason::Schema(error)) => {
            assert_eq!(error.missing_fields(), ["PAY", "ST_H"]);
        }
        other => panic!("expected schema rejection, got {other:?}"),
    }
    assert_eq!(sink.written, 0);
    assert!(session.differ().last_accepted().is_none());
}

#[test]
fn failed_publish_preserves_the_previous_baseline() {
    let temp = tempfile::tempdir().expect("tempdir");
    let mut sink = LedgerDirSink::new(temp.path().to_path_buf());
    let mut session = LedgerSession::new();

    session
        .commit(decode(base_document()), &mut sink)
        .expect("commit");

    let mut revision = base_document();
    revision["PAY"] = serde_json::json!({"pct": 90});

    sink.fail_next = true;
    let outcome = session
        .commit(decode(revision.clone()), &mut sink)
        .expect("commit");
    assert!(matches!(
        outcome,
        AcceptOutcome::Rejected(RejectReason::Persist(_))
    ));

    // Baseline still the 40% snapshot: the retry is not a first snapshot
    // and still reports the progress delta the failed publish never stored.
    let retry = session.commit(decode(revision), &mut sink).expect("commit");
    match retry {
        AcceptOutcome::Adopted { summary, .. } => {
            assert_eq!(summary, "progress: 40% -> 90%");
        }
        other => panic!("expected adoption, got {other:?}"),
    }
    assert_eq!(sink.written, 2);
}

#[test]
fn token_estimate_matches_the_canonical_encoding() {
    let snapshot = decode(base_document());
    let canonical = snapshot.canonical_json().expect("encode");
    let metrics = validator::metrics(&snapshot).expect("metrics");
    assert_eq!(metrics.estimated_tokens, canonical.len() as f64 / 4.0);
    assert_eq!(metrics.unresolved_vectors, 2);
    assert_eq!(metrics.risks, 1);
    assert_eq!(metrics.dependencies, 1);
}

#[test]
fn malformed_transport_payloads_fail_at_decode() {
    assert!(Snapshot::from_json_str("not json at all").is_err());
    assert!(Snapshot::from_json_str("[1, 2]").is_err());
    // Wrong shapes inside recognized fields fail fast at the boundary.
    assert!(Snapshot::from_json_str(r#"{"UV": "T1"}"#).is_err());
    assert!(Snapshot::from_json_str(r#"{"RSK": [{"level": "low"}]}"#).is_err());
}
