use anyhow::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use ltm_schema::{validator, RiskEntry, SchemaError, SchemaTier, Snapshot};

use crate::differ::SnapshotDiffer;

/// Error returned when an accept-pipeline state transition is invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid accept transition: {from:?} -> {to:?}")]
pub struct TransitionError {
    pub from: AcceptState,
    pub to: AcceptState,
}

/// Lifecycle state of one snapshot moving through the accept pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AcceptState {
    #[default]
    Received,
    Validating,
    Diffing,
    Persisting,
    Rejected,
    Adopted,
}

impl AcceptState {
    /// Returns true when this state can transition to `next`.
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Received, Self::Validating)
                | (Self::Validating, Self::Rejected)
                | (Self::Validating, Self::Diffing)
                | (Self::Diffing, Self::Persisting)
                | (Self::Persisting, Self::Rejected)
                | (Self::Persisting, Self::Adopted)
        )
    }

    /// Steps to `next`, or errors if the transition is not allowed.
    pub fn advance(self, next: Self) -> Result<Self, TransitionError> {
        if self.can_transition_to(next) {
            return Ok(next);
        }
        Err(TransitionError {
            from: self,
            to: next,
        })
    }

    /// Returns true when the snapshot's fate is decided.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Adopted)
    }
}

/// Why a snapshot was rejected by the pipeline.
#[derive(Debug)]
pub enum RejectReason {
    /// Required fields were missing; nothing was diffed or persisted.
    Schema(SchemaError),
    /// The persistence sink failed; the session baseline is unchanged.
    Persist(anyhow::Error),
}

/// Terminal result of driving one snapshot through the accept pipeline.
#[derive(Debug)]
pub enum AcceptOutcome {
    Rejected(RejectReason),
    Adopted {
        tier: SchemaTier,
        summary: String,
        receipt: String,
        /// Critical risk entries carried by the adopted snapshot, for
        /// escalation by the reporting layer. Populated only once the
        /// snapshot passed validation; a rejected snapshot escalates
        /// nothing.
        critical: Vec<RiskEntry>,
    },
}

impl AcceptOutcome {
    pub fn state(&self) -> AcceptState {
        match self {
            Self::Rejected(_) => AcceptState::Rejected,
            Self::Adopted { .. } => AcceptState::Adopted,
        }
    }

    pub fn is_adopted(&self) -> bool {
        matches!(self, Self::Adopted { .. })
    }
}

/// Durably records an accepted snapshot. Implementations own files, git,
/// or any other transport; the ledger core only sees success or failure.
pub trait PersistSink {
    /// Records `snapshot`, returning a human-readable receipt (for example
    /// the path written). The diff `summary` is provided for sinks that
    /// label their records with it.
    fn persist(&mut self, snapshot: &Snapshot, summary: &str) -> Result<String>;
}

/// Drives decoded snapshots through validate -> diff -> persist -> adopt,
/// holding the session's [`SnapshotDiffer`].
///
/// The baseline is updated only on the `Persisting -> Adopted` edge, so a
/// failed persist leaves future diffs anchored to what was last actually
/// recorded.
#[derive(Debug, Default)]
pub struct LedgerSession {
    differ: SnapshotDiffer,
}

impl LedgerSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn differ(&self) -> &SnapshotDiffer {
        &self.differ
    }

    /// Runs the accept pipeline for one snapshot. An `Err` here means an
    /// internal transition bug, never a bad document; document problems
    /// surface as [`AcceptOutcome::Rejected`].
    pub fn commit(
        &mut self,
        snapshot: Snapshot,
        sink: &mut dyn PersistSink,
    ) -> Result<AcceptOutcome, TransitionError> {
        let state = AcceptState::default().advance(AcceptState::Validating)?;

        let tier = match validator::validate(&snapshot) {
            Err(error) => {
                state.advance(AcceptState::Rejected)?;
                tracing::warn!(%error, "snapshot failed schema validation");
                return Ok(AcceptOutcome::Rejected(RejectReason::Schema(error)));
            }
            Ok(tier) => tier,
        };
        tracing::debug!(%tier, "snapshot schema accepted");

        let critical: Vec<RiskEntry> = validator::critical_risks(&snapshot)
            .into_iter()
            .cloned()
            .collect();

        let state = state.advance(AcceptState::Diffing)?;
        let summary = self.differ.diff(&snapshot);

        let state = state.advance(AcceptState::Persisting)?;
        match sink.persist(&snapshot, &summary) {
            Err(error) => {
                state.advance(AcceptState::Rejected)?;
                tracing::warn!(%error, "persistence failed; baseline unchanged");
                Ok(AcceptOutcome::Rejected(RejectReason::Persist(error)))
            }
            Ok(receipt) => {
                state.advance(AcceptState::Adopted)?;
                self.differ.adopt(snapshot);
                Ok(AcceptOutcome::Adopted {
                    tier,
                    summary,
                    receipt,
                    critical,
                })
            }
        }
    }
}
