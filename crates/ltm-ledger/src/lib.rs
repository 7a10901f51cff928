//! Session ledger for LTM snapshots: semantic diffing against the last
//! accepted snapshot plus the accept-pipeline state machine that decides
//! when a new snapshot becomes the accepted one.

mod differ;
mod pipeline;

pub use differ::{SnapshotDiffer, DIFF_SEPARATOR, FIRST_SNAPSHOT_SENTINEL, NO_CHANGES_SENTINEL};
pub use pipeline::{
    AcceptOutcome, AcceptState, LedgerSession, PersistSink, RejectReason, TransitionError,
};
