//! Snapshot data model and schema validation for the LTM-Bridge ledger.
//!
//! A snapshot is decoded once at the boundary into a typed [`Snapshot`]
//! record; shape mismatches fail there instead of deep inside metrics or
//! diff code. Validation itself is presence-based: the layered schema has a
//! required core field set plus an extension set whose presence upgrades the
//! detected tier.

mod snapshot;
pub mod validator;

pub use snapshot::{
    DependencyEntry, ProgressPayload, RiskEntry, RiskLevel, Snapshot, SnapshotShapeError,
    TaskVector,
};
pub use validator::{
    audit_checklist, critical_risks, metrics, validate, SchemaError, SchemaTier, SnapshotMetrics,
    EXTENDED_FIELDS, REQUIRED_FIELDS, TOKEN_ESTIMATE_DIVISOR,
};
