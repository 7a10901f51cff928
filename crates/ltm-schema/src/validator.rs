//! Layered, presence-based schema validation plus the derived metrics and
//! audit-checklist generation used for human review of a snapshot.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::snapshot::{RiskEntry, Snapshot, SnapshotShapeError};

/// Core fields every schema-valid snapshot must carry.
pub const REQUIRED_FIELDS: [&str; 8] = ["ALN", "MR", "UV", "CTX", "OBJ", "CON", "PAY", "ST_H"];

/// Extension fields whose joint presence upgrades the detected tier.
pub const EXTENDED_FIELDS: [&str; 3] = ["DEP", "RSK", "BC"];

/// Fixed divisor of the byte-length token heuristic. A compatibility
/// constant inherited from the bridge protocol, not a tokenizer.
pub const TOKEN_ESTIMATE_DIVISOR: f64 = 4.0;

/// Error returned when a snapshot fails schema validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
}

impl SchemaError {
    /// The exact set of absent required fields, in schema order.
    pub fn missing_fields(&self) -> &[&'static str] {
        match self {
            Self::MissingFields(fields) => fields,
        }
    }
}

/// Detected schema tier. There is no declared version field; the tier is
/// read off the presence of the extension set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaTier {
    Standard,
    Extended,
}

impl fmt::Display for SchemaTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => f.write_str("v1.1 (Standard)"),
            Self::Extended => f.write_str("v1.2 (Risk-Aware)"),
        }
    }
}

/// Informational benchmark metrics derived from a snapshot's structure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotMetrics {
    pub estimated_tokens: f64,
    pub unresolved_vectors: usize,
    pub risks: usize,
    pub dependencies: usize,
}

/// Checks the required core field set and detects the schema tier.
///
/// Only key presence is checked here; value shapes were already enforced
/// when the document was decoded into a [`Snapshot`].
pub fn validate(snapshot: &Snapshot) -> Result<SchemaTier, SchemaError> {
    let missing: Vec<&'static str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| !snapshot.has_field(field))
        .collect();
    if !missing.is_empty() {
        return Err(SchemaError::MissingFields(missing));
    }

    let extended = EXTENDED_FIELDS
        .iter()
        .all(|field| snapshot.has_field(field));
    Ok(if extended {
        SchemaTier::Extended
    } else {
        SchemaTier::Standard
    })
}

/// Computes benchmark metrics. Purely informational; no value here can
/// fail validation.
pub fn metrics(snapshot: &Snapshot) -> Result<SnapshotMetrics, SnapshotShapeError> {
    let canonical = snapshot.canonical_json()?;
    Ok(SnapshotMetrics {
        estimated_tokens: canonical.len() as f64 / TOKEN_ESTIMATE_DIVISOR,
        unresolved_vectors: snapshot
            .unresolved_vectors
            .as_ref()
            .map_or(0, Vec::len),
        risks: snapshot.risks.as_ref().map_or(0, Vec::len),
        dependencies: snapshot.dependencies.as_ref().map_or(0, Vec::len),
    })
}

fn display_scalar(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Generates the handshake audit checklist: one line for the state hash,
/// one per risk entry, one per dependency, in document order.
pub fn audit_checklist(snapshot: &Snapshot) -> Vec<String> {
    let state_hash = snapshot
        .state_hash
        .as_ref()
        .map_or_else(|| "(unset)".to_string(), display_scalar);

    let mut lines = vec![format!("[ ] target acknowledged ST_H: {state_hash}")];
    for risk in snapshot.risks.iter().flatten() {
        lines.push(format!(
            "[ ] target mitigated RSK {} ({})",
            risk.id, risk.level
        ));
    }
    for dep in snapshot.dependencies.iter().flatten() {
        lines.push(format!("[ ] target verified DEP {} ({})", dep.id, dep.comp));
    }
    lines
}

/// Risk entries with the distinguished `critical` level, for escalation
/// by the reporting layer.
pub fn critical_risks(snapshot: &Snapshot) -> Vec<&RiskEntry> {
    snapshot
        .risks
        .iter()
        .flatten()
        .filter(|risk| risk.level.is_critical())
        .collect()
}
