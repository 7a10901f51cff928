use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Error raised when a document cannot be decoded into a [`Snapshot`].
///
/// Covers both "not a mapping at all" and "recognized field has the wrong
/// shape" (for example `UV` not a sequence of 2-tuples, or `PAY.pct` not
/// numeric). Decoding fails fast here so downstream metrics and diff code
/// only ever see well-shaped values.
#[derive(Debug, Error)]
pub enum SnapshotShapeError {
    #[error("snapshot document is not a JSON object")]
    NotAnObject,
    #[error("snapshot field has unexpected shape: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("failed to encode snapshot canonically: {0}")]
    Encode(#[source] serde_json::Error),
}

/// One open task unit: `(id, payload)`. The id is the identifying element;
/// the payload is opaque to the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskVector(pub String, pub Value);

impl TaskVector {
    pub fn id(&self) -> &str {
        &self.0
    }
}

/// Severity of a risk entry. `critical` is the only level the ledger
/// distinguishes; everything else is carried through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RiskLevel {
    Critical,
    Other(String),
}

impl RiskLevel {
    pub fn is_critical(&self) -> bool {
        matches!(self, Self::Critical)
    }
}

impl From<String> for RiskLevel {
    fn from(raw: String) -> Self {
        if raw == "critical" {
            Self::Critical
        } else {
            Self::Other(raw)
        }
    }
}

impl From<RiskLevel> for String {
    fn from(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Critical => "critical".to_string(),
            RiskLevel::Other(raw) => raw,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Critical => f.write_str("critical"),
            Self::Other(raw) => f.write_str(raw),
        }
    }
}

/// A named risk carried by the snapshot; identity is the `id` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskEntry {
    pub id: String,
    pub level: RiskLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

/// A dependency carried by the extended schema tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyEntry {
    pub id: String,
    pub comp: String,
}

fn zero_pct() -> Number {
    Number::from(0)
}

/// Progress payload (`PAY`): at least `pct`, unknown keys retained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressPayload {
    #[serde(default = "zero_pct")]
    pub pct: Number,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One versioned LTM context snapshot, decoded from transport JSON.
///
/// Every recognized field is optional at this level; which fields must be
/// present is the validator's concern, not the decoder's. Field names on
/// the wire are the stable short codes of the bridge schema. Unrecognized
/// keys are kept in `extra` so re-encoding loses nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "ALN", default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Value>,
    #[serde(rename = "MR", default, skip_serializing_if = "Option::is_none")]
    pub mission: Option<Value>,
    #[serde(rename = "CTX", default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
    #[serde(rename = "OBJ", default, skip_serializing_if = "Option::is_none")]
    pub objectives: Option<Value>,
    #[serde(rename = "CON", default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Value>,
    #[serde(rename = "ST_H", default, skip_serializing_if = "Option::is_none")]
    pub state_hash: Option<Value>,
    #[serde(rename = "UV", default, skip_serializing_if = "Option::is_none")]
    pub unresolved_vectors: Option<Vec<TaskVector>>,
    #[serde(rename = "PAY", default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<ProgressPayload>,
    #[serde(rename = "RSK", default, skip_serializing_if = "Option::is_none")]
    pub risks: Option<Vec<RiskEntry>>,
    #[serde(rename = "DEP", default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Vec<DependencyEntry>>,
    #[serde(rename = "BC", default, skip_serializing_if = "Option::is_none")]
    pub bootstrap: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Snapshot {
    /// Decodes a parsed JSON value into a typed snapshot, failing fast on
    /// any recognized field with the wrong shape.
    pub fn from_value(value: Value) -> Result<Self, SnapshotShapeError> {
        if !value.is_object() {
            return Err(SnapshotShapeError::NotAnObject);
        }
        serde_json::from_value(value).map_err(SnapshotShapeError::Decode)
    }

    /// Parses and decodes raw transport JSON in one step.
    pub fn from_json_str(raw: &str) -> Result<Self, SnapshotShapeError> {
        let value: Value = serde_json::from_str(raw).map_err(SnapshotShapeError::Decode)?;
        Self::from_value(value)
    }

    /// Canonical JSON encoding of the snapshot: declared field order,
    /// unknown keys last. The token estimate is defined over this string.
    pub fn canonical_json(&self) -> Result<String, SnapshotShapeError> {
        serde_json::to_string(self).map_err(SnapshotShapeError::Encode)
    }

    /// Presence check by wire field code, used by the layered schema.
    pub fn has_field(&self, code: &str) -> bool {
        match code {
            "ALN" => self.alignment.is_some(),
            "MR" => self.mission.is_some(),
            "CTX" => self.context.is_some(),
            "OBJ" => self.objectives.is_some(),
            "CON" => self.constraints.is_some(),
            "ST_H" => self.state_hash.is_some(),
            "UV" => self.unresolved_vectors.is_some(),
            "PAY" => self.progress.is_some(),
            "RSK" => self.risks.is_some(),
            "DEP" => self.dependencies.is_some(),
            "BC" => self.bootstrap.is_some(),
            other => self.extra.contains_key(other),
        }
    }

    /// Ids of the open task vectors, in document order.
    pub fn task_ids(&self) -> impl Iterator<Item = &str> {
        self.unresolved_vectors
            .iter()
            .flatten()
            .map(TaskVector::id)
    }

    /// Ids of the risk entries, in document order.
    pub fn risk_ids(&self) -> impl Iterator<Item = &str> {
        self.risks.iter().flatten().map(|risk| risk.id.as_str())
    }

    /// Progress percentage, defaulting to zero when `PAY` is absent.
    pub fn progress_pct(&self) -> f64 {
        self.progress
            .as_ref()
            .and_then(|payload| payload.pct.as_f64())
            .unwrap_or(0.0)
    }
}
