//! Snapshot payloads and the units of work built from them
//!
//! A snapshot is one poller file describing one zone. Apart from `misc.zone`
//! its content is opaque here; it is carried through to the apply collaborator
//! unchanged.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Opaque snapshot document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotPayload(serde_json::Value);

impl SnapshotPayload {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// The routing key: `misc.zone`, if present, a string, and not blank
    ///
    /// The name is returned exactly as written; only all-whitespace names are
    /// rejected.
    pub fn zone_name(&self) -> Option<&str> {
        self.0
            .pointer("/misc/zone")
            .and_then(|v| v.as_str())
            .filter(|name| !name.trim().is_empty())
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn into_value(self) -> serde_json::Value {
        self.0
    }
}

/// A staged snapshot whose zone name has been extracted
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotFile {
    pub path: PathBuf,
    pub zone: String,
    pub payload: SnapshotPayload,
}

/// Unit of work handed to the worker pool
///
/// Built by the coordinator after zone resolution and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotUnit {
    zone_id: i64,
    payload: SnapshotPayload,
    source: PathBuf,
}

impl SnapshotUnit {
    pub fn new(zone_id: i64, payload: SnapshotPayload, source: impl Into<PathBuf>) -> Self {
        Self {
            zone_id,
            payload,
            source: source.into(),
        }
    }

    /// Zone identifier resolved for this unit's generation
    pub fn zone_id(&self) -> i64 {
        self.zone_id
    }

    pub fn payload(&self) -> &SnapshotPayload {
        &self.payload
    }

    /// Staged file the unit was read from
    pub fn source(&self) -> &Path {
        &self.source
    }
}
