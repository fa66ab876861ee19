//! Correlation identifiers for ingest runs
//!
//! Every pipeline pass gets a fresh [`RunId`] which is attached to the run's
//! tracing span, so log lines emitted by worker threads can be grouped with
//! the coordinator's.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a single ingest run
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(String);

impl RunId {
    /// Generate a new time-ordered RunId using UUIDv7
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Create from an existing string (for deserialization)
    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_id_unique() {
        let a = RunId::new();
        let b = RunId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_run_id_time_ordered() {
        let a = RunId::new();
        let b = RunId::new();
        assert!(a.as_str() < b.as_str());
    }

    #[test]
    fn test_run_id_serde_transparent_roundtrip() {
        let id = RunId::from_string("run-1".to_string());
        let json = serde_json::to_string(&id).unwrap();
        let back: RunId = serde_json::from_str(&json).unwrap();
        assert_eq!(back.as_str(), "run-1");
        assert_eq!(id.to_string(), "run-1");
    }
}
