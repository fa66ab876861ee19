use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event - one generation of topology data
///
/// Every ingest run that stages at least one readable snapshot creates exactly
/// one Event. All zones (and, through them, devices) written by that run are
/// tagged with its `idx_event`. Rows are immutable after creation; they are
/// only ever removed by retention pruning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Store-assigned, monotonically increasing identifier
    pub idx_event: i64,

    /// Unique name (UUID v7 for generations created by ingest)
    pub name: String,

    /// Whether the generation is enabled
    pub enabled: bool,

    /// Timestamp when the generation was created
    pub ts_created: DateTime<Utc>,

    /// Timestamp when the row was last modified
    pub ts_modified: DateTime<Utc>,
}

/// Insert payload for the event table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub name: String,
    pub enabled: bool,
}

impl NewEvent {
    /// Create an enabled event with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
        }
    }

    /// Create an enabled event with a fresh time-ordered name
    pub fn generation() -> Self {
        Self::new(uuid::Uuid::now_v7().to_string())
    }
}
