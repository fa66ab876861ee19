use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of the root record readers resolve the active generation through
pub const DEFAULT_ROOT_IDX: i64 = 1;

/// Name of the default root record
pub const DEFAULT_ROOT_NAME: &str = "default";

/// Root - the reader-visible pointer to the active generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Root {
    pub idx_root: i64,
    /// Active generation
    pub idx_event: i64,
    pub name: String,
    pub enabled: bool,
    pub ts_created: DateTime<Utc>,
    pub ts_modified: DateTime<Utc>,
}

/// Insert/update payload for the root table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRoot {
    pub idx_event: i64,
    pub name: String,
    pub enabled: bool,
}

impl NewRoot {
    /// The default root pointing at `idx_event`
    pub fn pointing_at(idx_event: i64) -> Self {
        Self {
            idx_event,
            name: DEFAULT_ROOT_NAME.to_string(),
            enabled: true,
        }
    }
}
