use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Device - a monitored device derived from a zone snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub idx_device: i64,
    /// Owning zone
    pub idx_zone: i64,
    pub hostname: String,
    /// Raw device section of the snapshot, as JSON
    pub payload: serde_json::Value,
    pub enabled: bool,
    pub ts_created: DateTime<Utc>,
    pub ts_modified: DateTime<Utc>,
}

/// Insert payload for the device table
#[derive(Debug, Clone, PartialEq)]
pub struct NewDevice {
    pub idx_zone: i64,
    pub hostname: String,
    pub payload: serde_json::Value,
    pub enabled: bool,
}
