//! Per-entity accessors over the topology tables
//!
//! The ingest pipeline goes through these narrow accessors and never issues
//! its own SQL.

#![allow(clippy::result_large_err)]

pub mod device;
pub mod event;
pub mod root;
pub mod zone;

pub use device::DeviceRepo;
pub use event::EventRepo;
pub use root::RootRepo;
pub use zone::ZoneRepo;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::Row;

/// Current time in the text form stored in `ts_*` columns
pub(crate) fn now_text() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Read a `ts_*` column
pub(crate) fn timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
