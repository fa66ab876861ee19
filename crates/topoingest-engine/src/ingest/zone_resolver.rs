//! Zone resolution
//!
//! Runs on the coordinating thread only, before any unit is dispatched.
//! Doing it from workers could create two zones with the same name.

#![allow(clippy::result_large_err)]

use std::collections::HashMap;

use rusqlite::Connection;
use topoingest_core::errors::{ExError, ExErrorKind, Result};
use topoingest_core::model::{NewZone, SnapshotFile, SnapshotUnit};
use topoingest_store::repo::ZoneRepo;

/// Map a zone name to its identifier under `idx_event`, creating it if absent
pub fn resolve_zone(conn: &Connection, idx_event: i64, name: &str) -> Result<i64> {
    if let Some(zone) = ZoneRepo::exists(conn, idx_event, name)? {
        return Ok(zone.idx_zone);
    }

    ZoneRepo::insert_row(conn, &NewZone::named(idx_event, name))?;
    let zone = ZoneRepo::exists(conn, idx_event, name)?.ok_or_else(|| {
        ExError::new(ExErrorKind::InvariantViolation)
            .with_op("resolve_zone")
            .with_entity_id(name.to_string())
            .with_message("zone row missing immediately after insert")
    })?;
    tracing::debug!(idx_event, idx_zone = zone.idx_zone, zone = name, "created zone");
    Ok(zone.idx_zone)
}

/// Turn readable snapshots into units, resolving each zone once
pub fn build_units(
    conn: &Connection,
    idx_event: i64,
    snapshots: Vec<SnapshotFile>,
) -> Result<Vec<SnapshotUnit>> {
    let mut resolved: HashMap<String, i64> = HashMap::new();
    let mut units = Vec::with_capacity(snapshots.len());

    for snapshot in snapshots {
        let zone_id = match resolved.get(&snapshot.zone) {
            Some(id) => *id,
            None => {
                let id = resolve_zone(conn, idx_event, &snapshot.zone)?;
                resolved.insert(snapshot.zone.clone(), id);
                id
            }
        };
        units.push(SnapshotUnit::new(zone_id, snapshot.payload, snapshot.path));
    }

    Ok(units)
}
