//! Device rows written by the default applier

#![allow(clippy::result_large_err)]

use rusqlite::{Connection, OptionalExtension, Row};
use topoingest_core::model::{Device, NewDevice};

use crate::errors::{persistence, Result};
use crate::repo::{now_text, timestamp};

const COLUMNS: &str = "idx_device, idx_zone, hostname, payload, enabled, ts_created, ts_modified";

/// Accessors for the `device` table
pub struct DeviceRepo;

impl DeviceRepo {
    /// Find a device by hostname within a zone
    pub fn exists(conn: &Connection, idx_zone: i64, hostname: &str) -> Result<Option<Device>> {
        conn.query_row(
            &format!("SELECT {COLUMNS} FROM device WHERE idx_zone = ?1 AND hostname = ?2"),
            rusqlite::params![idx_zone, hostname],
            map_device,
        )
        .optional()
        .map_err(|e| persistence("device_exists", e))
    }

    pub fn idx_exists(conn: &Connection, idx_device: i64) -> Result<Option<Device>> {
        conn.query_row(
            &format!("SELECT {COLUMNS} FROM device WHERE idx_device = ?1"),
            [idx_device],
            map_device,
        )
        .optional()
        .map_err(|e| persistence("device_idx_exists", e))
    }

    /// Insert a device, or refresh the existing row for the same hostname in the zone
    pub fn upsert_row(conn: &Connection, device: &NewDevice) -> Result<i64> {
        conn.query_row(
            "INSERT INTO device (idx_zone, hostname, payload, enabled, ts_created, ts_modified)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)
             ON CONFLICT(idx_zone, hostname) DO UPDATE SET
                payload = excluded.payload,
                enabled = excluded.enabled,
                ts_modified = excluded.ts_modified
             RETURNING idx_device",
            rusqlite::params![
                device.idx_zone,
                device.hostname,
                device.payload,
                device.enabled,
                now_text(),
            ],
            |row| row.get(0),
        )
        .map_err(|e| persistence("device_upsert", e))
    }

    /// Devices of one zone, ordered by hostname
    pub fn list_for_zone(conn: &Connection, idx_zone: i64) -> Result<Vec<Device>> {
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {COLUMNS} FROM device WHERE idx_zone = ?1 ORDER BY hostname"
            ))
            .map_err(|e| persistence("device_list", e))?;
        let devices = stmt
            .query_map([idx_zone], map_device)
            .map_err(|e| persistence("device_list", e))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| persistence("device_list", e))?;
        Ok(devices)
    }

    pub fn count(conn: &Connection) -> Result<i64> {
        conn.query_row("SELECT COUNT(*) FROM device", [], |row| row.get(0))
            .map_err(|e| persistence("device_count", e))
    }
}

fn map_device(row: &Row<'_>) -> rusqlite::Result<Device> {
    Ok(Device {
        idx_device: row.get(0)?,
        idx_zone: row.get(1)?,
        hostname: row.get(2)?,
        payload: row.get(3)?,
        enabled: row.get(4)?,
        ts_created: timestamp(row, 5)?,
        ts_modified: timestamp(row, 6)?,
    })
}
