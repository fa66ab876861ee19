//! Zone rows, scoped to a generation

#![allow(clippy::result_large_err)]

use rusqlite::{Connection, OptionalExtension, Row};
use topoingest_core::model::{NewZone, Zone};

use crate::errors::{not_found, persistence, Result};
use crate::repo::{now_text, timestamp};

const COLUMNS: &str = "idx_zone, idx_event, name, company_name, address_0, address_1, \
     address_2, city, state, country, postal_code, phone, notes, enabled, ts_created, ts_modified";

/// Accessors for the `zone` table
pub struct ZoneRepo;

impl ZoneRepo {
    /// Find the zone with `name` under generation `idx_event`
    pub fn exists(conn: &Connection, idx_event: i64, name: &str) -> Result<Option<Zone>> {
        conn.query_row(
            &format!("SELECT {COLUMNS} FROM zone WHERE idx_event = ?1 AND name = ?2"),
            rusqlite::params![idx_event, name],
            map_zone,
        )
        .optional()
        .map_err(|e| persistence("zone_exists", e))
    }

    pub fn idx_exists(conn: &Connection, idx_zone: i64) -> Result<Option<Zone>> {
        conn.query_row(
            &format!("SELECT {COLUMNS} FROM zone WHERE idx_zone = ?1"),
            [idx_zone],
            map_zone,
        )
        .optional()
        .map_err(|e| persistence("zone_idx_exists", e))
    }

    /// Insert a zone; the store assigns the identifier
    pub fn insert_row(conn: &Connection, zone: &NewZone) -> Result<i64> {
        let now = now_text();
        conn.execute(
            "INSERT INTO zone (idx_event, name, company_name, address_0, address_1, address_2,
                               city, state, country, postal_code, phone, notes, enabled,
                               ts_created, ts_modified)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?14)",
            rusqlite::params![
                zone.idx_event,
                zone.name,
                zone.company_name,
                zone.address_0,
                zone.address_1,
                zone.address_2,
                zone.city,
                zone.state,
                zone.country,
                zone.postal_code,
                zone.phone,
                zone.notes,
                zone.enabled,
                now,
            ],
        )
        .map_err(|e| persistence("zone_insert", e))?;
        Ok(conn.last_insert_rowid())
    }

    /// Rewrite a zone's descriptive columns
    pub fn update_row(conn: &Connection, idx_zone: i64, zone: &NewZone) -> Result<()> {
        let changed = conn
            .execute(
                "UPDATE zone SET idx_event = ?1, name = ?2, company_name = ?3, address_0 = ?4,
                                 address_1 = ?5, address_2 = ?6, city = ?7, state = ?8,
                                 country = ?9, postal_code = ?10, phone = ?11, notes = ?12,
                                 enabled = ?13, ts_modified = ?14
                 WHERE idx_zone = ?15",
                rusqlite::params![
                    zone.idx_event,
                    zone.name,
                    zone.company_name,
                    zone.address_0,
                    zone.address_1,
                    zone.address_2,
                    zone.city,
                    zone.state,
                    zone.country,
                    zone.postal_code,
                    zone.phone,
                    zone.notes,
                    zone.enabled,
                    now_text(),
                    idx_zone,
                ],
            )
            .map_err(|e| persistence("zone_update", e))?;
        if changed == 0 {
            return Err(not_found("zone_update", "Zone", idx_zone));
        }
        Ok(())
    }

    /// Zones of one generation, ordered by name
    pub fn list_for_event(conn: &Connection, idx_event: i64) -> Result<Vec<Zone>> {
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {COLUMNS} FROM zone WHERE idx_event = ?1 ORDER BY name"
            ))
            .map_err(|e| persistence("zone_list", e))?;
        let zones = stmt
            .query_map([idx_event], map_zone)
            .map_err(|e| persistence("zone_list", e))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| persistence("zone_list", e))?;
        Ok(zones)
    }

    pub fn count_for_event(conn: &Connection, idx_event: i64) -> Result<i64> {
        conn.query_row(
            "SELECT COUNT(*) FROM zone WHERE idx_event = ?1",
            [idx_event],
            |row| row.get(0),
        )
        .map_err(|e| persistence("zone_count", e))
    }
}

fn map_zone(row: &Row<'_>) -> rusqlite::Result<Zone> {
    Ok(Zone {
        idx_zone: row.get(0)?,
        idx_event: row.get(1)?,
        name: row.get(2)?,
        company_name: row.get(3)?,
        address_0: row.get(4)?,
        address_1: row.get(5)?,
        address_2: row.get(6)?,
        city: row.get(7)?,
        state: row.get(8)?,
        country: row.get(9)?,
        postal_code: row.get(10)?,
        phone: row.get(11)?,
        notes: row.get(12)?,
        enabled: row.get(13)?,
        ts_created: timestamp(row, 14)?,
        ts_modified: timestamp(row, 15)?,
    })
}
