//! Generation (event) rows

#![allow(clippy::result_large_err)]

use rusqlite::{Connection, OptionalExtension, Row};
use topoingest_core::model::{Event, NewEvent};

use crate::errors::{not_found, persistence, Result};
use crate::repo::{now_text, timestamp};

const COLUMNS: &str = "idx_event, name, enabled, ts_created, ts_modified";

/// Accessors for the `event` table
pub struct EventRepo;

impl EventRepo {
    /// Find an event by its unique name
    pub fn exists(conn: &Connection, name: &str) -> Result<Option<Event>> {
        conn.query_row(
            &format!("SELECT {COLUMNS} FROM event WHERE name = ?1"),
            [name],
            map_event,
        )
        .optional()
        .map_err(|e| persistence("event_exists", e))
    }

    /// Find an event by identifier
    pub fn idx_exists(conn: &Connection, idx_event: i64) -> Result<Option<Event>> {
        conn.query_row(
            &format!("SELECT {COLUMNS} FROM event WHERE idx_event = ?1"),
            [idx_event],
            map_event,
        )
        .optional()
        .map_err(|e| persistence("event_idx_exists", e))
    }

    /// Insert an event; the store assigns the identifier
    pub fn insert_row(conn: &Connection, event: &NewEvent) -> Result<i64> {
        let now = now_text();
        conn.execute(
            "INSERT INTO event (name, enabled, ts_created, ts_modified) VALUES (?1, ?2, ?3, ?3)",
            rusqlite::params![event.name, event.enabled, now],
        )
        .map_err(|e| persistence("event_insert", e))?;
        Ok(conn.last_insert_rowid())
    }

    /// Rewrite an event's mutable columns
    pub fn update_row(conn: &Connection, idx_event: i64, event: &NewEvent) -> Result<()> {
        let changed = conn
            .execute(
                "UPDATE event SET name = ?1, enabled = ?2, ts_modified = ?3 WHERE idx_event = ?4",
                rusqlite::params![event.name, event.enabled, now_text(), idx_event],
            )
            .map_err(|e| persistence("event_update", e))?;
        if changed == 0 {
            return Err(not_found("event_update", "Event", idx_event));
        }
        Ok(())
    }

    /// Delete one event; its zones and devices cascade
    pub fn delete(conn: &Connection, idx_event: i64) -> Result<bool> {
        let changed = conn
            .execute("DELETE FROM event WHERE idx_event = ?1", [idx_event])
            .map_err(|e| persistence("event_delete", e))?;
        Ok(changed > 0)
    }

    /// Delete every event older than `idx_event`, returning how many went
    pub fn purge_before(conn: &Connection, idx_event: i64) -> Result<usize> {
        conn.execute("DELETE FROM event WHERE idx_event < ?1", [idx_event])
            .map_err(|e| persistence("event_purge", e))
    }

    pub fn count(conn: &Connection) -> Result<i64> {
        conn.query_row("SELECT COUNT(*) FROM event", [], |row| row.get(0))
            .map_err(|e| persistence("event_count", e))
    }

    /// All events, oldest first
    pub fn list(conn: &Connection) -> Result<Vec<Event>> {
        let mut stmt = conn
            .prepare(&format!("SELECT {COLUMNS} FROM event ORDER BY idx_event"))
            .map_err(|e| persistence("event_list", e))?;
        let events = stmt
            .query_map([], map_event)
            .map_err(|e| persistence("event_list", e))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| persistence("event_list", e))?;
        Ok(events)
    }
}

fn map_event(row: &Row<'_>) -> rusqlite::Result<Event> {
    Ok(Event {
        idx_event: row.get(0)?,
        name: row.get(1)?,
        enabled: row.get(2)?,
        ts_created: timestamp(row, 3)?,
        ts_modified: timestamp(row, 4)?,
    })
}
