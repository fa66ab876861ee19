//! The root pointer

#![allow(clippy::result_large_err)]

use rusqlite::{Connection, OptionalExtension, Row};
use topoingest_core::model::{NewRoot, Root};

use crate::errors::{not_found, persistence, Result};
use crate::repo::{now_text, timestamp};

const COLUMNS: &str = "idx_root, idx_event, name, enabled, ts_created, ts_modified";

/// Accessors for the `root` table
pub struct RootRepo;

impl RootRepo {
    /// Find a root by name
    pub fn exists(conn: &Connection, name: &str) -> Result<Option<Root>> {
        conn.query_row(
            &format!("SELECT {COLUMNS} FROM root WHERE name = ?1"),
            [name],
            map_root,
        )
        .optional()
        .map_err(|e| persistence("root_exists", e))
    }

    pub fn idx_exists(conn: &Connection, idx_root: i64) -> Result<Option<Root>> {
        conn.query_row(
            &format!("SELECT {COLUMNS} FROM root WHERE idx_root = ?1"),
            [idx_root],
            map_root,
        )
        .optional()
        .map_err(|e| persistence("root_idx_exists", e))
    }

    /// Insert a root at a fixed identifier
    pub fn insert_row(conn: &Connection, idx_root: i64, root: &NewRoot) -> Result<()> {
        let now = now_text();
        conn.execute(
            "INSERT INTO root (idx_root, idx_event, name, enabled, ts_created, ts_modified)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            rusqlite::params![idx_root, root.idx_event, root.name, root.enabled, now],
        )
        .map_err(|e| persistence("root_insert", e))?;
        Ok(())
    }

    /// Single-row rewrite of the root record
    pub fn update_row(conn: &Connection, idx_root: i64, root: &NewRoot) -> Result<()> {
        let changed = conn
            .execute(
                "UPDATE root SET idx_event = ?1, name = ?2, enabled = ?3, ts_modified = ?4
                 WHERE idx_root = ?5",
                rusqlite::params![root.idx_event, root.name, root.enabled, now_text(), idx_root],
            )
            .map_err(|e| persistence("root_update", e))?;
        if changed == 0 {
            return Err(not_found("root_update", "Root", idx_root));
        }
        Ok(())
    }
}

fn map_root(row: &Row<'_>) -> rusqlite::Result<Root> {
    Ok(Root {
        idx_root: row.get(0)?,
        idx_event: row.get(1)?,
        name: row.get(2)?,
        enabled: row.get(3)?,
        ts_created: timestamp(row, 4)?,
        ts_modified: timestamp(row, 5)?,
    })
}
