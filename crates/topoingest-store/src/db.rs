//! Database connection management
//!
//! Provides utilities for opening and managing SQLite connections

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, Result};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How long a writer waits on a locked database before giving up
const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

/// Open a SQLite database at the given path and configure it
pub fn open<P: AsRef<Path>>(path: P) -> Result<Connection> {
    let conn = Connection::open(path).map_err(from_rusqlite)?;
    configure(&conn)?;
    Ok(conn)
}

/// Open an in-memory SQLite database (for testing)
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().map_err(from_rusqlite)?;
    configure(&conn)?;
    Ok(conn)
}

/// Configure a connection with the settings every ingest connection relies on
pub fn configure(conn: &Connection) -> Result<()> {
    // Concurrent writers queue instead of failing
    conn.busy_timeout(BUSY_TIMEOUT).map_err(from_rusqlite)?;

    // Zones and devices cascade with their generation
    conn.pragma_update(None, "foreign_keys", "ON")
        .map_err(from_rusqlite)?;

    // WAL lets readers keep the previous generation while workers write.
    // In-memory databases report "memory" and that is fine.
    let _mode: String = conn
        .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
        .map_err(from_rusqlite)?;

    Ok(())
}

/// Something that can hand out fresh, private connections
///
/// Each pool worker opens its own connection through this; connections are
/// never shared between workers.
pub trait ConnectionSource: Send + Sync {
    fn open(&self) -> Result<Connection>;
}

/// Connection source backed by a database file
#[derive(Debug, Clone)]
pub struct DbPath(PathBuf);

impl DbPath {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl ConnectionSource for DbPath {
    fn open(&self) -> Result<Connection> {
        open(&self.0).map_err(|e| e.with_path(self.0.clone()))
    }
}
