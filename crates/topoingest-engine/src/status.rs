//! Read-side summary of the store and markers

#![allow(clippy::result_large_err)]

use std::fmt;

use rusqlite::Connection;
use topoingest_core::config::IngestConfig;
use topoingest_core::errors::Result;
use topoingest_core::model::Event;
use topoingest_store::markers::{INGEST_AGENT, POLLER_AGENT};
use topoingest_store::repo::{EventRepo, ZoneRepo};
use topoingest_store::{LockCoordinator, SkipMarker};

use crate::ingest::activation::active_generation;

#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    /// Generation the root pointer references
    pub active: Option<Event>,
    pub active_zones: i64,
    pub generations: i64,
    pub ingest_locked: bool,
    pub poller_locked: bool,
    pub skip_requested: bool,
}

pub fn status(config: &IngestConfig, conn: &Connection) -> Result<StatusReport> {
    let active = active_generation(conn)?;
    let active_zones = match &active {
        Some(event) => ZoneRepo::count_for_event(conn, event.idx_event)?,
        None => 0,
    };
    let locks = LockCoordinator::new(config.lock_directory());

    Ok(StatusReport {
        active,
        active_zones,
        generations: EventRepo::count(conn)?,
        ingest_locked: locks.peek(INGEST_AGENT),
        poller_locked: locks.peek(POLLER_AGENT),
        skip_requested: SkipMarker::in_directory(&config.lock_directory()).is_present(),
    })
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.active {
            Some(event) => writeln!(
                f,
                "active generation: {} ({}, created {})",
                event.idx_event,
                event.name,
                event.ts_created.to_rfc3339()
            )?,
            None => writeln!(f, "active generation: none")?,
        }
        writeln!(f, "zones in active generation: {}", self.active_zones)?;
        writeln!(f, "generations stored: {}", self.generations)?;
        writeln!(f, "ingest lock: {}", presence(self.ingest_locked))?;
        writeln!(f, "poller lock: {}", presence(self.poller_locked))?;
        write!(f, "skip marker: {}", presence(self.skip_requested))
    }
}

fn presence(present: bool) -> &'static str {
    if present {
        "present"
    } else {
        "absent"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use topoingest_store::migrations::apply_migrations;

    #[test]
    fn test_status_of_fresh_store() {
        let dir = TempDir::new().unwrap();
        let config = IngestConfig::rooted_at(dir.path());
        std::fs::create_dir_all(config.lock_directory()).unwrap();
        let mut conn = topoingest_store::db::open_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();

        let report = status(&config, &conn).unwrap();

        assert_eq!(report.active.as_ref().map(|e| e.idx_event), Some(1));
        assert_eq!(report.active_zones, 0);
        assert_eq!(report.generations, 1);
        assert!(!report.ingest_locked);
        assert!(!report.skip_requested);
        assert!(report.to_string().contains("poller lock: absent"));
    }
}
