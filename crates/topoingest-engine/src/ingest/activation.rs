//! Root pointer activation and retention pruning

#![allow(clippy::result_large_err)]

use rusqlite::Connection;
use topoingest_core::errors::{ExError, ExErrorKind, Result};
use topoingest_core::model::{Event, NewRoot, DEFAULT_ROOT_IDX};
use topoingest_store::errors::from_rusqlite;
use topoingest_store::repo::{EventRepo, RootRepo};

/// Point the root record at `idx_event`
///
/// This single-row rewrite is the moment a generation becomes visible to
/// readers. A missing root record is recreated.
pub fn activate(conn: &Connection, idx_event: i64) -> Result<()> {
    let root = NewRoot::pointing_at(idx_event);
    if RootRepo::idx_exists(conn, DEFAULT_ROOT_IDX)?.is_some() {
        RootRepo::update_row(conn, DEFAULT_ROOT_IDX, &root)
    } else {
        tracing::warn!(idx_root = DEFAULT_ROOT_IDX, "root record missing; recreating it");
        RootRepo::insert_row(conn, DEFAULT_ROOT_IDX, &root)
    }
}

/// The generation the root record currently points at
pub fn active_generation(conn: &Connection) -> Result<Option<Event>> {
    match RootRepo::idx_exists(conn, DEFAULT_ROOT_IDX)? {
        Some(root) => EventRepo::idx_exists(conn, root.idx_event),
        None => Ok(None),
    }
}

/// Delete every generation older than `active`, with its zones and devices
///
/// Refuses unless the root record already points at `active`.
pub fn prune(conn: &mut Connection, active: i64) -> Result<usize> {
    let tx = conn.transaction().map_err(from_rusqlite)?;

    let current = RootRepo::idx_exists(&tx, DEFAULT_ROOT_IDX)?.map(|root| root.idx_event);
    if current != Some(active) {
        return Err(ExError::new(ExErrorKind::InvariantViolation)
            .with_op("prune_generations")
            .with_entity_id(active.to_string())
            .with_message(format!(
                "root points at {:?}, refusing to prune around a generation that is not active",
                current
            )));
    }

    let deleted = EventRepo::purge_before(&tx, active)?;
    tx.commit().map_err(from_rusqlite)?;

    tracing::info!(active, deleted, "pruned old generations");
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::generation::create_generation;
    use crate::ingest::zone_resolver::resolve_zone;
    use topoingest_store::migrations::apply_migrations;
    use topoingest_store::repo::ZoneRepo;

    fn setup() -> Connection {
        let mut conn = topoingest_store::db::open_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();
        conn
    }

    #[test]
    fn test_activate_moves_pointer() {
        let conn = setup();
        let event = create_generation(&conn).unwrap();
        activate(&conn, event.idx_event).unwrap();
        assert_eq!(active_generation(&conn).unwrap().unwrap(), event);
    }

    #[test]
    fn test_activate_recreates_missing_root() {
        let conn = setup();
        conn.execute("DELETE FROM root", []).unwrap();
        assert!(active_generation(&conn).unwrap().is_none());

        let event = create_generation(&conn).unwrap();
        activate(&conn, event.idx_event).unwrap();
        assert_eq!(
            active_generation(&conn).unwrap().map(|e| e.idx_event),
            Some(event.idx_event)
        );
    }

    #[test]
    fn test_prune_keeps_active_generation() {
        let mut conn = setup();
        let old = create_generation(&conn).unwrap();
        resolve_zone(&conn, old.idx_event, "A").unwrap();
        let new = create_generation(&conn).unwrap();
        let zone = resolve_zone(&conn, new.idx_event, "A").unwrap();
        activate(&conn, new.idx_event).unwrap();

        let deleted = prune(&mut conn, new.idx_event).unwrap();

        assert_eq!(deleted, 2);
        assert_eq!(EventRepo::count(&conn).unwrap(), 1);
        assert!(ZoneRepo::idx_exists(&conn, zone).unwrap().is_some());
        assert_eq!(ZoneRepo::count_for_event(&conn, old.idx_event).unwrap(), 0);
    }

    #[test]
    fn test_prune_refuses_inactive_generation() {
        let mut conn = setup();
        let event = create_generation(&conn).unwrap();

        let err = prune(&mut conn, event.idx_event).unwrap_err();

        assert_eq!(err.kind(), ExErrorKind::InvariantViolation);
        assert_eq!(EventRepo::count(&conn).unwrap(), 2);
    }
}
