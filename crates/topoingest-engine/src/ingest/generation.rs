//! Generation (event) allocation

#![allow(clippy::result_large_err)]

use rusqlite::Connection;
use topoingest_core::errors::{ExError, ExErrorKind, Result};
use topoingest_core::model::{Event, NewEvent};
use topoingest_store::repo::EventRepo;

/// Allocate the generation that tags everything a run writes
///
/// The name is a fresh time-ordered UUID; the identifier comes from the
/// store and is read back by name.
pub fn create_generation(conn: &Connection) -> Result<Event> {
    let new = NewEvent::generation();
    EventRepo::insert_row(conn, &new)?;
    EventRepo::exists(conn, &new.name)?.ok_or_else(|| {
        ExError::new(ExErrorKind::InvariantViolation)
            .with_op("create_generation")
            .with_entity_id(new.name.clone())
            .with_message("generation row missing immediately after insert")
    })
}
