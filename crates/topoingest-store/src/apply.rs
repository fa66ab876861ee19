//! Applying a snapshot unit to the store
//!
//! The pipeline treats snapshot payloads as opaque and hands each one to a
//! [`SnapshotApplier`]. [`DeviceApplier`] is the default: it records the
//! payload's `devices` section as Device rows under the unit's zone.

#![allow(clippy::result_large_err)]

use rusqlite::{Connection, TransactionBehavior};
use topoingest_core::errors::{ExError, ExErrorKind};
use topoingest_core::model::{NewDevice, SnapshotPayload};

use crate::errors::{from_rusqlite, Result};
use crate::repo::DeviceRepo;

/// Writes one snapshot's derived rows under `zone_id`
///
/// Implementations run their own transaction so a unit is applied entirely
/// or not at all. They are called from worker threads, each with its own
/// connection.
pub trait SnapshotApplier: Send + Sync {
    /// # Errors
    ///
    /// Any error is reported by the worker pool as a failure of this unit.
    fn apply(&self, conn: &mut Connection, payload: &SnapshotPayload, zone_id: i64) -> Result<()>;
}

/// Upserts one Device row per entry of the payload's `devices` mapping
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviceApplier;

impl SnapshotApplier for DeviceApplier {
    fn apply(&self, conn: &mut Connection, payload: &SnapshotPayload, zone_id: i64) -> Result<()> {
        let devices = match payload.as_value().get("devices") {
            None | Some(serde_json::Value::Null) => return Ok(()),
            Some(serde_json::Value::Object(map)) => map,
            Some(_) => {
                return Err(ExError::new(ExErrorKind::UnitApplyFailure)
                    .with_op("apply_devices")
                    .with_entity_id(zone_id.to_string())
                    .with_message("'devices' must be a mapping of hostname to device data"));
            }
        };

        // Take the write lock up front so the busy timeout covers contention
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(from_rusqlite)?;
        for (hostname, data) in devices {
            DeviceRepo::upsert_row(
                &tx,
                &NewDevice {
                    idx_zone: zone_id,
                    hostname: hostname.clone(),
                    payload: data.clone(),
                    enabled: true,
                },
            )?;
        }
        tx.commit().map_err(from_rusqlite)?;

        tracing::trace!(zone_id, devices = devices.len(), "applied snapshot");
        Ok(())
    }
}
