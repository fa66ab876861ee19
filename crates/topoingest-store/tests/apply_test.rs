// Integration tests for the default snapshot applier

use rusqlite::Connection;
use serde_json::json;
use topoingest_core::errors::ExErrorKind;
use topoingest_core::model::{NewEvent, NewZone, SnapshotPayload};
use topoingest_store::migrations::apply_migrations;
use topoingest_store::repo::{DeviceRepo, EventRepo, ZoneRepo};
use topoingest_store::{DeviceApplier, SnapshotApplier};

fn setup_zone() -> (Connection, i64) {
    let mut conn = topoingest_store::db::open_in_memory().unwrap();
    apply_migrations(&mut conn).unwrap();
    let event = EventRepo::insert_row(&conn, &NewEvent::generation()).unwrap();
    let zone = ZoneRepo::insert_row(&conn, &NewZone::named(event, "A")).unwrap();
    (conn, zone)
}

#[test]
fn test_devices_written_under_zone() {
    let (mut conn, zone) = setup_zone();
    let payload = SnapshotPayload::new(json!({
        "misc": {"zone": "A"},
        "devices": {
            "core1": {"system": {"sysName": "core1"}},
            "edge1": {"system": {"sysName": "edge1"}}
        }
    }));

    DeviceApplier.apply(&mut conn, &payload, zone).unwrap();

    let devices = DeviceRepo::list_for_zone(&conn, zone).unwrap();
    let hosts: Vec<&str> = devices.iter().map(|d| d.hostname.as_str()).collect();
    assert_eq!(hosts, vec!["core1", "edge1"]);
    assert_eq!(devices[0].payload, json!({"system": {"sysName": "core1"}}));
}

#[test]
fn test_payload_without_devices_is_noop() {
    let (mut conn, zone) = setup_zone();
    let payload = SnapshotPayload::new(json!({"misc": {"zone": "A"}}));
    DeviceApplier.apply(&mut conn, &payload, zone).unwrap();
    assert_eq!(DeviceRepo::count(&conn).unwrap(), 0);
}

#[test]
fn test_non_mapping_devices_fails() {
    let (mut conn, zone) = setup_zone();
    let payload = SnapshotPayload::new(json!({"misc": {"zone": "A"}, "devices": ["core1"]}));
    let err = DeviceApplier.apply(&mut conn, &payload, zone).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::UnitApplyFailure);
    assert_eq!(DeviceRepo::count(&conn).unwrap(), 0);
}

#[test]
fn test_unknown_zone_rolls_back() {
    let (mut conn, _zone) = setup_zone();
    let payload = SnapshotPayload::new(json!({"devices": {"core1": {}}}));
    let err = DeviceApplier.apply(&mut conn, &payload, 9_999).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Persistence);
    assert_eq!(DeviceRepo::count(&conn).unwrap(), 0);
}
