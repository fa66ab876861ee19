#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::PathBuf;

use topoingest_core::errors::IngestError;
use topoingest_core::logging_facility::test_capture::init_test_capture;
use topoingest_core::{log_op_end, log_op_error, log_op_start};
use topoingest_core_types::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name);

    let start_events = capture.count_events(|e| {
        e.op.as_deref() == Some(op_name) && e.event.as_deref() == Some(EVENT_START)
    });
    assert!(start_events > 0, "Should have captured a start event");
}

#[test]
fn test_log_op_end_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_2";

    log_op_end!(op_name, duration_ms = 42);

    let events = capture.events();
    let end_events: Vec<_> = events
        .iter()
        .filter(|e| e.op.as_deref() == Some(op_name) && e.event.as_deref() == Some(EVENT_END))
        .collect();

    assert_eq!(end_events.len(), 1, "Should have exactly one end event");
    assert_eq!(end_events[0].fields.get("duration_ms"), Some(&"42".to_string()));
}

#[test]
fn test_log_op_error_includes_code() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_3";

    let err = IngestError::CoordinationIo {
        marker: PathBuf::from("/lock/ingest.lock"),
        action: "create".to_string(),
        reason: "read-only filesystem".to_string(),
    };
    log_op_error!(op_name, err, duration_ms = 10);

    let events = capture.events();
    let error_event = events
        .iter()
        .find(|e| e.op.as_deref() == Some(op_name) && e.event.as_deref() == Some(EVENT_END_ERROR))
        .expect("Should have error event");

    assert_eq!(
        error_event.fields.get("err.code"),
        Some(&"ERR_COORDINATION_IO".to_string())
    );
}

#[test]
fn test_log_macros_with_multiple_fields() {
    let capture = init_test_capture();
    let op_name = "test_log_macros_fields_unique_4";

    log_op_start!(op_name, zone = "campus-a", idx_event = 7);

    let events = capture.events();
    let start_event = events
        .iter()
        .find(|e| e.op.as_deref() == Some(op_name))
        .expect("Should have start event");

    assert_eq!(start_event.fields.get("zone"), Some(&"campus-a".to_string()));
    assert_eq!(start_event.fields.get("idx_event"), Some(&"7".to_string()));
}

#[test]
#[should_panic(expected = "Expected event")]
fn test_test_capture_assert_event_exists_fails() {
    let capture = init_test_capture();
    capture.assert_event_exists("nonexistent_op_truly_unique_999", EVENT_START);
}

#[test]
fn test_test_capture_count_events() {
    let capture = init_test_capture();
    let op1_name = "test_count_events_op1_unique_5";
    let op2_name = "test_count_events_op2_unique_5";

    log_op_start!(op1_name);
    log_op_start!(op2_name);
    log_op_end!(op1_name, duration_ms = 10);

    let start_count = capture.count_events(|e| {
        e.event.as_deref() == Some(EVENT_START)
            && (e.op.as_deref() == Some(op1_name) || e.op.as_deref() == Some(op2_name))
    });
    let end_count = capture.count_events(|e| {
        e.event.as_deref() == Some(EVENT_END) && e.op.as_deref() == Some(op1_name)
    });

    assert_eq!(start_count, 2);
    assert_eq!(end_count, 1);
}
