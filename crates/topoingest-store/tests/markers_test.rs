// Integration tests for lock and skip markers

use tempfile::TempDir;
use topoingest_core::cancel::CancellationCheck;
use topoingest_store::markers::{INGESTER_AGENT, INGEST_AGENT, POLLER_AGENT};
use topoingest_store::{LockCoordinator, SkipMarker};

#[test]
fn test_marker_layout() {
    let dir = TempDir::new().unwrap();
    let locks = LockCoordinator::new(dir.path());
    assert_eq!(locks.marker_path(INGEST_AGENT), dir.path().join("ingest.lock"));
    assert_eq!(locks.marker_path(POLLER_AGENT), dir.path().join("poller.lock"));
    assert_eq!(
        SkipMarker::for_agent(dir.path(), INGESTER_AGENT).path(),
        dir.path().join("ingester.skip")
    );
}

#[test]
fn test_peek_does_not_create() {
    let dir = TempDir::new().unwrap();
    let locks = LockCoordinator::new(dir.path());
    assert!(!locks.peek(POLLER_AGENT));
    assert!(!dir.path().join("poller.lock").exists());

    std::fs::write(dir.path().join("poller.lock"), "").unwrap();
    assert!(locks.peek(POLLER_AGENT));
}

#[test]
fn test_explicit_release_then_drop() {
    let dir = TempDir::new().unwrap();
    let locks = LockCoordinator::new(dir.path());
    let guard = locks.guard(INGEST_AGENT).unwrap().unwrap();
    assert_eq!(guard.marker(), dir.path().join("ingest.lock"));
    guard.release().unwrap();
    assert!(!locks.peek(INGEST_AGENT));
    assert!(locks.acquire(INGEST_AGENT).unwrap());
}

#[test]
fn test_release_of_missing_marker_is_ok() {
    let dir = TempDir::new().unwrap();
    let locks = LockCoordinator::new(dir.path());
    locks.release(INGEST_AGENT).unwrap();
}

#[test]
fn test_skip_marker_is_cancellation_signal() {
    let dir = TempDir::new().unwrap();
    let skip = SkipMarker::in_directory(dir.path());
    let check: &dyn CancellationCheck = &skip;
    assert!(!check.is_cancelled());
    skip.request().unwrap();
    assert!(check.is_cancelled());
}
