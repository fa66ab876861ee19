//! topoingest Store - persistence and filesystem plumbing for ingest
//!
//! Provides:
//! - SQLite connection management and embedded migrations
//! - Per-entity accessors for generations, zones, the root pointer and devices
//! - Lock and skip markers shared with the poller
//! - Snapshot staging and the snapshot file reader
//! - The apply-snapshot collaborator

pub mod apply;
pub mod db;
pub mod errors;
pub mod markers;
pub mod migrations;
pub mod repo;
pub mod snapshot;
pub mod staging;

// Re-export key types
pub use apply::{DeviceApplier, SnapshotApplier};
pub use db::{ConnectionSource, DbPath};
pub use errors::Result;
pub use markers::{LockCoordinator, LockGuard, SkipMarker};
pub use staging::StagingArea;
