//! topoingest Core - domain model and ambient facilities
//!
//! This crate provides the foundational pieces shared by the store, the
//! ingest engine and the CLI:
//! - Generation (Event), Zone, Root and Device records
//! - Snapshot payloads and the immutable units dispatched to workers
//! - Canonical error facility (`ExError`, `ExErrorKind`, `IngestError`)
//! - Structured logging facility
//! - Ingest configuration and cooperative cancellation

pub mod cancel;
pub mod config;
pub mod errors;
pub mod logging_facility;
pub mod model;

// Re-export commonly used types
pub use cancel::{CancellationCheck, NeverCancel};
pub use config::{DispatchMode, IngestConfig};
pub use errors::{ExError, ExErrorKind, IngestError, Result};
pub use model::{Event, SnapshotPayload, SnapshotUnit, Zone};
