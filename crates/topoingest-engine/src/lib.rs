//! topoingest Engine - ingest orchestration
//!
//! Coordinates the lock markers, staging, generation and zone bookkeeping,
//! the worker pool and root pointer activation on top of topoingest-store.

pub mod ingest;
pub mod status;

pub use ingest::{Ingest, IngestOptions, IngestOutcome, PoolReport};
pub use status::{status, StatusReport};
