//! Presence-only filesystem markers shared with the poller
//!
//! A marker is an empty file in the lock directory. Its existence is the
//! whole signal; content is never read. Markers are not auto-expired, so one
//! left behind by a crashed process blocks later runs until an operator
//! removes it.

mod lock;
mod skip;

pub use lock::{LockCoordinator, LockGuard};
pub use skip::SkipMarker;

/// Agent name of this pipeline's own lock
pub const INGEST_AGENT: &str = "ingest";

/// Agent name of the peer process that writes snapshot files
pub const POLLER_AGENT: &str = "poller";

/// Agent name the cancellation (skip) marker is namespaced under
pub const INGESTER_AGENT: &str = "ingester";
