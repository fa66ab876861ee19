//! Ingest pipeline components
//!
//! - `generation`: allocates the generation a run writes under
//! - `zone_resolver`: maps zone names to zone ids, sequentially
//! - `pool`: applies units serially or through a worker pool
//! - `activation`: flips the root pointer and prunes old generations
//! - `pipeline`: the run itself

pub mod activation;
pub mod generation;
pub mod pipeline;
pub mod pool;
pub mod zone_resolver;

pub use pipeline::{Ingest, IngestOptions, IngestOutcome};
pub use pool::{PoolReport, WorkerPool};
