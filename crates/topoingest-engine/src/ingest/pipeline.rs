//! The ingest pipeline
//!
//! One pass: check the poller is idle, take the ingest lock, stage pending
//! snapshots, create a generation, resolve zones, apply units, flip the root
//! pointer and optionally prune older generations. The lock is released on
//! every path once taken.
//!
//! Lock contention, a busy poller and cancellation are not errors; they are
//! logged and reported through [`IngestOutcome`]. Failing to create or remove
//! the lock marker is fatal, as is any store failure in the coordinator's own
//! steps.

#![allow(clippy::result_large_err)]

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use topoingest_core::cancel::CancellationCheck;
use topoingest_core::config::{DispatchMode, IngestConfig};
use topoingest_core::errors::{ExError, IngestError, Result};
use topoingest_core::{log_op_end, log_op_error, log_op_start};
use topoingest_core_types::RunId;
use topoingest_store::markers::{INGEST_AGENT, POLLER_AGENT};
use topoingest_store::repo::EventRepo;
use topoingest_store::snapshot::read_staged;
use topoingest_store::{
    ConnectionSource, DbPath, DeviceApplier, LockCoordinator, SkipMarker, SnapshotApplier,
    StagingArea,
};

use crate::ingest::activation::{activate, prune};
use crate::ingest::generation::create_generation;
use crate::ingest::pool::{PoolReport, WorkerPool};
use crate::ingest::zone_resolver::build_units;

/// Per-run overrides of the configuration
#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    /// Dispatch mode instead of the configured one
    pub mode: Option<DispatchMode>,
    /// Apply serially into a throwaway generation that is never activated
    pub isolated: bool,
    /// Stage from this directory instead of the configured cache directory
    pub cache_directory: Option<PathBuf>,
}

/// How a run ended
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// Nothing was staged or written
    Aborted(IngestError),
    /// No readable snapshot was staged; no generation was created
    NothingToIngest,
    /// Cancellation was observed after dispatch began; the pointer was not moved
    Cancelled {
        generation: i64,
        report: PoolReport,
    },
    /// The new generation is live
    Activated {
        generation: i64,
        report: PoolReport,
        pruned: usize,
    },
    /// An isolated run finished and its generation was deleted
    Isolated {
        generation: i64,
        report: PoolReport,
    },
}

impl IngestOutcome {
    pub fn generation(&self) -> Option<i64> {
        match self {
            IngestOutcome::Cancelled { generation, .. }
            | IngestOutcome::Activated { generation, .. }
            | IngestOutcome::Isolated { generation, .. } => Some(*generation),
            IngestOutcome::Aborted(_) | IngestOutcome::NothingToIngest => None,
        }
    }

    pub fn report(&self) -> Option<&PoolReport> {
        match self {
            IngestOutcome::Cancelled { report, .. }
            | IngestOutcome::Activated { report, .. }
            | IngestOutcome::Isolated { report, .. } => Some(report),
            IngestOutcome::Aborted(_) | IngestOutcome::NothingToIngest => None,
        }
    }

    pub fn is_activated(&self) -> bool {
        matches!(self, IngestOutcome::Activated { .. })
    }

    fn label(&self) -> &'static str {
        match self {
            IngestOutcome::Aborted(_) => "aborted",
            IngestOutcome::NothingToIngest => "nothing_to_ingest",
            IngestOutcome::Cancelled { .. } => "cancelled",
            IngestOutcome::Activated { .. } => "activated",
            IngestOutcome::Isolated { .. } => "isolated",
        }
    }
}

impl fmt::Display for IngestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestOutcome::Aborted(reason) => write!(f, "aborted: {}", reason),
            IngestOutcome::NothingToIngest => write!(f, "nothing to ingest"),
            IngestOutcome::Cancelled { generation, report } => write!(
                f,
                "cancelled: generation {} left inactive ({} applied, {} failed, {} skipped)",
                generation,
                report.applied,
                report.failed,
                report.cancelled + report.not_dispatched
            ),
            IngestOutcome::Activated {
                generation,
                report,
                pruned,
            } => write!(
                f,
                "activated generation {} ({} applied, {} failed, {} pruned)",
                generation, report.applied, report.failed, pruned
            ),
            IngestOutcome::Isolated { generation, report } => write!(
                f,
                "isolated run on generation {} ({} applied, {} failed); generation removed",
                generation, report.applied, report.failed
            ),
        }
    }
}

/// A configured ingest pipeline
pub struct Ingest {
    config: IngestConfig,
    options: IngestOptions,
    applier: Arc<dyn SnapshotApplier>,
    cancel: Arc<dyn CancellationCheck>,
    connections: Arc<dyn ConnectionSource>,
}

impl Ingest {
    /// Pipeline with the default applier, the skip marker as cancellation
    /// signal and the configured database
    pub fn new(config: IngestConfig) -> Self {
        let cancel = SkipMarker::in_directory(&config.lock_directory());
        let connections = DbPath::new(config.database_path());
        Self {
            config,
            options: IngestOptions::default(),
            applier: Arc::new(DeviceApplier),
            cancel: Arc::new(cancel),
            connections: Arc::new(connections),
        }
    }

    pub fn with_options(mut self, options: IngestOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_applier(mut self, applier: Arc<dyn SnapshotApplier>) -> Self {
        self.applier = applier;
        self
    }

    pub fn with_cancellation(mut self, cancel: Arc<dyn CancellationCheck>) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_connections(mut self, connections: Arc<dyn ConnectionSource>) -> Self {
        self.connections = connections;
        self
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Run one ingest pass
    ///
    /// # Errors
    ///
    /// Returns an error when a lock marker cannot be created or removed, or
    /// when a store or staging step of the coordinator fails. Anything else
    /// ends up in the returned [`IngestOutcome`].
    pub fn process(&self) -> Result<IngestOutcome> {
        let run_id = RunId::new();
        let span = tracing::info_span!("ingest_run", run_id = %run_id);
        let _entered = span.enter();

        let start = Instant::now();
        log_op_start!("ingest_run", isolated = self.options.isolated);

        let result = self.process_locked().map_err(|e| e.with_run_id(run_id.clone()));

        let duration_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(outcome) => {
                log_op_end!(
                    "ingest_run",
                    duration_ms = duration_ms,
                    outcome = outcome.label()
                );
            }
            Err(err) => {
                log_op_error!("ingest_run", err.clone(), duration_ms = duration_ms);
            }
        }
        result
    }

    fn process_locked(&self) -> Result<IngestOutcome> {
        let locks = LockCoordinator::new(self.config.lock_directory());

        // Checked before taking our own lock so a busy poller never sees it
        if locks.peek(POLLER_AGENT) {
            return Ok(abort(IngestError::PeerActive {
                marker: locks.marker_path(POLLER_AGENT),
            }));
        }

        let guard = match locks.guard(INGEST_AGENT).map_err(ExError::from)? {
            Some(guard) => guard,
            None => {
                return Ok(abort(IngestError::LockHeld {
                    marker: locks.marker_path(INGEST_AGENT),
                }))
            }
        };

        let result = self.run(&locks);

        match guard.release() {
            Ok(()) => result,
            Err(release_err) => {
                if let Err(run_err) = &result {
                    tracing::error!(error = %run_err, "run failed before the lock could be released");
                }
                Err(ExError::from(release_err))
            }
        }
    }

    fn run(&self, locks: &LockCoordinator) -> Result<IngestOutcome> {
        if locks.peek(POLLER_AGENT) {
            return Ok(abort(IngestError::PeerActive {
                marker: locks.marker_path(POLLER_AGENT),
            }));
        }
        if self.cancel.is_cancelled() {
            return Ok(abort(IngestError::CancellationRequested {
                marker: self.skip_marker_path(),
            }));
        }

        let mut conn = self.connections.open()?;

        let staging = StagingArea::create(&self.config.ingest_directory())?;
        let source = self
            .options
            .cache_directory
            .clone()
            .unwrap_or_else(|| self.config.cache_directory());
        let staged = staging.stage_from(&source)?;
        let snapshots = read_staged(&staged);
        tracing::info!(
            source = %source.display(),
            staged = staged.len(),
            readable = snapshots.len(),
            "staged snapshots"
        );

        if snapshots.is_empty() {
            close_staging(staging);
            return Ok(IngestOutcome::NothingToIngest);
        }

        let generation = create_generation(&conn)?;
        let idx_event = generation.idx_event;
        tracing::info!(idx_event, name = %generation.name, "created generation");

        let units = build_units(&conn, idx_event, snapshots)?;

        let mode = if self.options.isolated {
            DispatchMode::Serial
        } else {
            self.options
                .mode
                .unwrap_or_else(|| self.config.dispatch_mode())
        };
        let pool = WorkerPool::new(
            self.applier.as_ref(),
            self.cancel.as_ref(),
            self.connections.as_ref(),
        );
        let report = pool.run(&mut conn, units, mode);
        close_staging(staging);
        tracing::info!(
            idx_event,
            ?mode,
            submitted = report.submitted,
            applied = report.applied,
            failed = report.failed,
            cancelled = report.cancelled,
            not_dispatched = report.not_dispatched,
            "dispatch finished"
        );

        if self.options.isolated {
            EventRepo::delete(&conn, idx_event)?;
            return Ok(IngestOutcome::Isolated {
                generation: idx_event,
                report,
            });
        }

        if report.cancellation_observed || self.cancel.is_cancelled() {
            tracing::info!(
                idx_event,
                marker = %self.skip_marker_path().display(),
                "cancellation observed; generation left inactive"
            );
            return Ok(IngestOutcome::Cancelled {
                generation: idx_event,
                report,
            });
        }

        activate(&conn, idx_event)?;
        tracing::info!(idx_event, "root pointer activated");

        let pruned = if self.config.retention_enabled() {
            prune(&mut conn, idx_event)?
        } else {
            0
        };

        Ok(IngestOutcome::Activated {
            generation: idx_event,
            report,
            pruned,
        })
    }

    fn skip_marker_path(&self) -> PathBuf {
        SkipMarker::in_directory(&self.config.lock_directory())
            .path()
            .to_path_buf()
    }
}

fn abort(reason: IngestError) -> IngestOutcome {
    tracing::info!(err.code = reason.kind().code(), "{}", reason);
    IngestOutcome::Aborted(reason)
}

fn close_staging(staging: StagingArea) {
    if let Err(err) = staging.close() {
        tracing::warn!(error = %err, "could not remove staging directory");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_accessors() {
        let outcome = IngestOutcome::Activated {
            generation: 4,
            report: PoolReport {
                submitted: 3,
                applied: 3,
                ..PoolReport::default()
            },
            pruned: 1,
        };
        assert_eq!(outcome.generation(), Some(4));
        assert_eq!(outcome.report().map(|r| r.applied), Some(3));
        assert!(outcome.is_activated());
        assert_eq!(
            outcome.to_string(),
            "activated generation 4 (3 applied, 0 failed, 1 pruned)"
        );

        let aborted = IngestOutcome::Aborted(IngestError::LockHeld {
            marker: PathBuf::from("/lock/ingest.lock"),
        });
        assert_eq!(aborted.generation(), None);
        assert!(!aborted.is_activated());
        assert!(aborted.to_string().starts_with("aborted: "));
    }
}
