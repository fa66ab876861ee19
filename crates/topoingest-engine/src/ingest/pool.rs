//! Worker pool that applies snapshot units
//!
//! Serial mode runs every unit on the caller's connection in order. Parallel
//! mode fans units out over a bounded channel to a fixed set of named worker
//! threads. Workers share nothing: each opens its own connection and keeps
//! its own tally, and the only shared resource is the database itself.
//!
//! A unit that fails (error or panic inside the applier) is logged and
//! counted; it never stops its siblings. Cancellation is checked by the
//! dispatcher before each send and by a worker before each unit. Units are
//! never interrupted once started and applied units are never rolled back.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread;

use crossbeam_channel::{bounded, Receiver};
use rusqlite::Connection;
use topoingest_core::cancel::CancellationCheck;
use topoingest_core::config::DispatchMode;
use topoingest_core::errors::IngestError;
use topoingest_core::model::SnapshotUnit;
use topoingest_store::{ConnectionSource, SnapshotApplier};

/// What happened to the units handed to [`WorkerPool::run`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolReport {
    pub submitted: usize,
    pub applied: usize,
    pub failed: usize,
    /// Received by a worker after cancellation was observed; not applied
    pub cancelled: usize,
    /// Never sent to a worker
    pub not_dispatched: usize,
    pub cancellation_observed: bool,
}

impl PoolReport {
    fn absorb(&mut self, tally: WorkerTally) {
        self.applied += tally.applied;
        self.failed += tally.failed;
        self.cancelled += tally.cancelled;
        self.cancellation_observed |= tally.cancellation_observed;
    }
}

#[derive(Debug, Default)]
struct WorkerTally {
    applied: usize,
    failed: usize,
    cancelled: usize,
    cancellation_observed: bool,
}

/// Applies units through a [`SnapshotApplier`]
pub struct WorkerPool<'a> {
    applier: &'a dyn SnapshotApplier,
    cancel: &'a dyn CancellationCheck,
    connections: &'a dyn ConnectionSource,
}

impl<'a> WorkerPool<'a> {
    pub fn new(
        applier: &'a dyn SnapshotApplier,
        cancel: &'a dyn CancellationCheck,
        connections: &'a dyn ConnectionSource,
    ) -> Self {
        Self {
            applier,
            cancel,
            connections,
        }
    }

    /// Apply every unit and block until each dispatched one was attempted
    pub fn run(
        &self,
        conn: &mut Connection,
        units: Vec<SnapshotUnit>,
        mode: DispatchMode,
    ) -> PoolReport {
        match mode {
            DispatchMode::Serial => self.run_serial(conn, units),
            DispatchMode::Parallel { workers } => self.run_parallel(units, workers.max(1)),
        }
    }

    fn run_serial(&self, conn: &mut Connection, units: Vec<SnapshotUnit>) -> PoolReport {
        let mut report = PoolReport {
            submitted: units.len(),
            ..PoolReport::default()
        };
        let mut tally = WorkerTally::default();

        let mut pending = units.into_iter();
        while let Some(unit) = pending.next() {
            if self.cancel.is_cancelled() {
                report.cancellation_observed = true;
                report.not_dispatched = 1 + pending.len();
                break;
            }
            self.attempt(conn, &unit, &mut tally);
        }

        report.absorb(tally);
        report
    }

    fn run_parallel(&self, units: Vec<SnapshotUnit>, workers: usize) -> PoolReport {
        let mut report = PoolReport {
            submitted: units.len(),
            ..PoolReport::default()
        };
        let (sender, receiver) = bounded::<SnapshotUnit>(workers);
        let span = tracing::Span::current();

        let tallies = thread::scope(|scope| {
            let mut handles = Vec::with_capacity(workers);
            for index in 0..workers {
                let receiver = receiver.clone();
                let span = span.clone();
                let spawned = thread::Builder::new()
                    .name(format!("ingest-worker-{index}"))
                    .spawn_scoped(scope, move || {
                        let _entered = span.enter();
                        self.worker_loop(receiver)
                    });
                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(e) => tracing::error!(worker = index, error = %e, "failed to spawn worker"),
                }
            }
            // Sends fail instead of blocking once every worker is gone
            drop(receiver);

            let mut pending = units.into_iter();
            while let Some(unit) = pending.next() {
                if self.cancel.is_cancelled() {
                    report.cancellation_observed = true;
                    report.not_dispatched = 1 + pending.len();
                    break;
                }
                if sender.send(unit).is_err() {
                    tracing::error!("no worker left to accept units");
                    report.not_dispatched = 1 + pending.len();
                    break;
                }
            }
            drop(sender);

            handles
                .into_iter()
                .filter_map(|handle| match handle.join() {
                    Ok(tally) => Some(tally),
                    Err(_) => {
                        tracing::error!("worker thread panicked outside a unit");
                        None
                    }
                })
                .collect::<Vec<_>>()
        });

        for tally in tallies {
            report.absorb(tally);
        }
        report
    }

    fn worker_loop(&self, receiver: Receiver<SnapshotUnit>) -> WorkerTally {
        let mut tally = WorkerTally::default();
        let mut conn = match self.connections.open() {
            Ok(conn) => Some(conn),
            Err(err) => {
                tracing::error!(error = %err, "worker could not open its connection");
                None
            }
        };

        for unit in receiver.iter() {
            if self.cancel.is_cancelled() {
                tally.cancellation_observed = true;
                tally.cancelled += 1;
                continue;
            }
            match conn.as_mut() {
                Some(conn) => self.attempt(conn, &unit, &mut tally),
                None => {
                    tally.failed += 1;
                    report_failure(&IngestError::UnitApplyFailure {
                        zone_id: unit.zone_id(),
                        source_path: unit.source().to_path_buf(),
                        reason: "worker has no database connection".to_string(),
                    });
                }
            }
        }

        tally
    }

    fn attempt(&self, conn: &mut Connection, unit: &SnapshotUnit, tally: &mut WorkerTally) {
        match apply_unit(self.applier, conn, unit) {
            Ok(()) => tally.applied += 1,
            Err(err) => {
                tally.failed += 1;
                report_failure(&err);
            }
        }
    }
}

/// Apply one unit, turning an error or a panic into a unit failure
fn apply_unit(
    applier: &dyn SnapshotApplier,
    conn: &mut Connection,
    unit: &SnapshotUnit,
) -> Result<(), IngestError> {
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        applier.apply(conn, unit.payload(), unit.zone_id())
    }));
    let reason = match outcome {
        Ok(Ok(())) => return Ok(()),
        Ok(Err(err)) => err.to_string(),
        Err(panic) => format!("applier panicked: {}", panic_message(panic.as_ref())),
    };
    Err(IngestError::UnitApplyFailure {
        zone_id: unit.zone_id(),
        source_path: unit.source().to_path_buf(),
        reason,
    })
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

fn report_failure(err: &IngestError) {
    tracing::error!(err.code = err.kind().code(), "{}", err);
}
