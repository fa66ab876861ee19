//! Ingest commands
//!
//! Usage:
//!   topoingest ingest run [--serial|--parallel] [--workers N] [--isolated --cache-dir DIR]
//!   topoingest ingest cancel
//!   topoingest ingest resume

use clap::{Args, Subcommand};
use std::path::PathBuf;
use topoingest_core::config::{DispatchMode, IngestConfig};
use topoingest_engine::{Ingest, IngestOptions};
use topoingest_store::SkipMarker;

use super::prepare_store;

#[derive(Debug, Args)]
pub struct IngestArgs {
    #[command(subcommand)]
    pub command: IngestCommand,
}

#[derive(Debug, Subcommand)]
pub enum IngestCommand {
    /// Run one ingest pass
    Run(RunArgs),
    /// Ask running and future passes to stop (creates the skip marker)
    Cancel,
    /// Allow ingest passes again (removes the skip marker)
    Resume,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Apply snapshots one at a time
    #[arg(long, conflicts_with = "parallel")]
    pub serial: bool,

    /// Apply snapshots through the worker pool
    #[arg(long)]
    pub parallel: bool,

    /// Worker count for parallel dispatch (implies --parallel)
    #[arg(long, value_name = "N", conflicts_with = "serial")]
    pub workers: Option<usize>,

    /// Ingest into a throwaway generation that is never activated
    #[arg(long)]
    pub isolated: bool,

    /// Snapshot directory for an isolated run
    #[arg(long, value_name = "DIR", requires = "isolated")]
    pub cache_dir: Option<PathBuf>,
}

/// Execute ingest command
pub fn execute(args: IngestArgs, config: &IngestConfig) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        IngestCommand::Run(run_args) => execute_run(run_args, config),
        IngestCommand::Cancel => execute_cancel(config),
        IngestCommand::Resume => execute_resume(config),
    }
}

fn dispatch_mode(args: &RunArgs, config: &IngestConfig) -> Result<Option<DispatchMode>, String> {
    if args.serial {
        return Ok(Some(DispatchMode::Serial));
    }
    match args.workers {
        Some(0) => Err("--workers must be at least 1".to_string()),
        Some(workers) => Ok(Some(DispatchMode::Parallel { workers })),
        None if args.parallel => Ok(Some(DispatchMode::Parallel {
            workers: config.worker_pool_size(),
        })),
        None => Ok(None),
    }
}

fn execute_run(args: RunArgs, config: &IngestConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mode = dispatch_mode(&args, config)?;
    drop(prepare_store(config)?);

    let outcome = Ingest::new(config.clone())
        .with_options(IngestOptions {
            mode,
            isolated: args.isolated,
            cache_directory: args.cache_dir,
        })
        .process()?;

    println!("{}", outcome);
    Ok(())
}

fn execute_cancel(config: &IngestConfig) -> Result<(), Box<dyn std::error::Error>> {
    let lock_dir = config.lock_directory();
    std::fs::create_dir_all(&lock_dir)?;
    let skip = SkipMarker::in_directory(&lock_dir);
    if skip.request()? {
        println!("Skip marker created: {}", skip.path().display());
    } else {
        println!("Skip marker already present: {}", skip.path().display());
    }
    Ok(())
}

fn execute_resume(config: &IngestConfig) -> Result<(), Box<dyn std::error::Error>> {
    let skip = SkipMarker::in_directory(&config.lock_directory());
    if skip.clear()? {
        println!("Skip marker removed: {}", skip.path().display());
    } else {
        println!("No skip marker present");
    }
    Ok(())
}
