//! Status command
//!
//! Usage: topoingest status

use clap::Args;
use topoingest_core::config::IngestConfig;

use super::prepare_store;

#[derive(Debug, Args)]
pub struct StatusArgs {}

/// Execute status command
pub fn execute(_args: StatusArgs, config: &IngestConfig) -> Result<(), Box<dyn std::error::Error>> {
    let conn = prepare_store(config)?;
    let report = topoingest_engine::status(config, &conn)?;
    println!("{}", report);
    Ok(())
}
