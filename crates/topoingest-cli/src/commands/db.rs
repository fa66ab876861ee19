//! Database commands
//!
//! Usage: topoingest db migrate

use clap::{Args, Subcommand};
use topoingest_core::config::IngestConfig;

use super::prepare_store;

#[derive(Debug, Args)]
pub struct DbArgs {
    #[command(subcommand)]
    pub command: DbCommand,
}

#[derive(Debug, Subcommand)]
pub enum DbCommand {
    /// Apply pending schema migrations
    Migrate,
}

/// Execute db command
pub fn execute(args: DbArgs, config: &IngestConfig) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        DbCommand::Migrate => {
            let conn = prepare_store(config)?;
            for id in topoingest_store::migrations::applied_migrations(&conn)? {
                println!("applied {}", id);
            }
            println!("Database ready: {}", config.database_path().display());
            Ok(())
        }
    }
}
