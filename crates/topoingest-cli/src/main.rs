//! topoingest CLI
//!
//! Command-line interface for the topology ingest pipeline

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use topoingest_core::config::IngestConfig;
use topoingest_core::logging_facility;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "topoingest")]
#[command(about = "topoingest - Versioned network topology ingest", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(
        long,
        global = true,
        value_name = "PATH",
        default_value = "/etc/topoingest/topoingest.toml"
    )]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Ingest operations (run, cancel, resume)
    Ingest(commands::ingest::IngestArgs),
    /// Show the active generation and marker state
    Status(commands::status::StatusArgs),
    /// Database maintenance
    Db(commands::db::DbArgs),
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = IngestConfig::from_file(&cli.config)?;
    logging_facility::init(config.log_profile());

    match cli.command {
        Commands::Ingest(args) => commands::ingest::execute(args, &config),
        Commands::Status(args) => commands::status::execute(args, &config),
        Commands::Db(args) => commands::db::execute(args, &config),
    }
}
