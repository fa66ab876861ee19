pub mod db;
pub mod ingest;
pub mod status;

use rusqlite::Connection;
use topoingest_core::config::IngestConfig;

/// Create the configured directories and open a migrated store
pub fn prepare_store(config: &IngestConfig) -> Result<Connection, Box<dyn std::error::Error>> {
    for dir in [
        config.cache_directory(),
        config.ingest_directory(),
        config.lock_directory(),
    ] {
        std::fs::create_dir_all(&dir)?;
    }
    let db_path = config.database_path();
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut conn = topoingest_store::db::open(&db_path)?;
    topoingest_store::migrations::apply_migrations(&mut conn)?;
    Ok(conn)
}
