#![allow(dead_code)]

use std::fs;
use std::path::Path;

use rusqlite::Connection;
use tempfile::TempDir;
use topoingest_core::config::IngestConfig;
use topoingest_core::model::DEFAULT_ROOT_IDX;
use topoingest_store::migrations::apply_migrations;
use topoingest_store::repo::RootRepo;

pub struct Fixture {
    pub dir: TempDir,
    pub config: IngestConfig,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(|config| config)
    }

    pub fn with_config(adjust: impl FnOnce(IngestConfig) -> IngestConfig) -> Self {
        let dir = TempDir::new().unwrap();
        let config = adjust(IngestConfig::rooted_at(dir.path()));
        fs::create_dir_all(config.cache_directory()).unwrap();
        fs::create_dir_all(config.ingest_directory()).unwrap();
        fs::create_dir_all(config.lock_directory()).unwrap();
        let mut conn = topoingest_store::db::open(config.database_path()).unwrap();
        apply_migrations(&mut conn).unwrap();
        Self { dir, config }
    }

    pub fn conn(&self) -> Connection {
        topoingest_store::db::open(self.config.database_path()).unwrap()
    }

    pub fn write_snapshot(&self, file: &str, zone: &str) {
        write_snapshot(&self.config.cache_directory(), file, zone);
    }

    pub fn cache_files(&self) -> usize {
        fs::read_dir(self.config.cache_directory()).unwrap().count()
    }

    pub fn root_generation(&self) -> i64 {
        RootRepo::idx_exists(&self.conn(), DEFAULT_ROOT_IDX)
            .unwrap()
            .unwrap()
            .idx_event
    }

    pub fn marker(&self, name: &str) -> std::path::PathBuf {
        self.config.lock_directory().join(name)
    }
}

/// A snapshot for `zone` with one device named after the file
pub fn write_snapshot(dir: &Path, file: &str, zone: &str) {
    let host = file.trim_end_matches(".yaml");
    fs::write(
        dir.join(file),
        format!(
            "misc:\n  zone: {zone}\ndevices:\n  {host}:\n    misc:\n      host: {host}\n"
        ),
    )
    .unwrap();
}
