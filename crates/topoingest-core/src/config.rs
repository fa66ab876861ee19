//! Ingest configuration
//!
//! Loaded once from a TOML file with an `[ingest]` table and passed by
//! reference into every component that needs it. Directory settings that are
//! not given explicitly are derived from `system_directory`.
//!
//! ```toml
//! [ingest]
//! system_directory = "/var/lib/topoingest"
//! agent_subprocesses = 8
//! multiprocessing = true
//! purge_after_ingest = true
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::{ExError, ExErrorKind, Result};
use crate::logging_facility::Profile;

const DEFAULT_SYSTEM_DIRECTORY: &str = "/var/lib/topoingest";
const DEFAULT_AGENT_SUBPROCESSES: usize = 4;

/// How snapshot units are applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// One at a time, in submission order, on the coordinator's connection
    Serial,
    /// Fixed-size pool of share-nothing workers
    Parallel { workers: usize },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    ingest: IngestConfig,
}

/// Configuration consumed by the ingest pipeline
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct IngestConfig {
    system_directory: PathBuf,
    cache_directory: Option<PathBuf>,
    ingest_directory: Option<PathBuf>,
    lock_directory: Option<PathBuf>,
    database: Option<PathBuf>,
    agent_subprocesses: usize,
    multiprocessing: bool,
    purge_after_ingest: bool,
    log_profile: Profile,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            system_directory: PathBuf::from(DEFAULT_SYSTEM_DIRECTORY),
            cache_directory: None,
            ingest_directory: None,
            lock_directory: None,
            database: None,
            agent_subprocesses: DEFAULT_AGENT_SUBPROCESSES,
            multiprocessing: false,
            purge_after_ingest: false,
            log_profile: Profile::Development,
        }
    }
}

impl IngestConfig {
    /// Load and validate a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ExError::new(ExErrorKind::Config)
                .with_op("load_config")
                .with_path(path)
                .with_message(format!("Failed to read configuration: {}", e))
        })?;
        Self::from_toml_str(&content).map_err(|e| e.with_path(path))
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content).map_err(|e| {
            ExError::new(ExErrorKind::Config)
                .with_op("parse_config")
                .with_message(format!("Invalid configuration: {}", e))
        })?;
        file.ingest.validate()?;
        Ok(file.ingest)
    }

    /// Configuration with every directory derived from `system_directory`
    pub fn rooted_at(system_directory: impl Into<PathBuf>) -> Self {
        Self {
            system_directory: system_directory.into(),
            ..Self::default()
        }
    }

    pub fn with_multiprocessing(mut self, enabled: bool) -> Self {
        self.multiprocessing = enabled;
        self
    }

    pub fn with_agent_subprocesses(mut self, count: usize) -> Self {
        self.agent_subprocesses = count;
        self
    }

    pub fn with_retention(mut self, enabled: bool) -> Self {
        self.purge_after_ingest = enabled;
        self
    }

    pub fn with_cache_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_directory = Some(dir.into());
        self
    }

    fn validate(&self) -> Result<()> {
        if self.system_directory.as_os_str().is_empty() {
            return Err(ExError::new(ExErrorKind::InvalidInput)
                .with_op("validate_config")
                .with_message("system_directory must not be empty"));
        }
        if self.agent_subprocesses == 0 {
            return Err(ExError::new(ExErrorKind::InvalidInput)
                .with_op("validate_config")
                .with_message("agent_subprocesses must be at least 1"));
        }
        Ok(())
    }

    pub fn system_directory(&self) -> &Path {
        &self.system_directory
    }

    /// Directory the poller drops snapshot files into
    pub fn cache_directory(&self) -> PathBuf {
        self.cache_directory
            .clone()
            .unwrap_or_else(|| self.system_directory.join("cache"))
    }

    /// Parent of the private per-run staging directories
    pub fn ingest_directory(&self) -> PathBuf {
        self.ingest_directory
            .clone()
            .unwrap_or_else(|| self.system_directory.join("ingest"))
    }

    /// Directory holding lock and skip markers
    pub fn lock_directory(&self) -> PathBuf {
        self.lock_directory
            .clone()
            .unwrap_or_else(|| self.system_directory.join("lock"))
    }

    pub fn database_path(&self) -> PathBuf {
        self.database
            .clone()
            .unwrap_or_else(|| self.system_directory.join("topology.db"))
    }

    pub fn worker_pool_size(&self) -> usize {
        self.agent_subprocesses.max(1)
    }

    /// Whether generations older than the newly active one are pruned
    pub fn retention_enabled(&self) -> bool {
        self.purge_after_ingest
    }

    pub fn dispatch_mode(&self) -> DispatchMode {
        if self.multiprocessing {
            DispatchMode::Parallel {
                workers: self.worker_pool_size(),
            }
        } else {
            DispatchMode::Serial
        }
    }

    pub fn log_profile(&self) -> Profile {
        self.log_profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_derive_from_system_directory() {
        let config = IngestConfig::from_toml_str("[ingest]\nsystem_directory = \"/srv/topo\"\n")
            .unwrap();
        assert_eq!(config.cache_directory(), PathBuf::from("/srv/topo/cache"));
        assert_eq!(config.ingest_directory(), PathBuf::from("/srv/topo/ingest"));
        assert_eq!(config.lock_directory(), PathBuf::from("/srv/topo/lock"));
        assert_eq!(config.database_path(), PathBuf::from("/srv/topo/topology.db"));
        assert_eq!(config.worker_pool_size(), 4);
        assert_eq!(config.dispatch_mode(), DispatchMode::Serial);
        assert!(!config.retention_enabled());
        assert_eq!(config.log_profile(), Profile::Development);
    }

    #[test]
    fn test_explicit_values_win() {
        let config = IngestConfig::from_toml_str(
            r#"
[ingest]
system_directory = "/srv/topo"
cache_directory = "/data/cache"
database = "/data/topo.db"
agent_subprocesses = 8
multiprocessing = true
purge_after_ingest = true
log_profile = "production"
"#,
        )
        .unwrap();
        assert_eq!(config.cache_directory(), PathBuf::from("/data/cache"));
        assert_eq!(config.database_path(), PathBuf::from("/data/topo.db"));
        assert_eq!(config.dispatch_mode(), DispatchMode::Parallel { workers: 8 });
        assert!(config.retention_enabled());
        assert_eq!(config.log_profile(), Profile::Production);
    }

    #[test]
    fn test_zero_subprocesses_rejected() {
        let err = IngestConfig::from_toml_str("[ingest]\nagent_subprocesses = 0\n").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidInput);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = IngestConfig::from_toml_str("[ingest]\npolling_interval = 300\n").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Config);
    }

    #[test]
    fn test_missing_section_rejected() {
        let err = IngestConfig::from_toml_str("").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Config);
    }

    #[test]
    fn test_builder_helpers() {
        let config = IngestConfig::rooted_at("/tmp/x")
            .with_multiprocessing(true)
            .with_agent_subprocesses(2)
            .with_retention(true)
            .with_cache_directory("/tmp/elsewhere");
        assert_eq!(config.dispatch_mode(), DispatchMode::Parallel { workers: 2 });
        assert!(config.retention_enabled());
        assert_eq!(config.cache_directory(), PathBuf::from("/tmp/elsewhere"));
        assert_eq!(config.lock_directory(), PathBuf::from("/tmp/x/lock"));
    }
}
