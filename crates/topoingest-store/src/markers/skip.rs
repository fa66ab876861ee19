//! Skip marker that asks a running ingest to stop

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use topoingest_core::cancel::CancellationCheck;

use crate::errors::{io_error_at, Result};
use crate::markers::INGESTER_AGENT;

/// The ingester's skip marker, used as the cooperative cancellation signal
///
/// An operator (or the poller's shutdown path) creates the marker; the
/// pipeline polls it at unit boundaries.
#[derive(Debug, Clone)]
pub struct SkipMarker {
    path: PathBuf,
}

impl SkipMarker {
    /// The `ingester.skip` marker in `lock_directory`
    pub fn in_directory(lock_directory: &Path) -> Self {
        Self::for_agent(lock_directory, INGESTER_AGENT)
    }

    pub fn for_agent(lock_directory: &Path, agent: &str) -> Self {
        Self {
            path: lock_directory.join(format!("{}.skip", agent)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_present(&self) -> bool {
        self.path.exists()
    }

    /// Create the marker; `Ok(false)` if it was already there
    ///
    /// # Errors
    ///
    /// IO error if the marker cannot be created.
    pub fn request(&self) -> Result<bool> {
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
        {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(io_error_at("request_skip", &self.path, e)),
        }
    }

    /// Remove the marker; `Ok(false)` if there was none
    ///
    /// # Errors
    ///
    /// IO error if the marker exists but cannot be removed.
    pub fn clear(&self) -> Result<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error_at("clear_skip", &self.path, e)),
        }
    }
}

impl CancellationCheck for SkipMarker {
    fn is_cancelled(&self) -> bool {
        self.is_present()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_request_and_clear() {
        let dir = TempDir::new().unwrap();
        let skip = SkipMarker::in_directory(dir.path());
        assert!(!skip.is_cancelled());
        assert!(skip.request().unwrap());
        assert!(!skip.request().unwrap());
        assert!(skip.is_cancelled());
        assert_eq!(skip.path(), dir.path().join("ingester.skip"));
        assert!(skip.clear().unwrap());
        assert!(!skip.clear().unwrap());
        assert!(!skip.is_cancelled());
    }
}
