//! Lock markers that keep ingest runs and the poller apart

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use topoingest_core::errors::IngestError;

/// Mutual exclusion by lock-marker presence
#[derive(Debug, Clone)]
pub struct LockCoordinator {
    dir: PathBuf,
}

impl LockCoordinator {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn directory(&self) -> &Path {
        &self.dir
    }

    /// Path of `<name>.lock` in the lock directory
    pub fn marker_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.lock", name))
    }

    /// Create the marker with create-new semantics
    ///
    /// Returns `Ok(false)` when the marker already exists; nothing is changed
    /// in that case.
    ///
    /// # Errors
    ///
    /// [`IngestError::CoordinationIo`] when the marker cannot be created for
    /// any other reason.
    pub fn acquire(&self, name: &str) -> Result<bool, IngestError> {
        let marker = self.marker_path(name);
        match OpenOptions::new().write(true).create_new(true).open(&marker) {
            Ok(_) => {
                tracing::debug!(marker = %marker.display(), "lock acquired");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(IngestError::CoordinationIo {
                marker,
                action: "create".to_string(),
                reason: e.to_string(),
            }),
        }
    }

    /// Acquire the marker and hand back a guard that releases it
    ///
    /// # Errors
    ///
    /// Same as [`LockCoordinator::acquire`].
    pub fn guard(&self, name: &str) -> Result<Option<LockGuard>, IngestError> {
        if self.acquire(name)? {
            Ok(Some(LockGuard {
                coordinator: self.clone(),
                name: name.to_string(),
                released: false,
            }))
        } else {
            Ok(None)
        }
    }

    /// Remove the marker
    ///
    /// A marker that is already gone is logged and treated as released.
    ///
    /// # Errors
    ///
    /// [`IngestError::CoordinationIo`] when the marker exists but cannot be
    /// removed.
    pub fn release(&self, name: &str) -> Result<(), IngestError> {
        let marker = self.marker_path(name);
        match std::fs::remove_file(&marker) {
            Ok(()) => {
                tracing::debug!(marker = %marker.display(), "lock released");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!(marker = %marker.display(), "lock marker already removed");
                Ok(())
            }
            Err(e) => Err(IngestError::CoordinationIo {
                marker,
                action: "remove".to_string(),
                reason: e.to_string(),
            }),
        }
    }

    /// Read-only presence check of another agent's marker
    pub fn peek(&self, name: &str) -> bool {
        self.marker_path(name).exists()
    }
}

/// Holds an acquired lock marker
///
/// Call [`LockGuard::release`] to surface removal errors; dropping the guard
/// releases the marker too, logging any failure.
#[derive(Debug)]
#[must_use = "dropping the guard releases the lock"]
pub struct LockGuard {
    coordinator: LockCoordinator,
    name: String,
    released: bool,
}

impl LockGuard {
    pub fn marker(&self) -> PathBuf {
        self.coordinator.marker_path(&self.name)
    }

    /// # Errors
    ///
    /// [`IngestError::CoordinationIo`] when the marker cannot be removed.
    pub fn release(mut self) -> Result<(), IngestError> {
        self.released = true;
        self.coordinator.release(&self.name)
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(err) = self.coordinator.release(&self.name) {
            tracing::error!(error = %err, "failed to release lock marker on drop");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_acquire_is_exclusive() {
        let dir = TempDir::new().unwrap();
        let locks = LockCoordinator::new(dir.path());
        assert!(locks.acquire("ingest").unwrap());
        assert!(!locks.acquire("ingest").unwrap());
        assert!(locks.peek("ingest"));
        locks.release("ingest").unwrap();
        assert!(!locks.peek("ingest"));
    }

    #[test]
    fn test_guard_releases_on_drop() {
        let dir = TempDir::new().unwrap();
        let locks = LockCoordinator::new(dir.path());
        {
            let _guard = locks.guard("ingest").unwrap().unwrap();
            assert!(locks.peek("ingest"));
            assert!(locks.guard("ingest").unwrap().is_none());
        }
        assert!(!locks.peek("ingest"));
    }

    #[test]
    fn test_missing_directory_is_coordination_error() {
        let dir = TempDir::new().unwrap();
        let locks = LockCoordinator::new(dir.path().join("absent"));
        let err = locks.acquire("ingest").unwrap_err();
        assert!(err.is_fatal());
    }
}
