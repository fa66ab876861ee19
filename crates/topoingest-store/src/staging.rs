//! Snapshot staging
//!
//! Moves pending snapshot files out of the poller's cache directory into a
//! private per-run directory, so files the poller writes while a run is in
//! progress are left for the next cycle.

#![allow(clippy::result_large_err)]

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::errors::{io_error_at, Result};

const SNAPSHOT_EXTENSION: &str = "yaml";

/// A fresh staging directory, removed when dropped or closed
#[derive(Debug)]
pub struct StagingArea {
    dir: TempDir,
}

impl StagingArea {
    /// Create a new private directory under `ingest_directory`
    ///
    /// # Errors
    ///
    /// IO error if the directory cannot be created.
    pub fn create(ingest_directory: &Path) -> Result<Self> {
        fs::create_dir_all(ingest_directory)
            .map_err(|e| io_error_at("create_ingest_dir", ingest_directory, e))?;
        let dir = tempfile::Builder::new()
            .prefix("run-")
            .tempdir_in(ingest_directory)
            .map_err(|e| io_error_at("create_staging_dir", ingest_directory, e))?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Move every pending snapshot from `source` in and list what is staged
    ///
    /// # Errors
    ///
    /// IO error if either directory cannot be listed.
    pub fn stage_from(&self, source: &Path) -> Result<Vec<PathBuf>> {
        stage_snapshots(source, self.path())
    }

    /// Remove the directory, reporting failure instead of ignoring it
    ///
    /// # Errors
    ///
    /// IO error if the directory cannot be removed.
    pub fn close(self) -> Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir
            .close()
            .map_err(|e| io_error_at("remove_staging_dir", &path, e))
    }
}

/// Whether `path` names a snapshot file (`.yaml`, any case)
pub fn is_snapshot_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(SNAPSHOT_EXTENSION))
        .unwrap_or(false)
}

/// Relocate snapshot files from `source` to `destination`
///
/// A file that cannot be moved is left in place and picked up next cycle.
/// Returns every snapshot in `destination` in sorted order.
///
/// # Errors
///
/// IO error if either directory cannot be listed.
pub fn stage_snapshots(source: &Path, destination: &Path) -> Result<Vec<PathBuf>> {
    for path in list_snapshots(source)? {
        let Some(name) = path.file_name() else {
            continue;
        };
        let target = destination.join(name);
        if let Err(e) = move_file(&path, &target) {
            tracing::warn!(
                source = %path.display(),
                error = %e,
                "could not stage snapshot; leaving it for the next cycle"
            );
        }
    }
    list_snapshots(destination)
}

fn list_snapshots(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| io_error_at("list_snapshots", dir, e))?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_snapshot_file(path))
        .collect();
    files.sort();
    Ok(files)
}

/// Rename, falling back to copy-then-remove across filesystems
fn move_file(source: &Path, target: &Path) -> io::Result<()> {
    if fs::rename(source, target).is_ok() {
        return Ok(());
    }
    fs::copy(source, target)?;
    if let Err(e) = fs::remove_file(source) {
        // The source stays for the next cycle, so the copy must not be ingested
        let _ = fs::remove_file(target);
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_snapshot_file() {
        assert!(is_snapshot_file(Path::new("/cache/a.yaml")));
        assert!(is_snapshot_file(Path::new("/cache/B.YAML")));
        assert!(!is_snapshot_file(Path::new("/cache/a.yml")));
        assert!(!is_snapshot_file(Path::new("/cache/a.yaml.tmp")));
        assert!(!is_snapshot_file(Path::new("/cache/yaml")));
    }

    #[test]
    fn test_move_file_renames() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("a.yaml");
        let target = dir.path().join("b.yaml");
        fs::write(&source, "misc: {zone: A}\n").unwrap();
        move_file(&source, &target).unwrap();
        assert!(!source.exists());
        assert_eq!(fs::read_to_string(&target).unwrap(), "misc: {zone: A}\n");
    }
}
