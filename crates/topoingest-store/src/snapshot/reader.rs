//! Snapshot reader
//!
//! Parses a staged YAML file into an opaque payload and pulls out the zone
//! name. Nothing else in the document is interpreted here.

use std::fs;
use std::path::{Path, PathBuf};

use topoingest_core::errors::IngestError;
use topoingest_core::model::{SnapshotFile, SnapshotPayload};

/// Read one staged snapshot
///
/// # Errors
///
/// [`IngestError::MalformedSnapshot`] if the file cannot be read, is not
/// valid YAML, or has no non-empty string at `misc.zone`.
pub fn read_snapshot_file(path: &Path) -> Result<SnapshotFile, IngestError> {
    let content = fs::read_to_string(path).map_err(|e| IngestError::MalformedSnapshot {
        path: path.to_path_buf(),
        reason: format!("unreadable: {}", e),
    })?;
    read_snapshot_str(path, &content)
}

/// Parse snapshot text that was read from `path`
///
/// # Errors
///
/// Same as [`read_snapshot_file`].
pub fn read_snapshot_str(path: &Path, content: &str) -> Result<SnapshotFile, IngestError> {
    let malformed = |reason: String| IngestError::MalformedSnapshot {
        path: path.to_path_buf(),
        reason,
    };

    let document: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|e| malformed(format!("YAML parse error: {}", e)))?;
    // Integer keys (interface indexes and the like) become strings here
    let value = serde_json::to_value(document)
        .map_err(|e| malformed(format!("unsupported YAML structure: {}", e)))?;

    let payload = SnapshotPayload::new(value);
    let zone = payload
        .zone_name()
        .ok_or_else(|| malformed("missing or empty misc.zone".to_string()))?
        .to_string();

    Ok(SnapshotFile {
        path: path.to_path_buf(),
        zone,
        payload,
    })
}

/// Read every staged file, logging and skipping the malformed ones
pub fn read_staged(paths: &[PathBuf]) -> Vec<SnapshotFile> {
    paths
        .iter()
        .filter_map(|path| match read_snapshot_file(path) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                tracing::warn!(
                    err.code = err.kind().code(),
                    "{}; skipping",
                    err
                );
                None
            }
        })
        .collect()
}
