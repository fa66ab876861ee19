use std::path::PathBuf;

use thiserror::Error;
use topoingest_core_types::RunId;

/// Result type alias using the canonical error facility
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// This taxonomy provides a stable, structured classification of all errors
/// in topoingest. Each kind maps to a stable error code that can be used for
/// programmatic error handling, testing, and operator-facing output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Structural/Validation
    InvalidInput,
    NotFound,
    ConstraintViolation,
    InvariantViolation,

    // Run coordination
    /// This agent's own lock marker is already present
    LockHeld,
    /// The poller's lock marker is present
    PeerActive,
    /// The ingester skip marker was observed
    CancellationRequested,
    /// A lock marker could not be created or removed
    CoordinationIo,

    // Snapshot units
    MalformedSnapshot,
    UnitApplyFailure,

    // Integration/IO
    Io,
    Persistence,
    Config,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::ConstraintViolation => "ERR_CONSTRAINT_VIOLATION",
            ExErrorKind::InvariantViolation => "ERR_INVARIANT_VIOLATION",
            ExErrorKind::LockHeld => "ERR_LOCK_HELD",
            ExErrorKind::PeerActive => "ERR_PEER_ACTIVE",
            ExErrorKind::CancellationRequested => "ERR_CANCELLATION_REQUESTED",
            ExErrorKind::CoordinationIo => "ERR_COORDINATION_IO",
            ExErrorKind::MalformedSnapshot => "ERR_MALFORMED_SNAPSHOT",
            ExErrorKind::UnitApplyFailure => "ERR_UNIT_APPLY_FAILURE",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Config => "ERR_CONFIG",
        }
    }
}

/// Canonical structured error type
///
/// This error type provides a structured representation of errors with
/// classification fields for programmatic handling and rich context for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    path: Option<PathBuf>,
    run_id: Option<RunId>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            path: None,
            run_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity ID context (generation, zone or root identifier)
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add filesystem path context (marker, staged file, database)
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add run ID context
    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = Some(run_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the entity ID context, if any
    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    /// Get the path context, if any
    pub fn path(&self) -> Option<&std::path::Path> {
        self.path.as_deref()
    }

    /// Get the run ID context, if any
    pub fn run_id(&self) -> Option<&RunId> {
        self.run_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Run-level conditions of the ingest pipeline
///
/// Everything except [`IngestError::CoordinationIo`] is absorbed by the
/// pipeline and surfaced through logs and the run outcome.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IngestError {
    /// A previous run's lock marker is still present
    #[error("Ingest lock marker {} exists; is an ingest process already running?", marker.display())]
    LockHeld { marker: PathBuf },

    /// The poller's lock marker is present
    #[error("Poller lock marker {} exists; is the poller running or did it crash?", marker.display())]
    PeerActive { marker: PathBuf },

    /// The skip marker was observed; dispatch stops and the pointer is not flipped
    #[error("Skip marker {} found; a shutdown was probably requested", marker.display())]
    CancellationRequested { marker: PathBuf },

    /// A single snapshot unit could not be applied
    #[error("Failed to apply {} to zone {zone_id}: {reason}", source_path.display())]
    UnitApplyFailure {
        zone_id: i64,
        source_path: PathBuf,
        reason: String,
    },

    /// A lock marker could not be created or removed
    #[error("Cannot {action} lock marker {}: {reason}", marker.display())]
    CoordinationIo {
        marker: PathBuf,
        action: String,
        reason: String,
    },

    /// A staged file is not a usable snapshot
    #[error("Malformed snapshot {}: {reason}", path.display())]
    MalformedSnapshot { path: PathBuf, reason: String },
}

impl IngestError {
    /// Whether the condition must abort the run with an error
    pub fn is_fatal(&self) -> bool {
        matches!(self, IngestError::CoordinationIo { .. })
    }

    /// Canonical kind for this condition
    pub fn kind(&self) -> ExErrorKind {
        match self {
            IngestError::LockHeld { .. } => ExErrorKind::LockHeld,
            IngestError::PeerActive { .. } => ExErrorKind::PeerActive,
            IngestError::CancellationRequested { .. } => ExErrorKind::CancellationRequested,
            IngestError::UnitApplyFailure { .. } => ExErrorKind::UnitApplyFailure,
            IngestError::CoordinationIo { .. } => ExErrorKind::CoordinationIo,
            IngestError::MalformedSnapshot { .. } => ExErrorKind::MalformedSnapshot,
        }
    }
}

/// Conversion from IngestError to ExError
impl From<IngestError> for ExError {
    fn from(err: IngestError) -> Self {
        let kind = err.kind();
        let message = err.to_string();
        match err {
            IngestError::LockHeld { marker }
            | IngestError::PeerActive { marker }
            | IngestError::CancellationRequested { marker } => ExError::new(kind)
                .with_op("lock_gate")
                .with_path(marker)
                .with_message(message),
            IngestError::UnitApplyFailure {
                zone_id,
                source_path,
                ..
            } => ExError::new(kind)
                .with_op("apply_unit")
                .with_entity_id(zone_id.to_string())
                .with_path(source_path)
                .with_message(message),
            IngestError::CoordinationIo { marker, action, .. } => ExError::new(kind)
                .with_op(format!("{}_lock", action))
                .with_path(marker)
                .with_message(message),
            IngestError::MalformedSnapshot { path, .. } => ExError::new(kind)
                .with_op("read_snapshot")
                .with_path(path)
                .with_message(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(ExErrorKind::LockHeld.code(), "ERR_LOCK_HELD");
        assert_eq!(ExErrorKind::CoordinationIo.code(), "ERR_COORDINATION_IO");
        assert_eq!(ExErrorKind::Persistence.code(), "ERR_PERSISTENCE");
    }

    #[test]
    fn test_display_includes_context() {
        let err = ExError::new(ExErrorKind::NotFound)
            .with_op("find_zone")
            .with_entity_id("42")
            .with_message("Zone not found");
        let text = err.to_string();
        assert!(text.contains("ERR_NOT_FOUND"));
        assert!(text.contains("find_zone"));
        assert!(text.contains("entity_id: 42"));
    }

    #[test]
    fn test_only_coordination_io_is_fatal() {
        let marker = PathBuf::from("/tmp/ingest.lock");
        assert!(IngestError::CoordinationIo {
            marker: marker.clone(),
            action: "create".into(),
            reason: "permission denied".into(),
        }
        .is_fatal());
        assert!(!IngestError::LockHeld {
            marker: marker.clone()
        }
        .is_fatal());
        assert!(!IngestError::PeerActive {
            marker: marker.clone()
        }
        .is_fatal());
        assert!(!IngestError::CancellationRequested { marker }.is_fatal());
    }

    #[test]
    fn test_ingest_error_into_ex_error() {
        let err: ExError = IngestError::UnitApplyFailure {
            zone_id: 7,
            source_path: PathBuf::from("/staging/a.yaml"),
            reason: "boom".into(),
        }
        .into();
        assert_eq!(err.kind(), ExErrorKind::UnitApplyFailure);
        assert_eq!(err.op(), Some("apply_unit"));
        assert_eq!(err.entity_id(), Some("7"));
        assert!(err.message().contains("boom"));
    }
}
