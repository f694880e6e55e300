//! Error and diagnostic types for rig realization and mirroring.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::host::HostMode;

/// Result type for operations against a live rig host.
pub type HostResult<T> = Result<T, HostError>;

/// Common trait for errors raised by rigkit crates.
pub trait RigError: std::error::Error {
    /// Returns a stable error code (e.g., "HOST_001").
    fn code(&self) -> &'static str;

    /// Returns the error category (e.g., "host", "graph").
    fn category(&self) -> &'static str;
}

/// Errors raised by a [`RigHost`](crate::host::RigHost) implementation.
///
/// These are programmer-contract violations (wrong mode, stale handles) or
/// type errors while writing a named field. Realization turns the per-item ones
/// into diagnostics; only mode switching failures abort a call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HostError {
    /// The operation requires a different host mode.
    #[error("operation requires {expected} mode, host is in {actual} mode")]
    WrongMode {
        expected: HostMode,
        actual: HostMode,
    },

    /// An edit bone handle outlived the edit session it was created in.
    #[error("stale edit bone handle (generation {handle}, host generation {current})")]
    StaleHandle { handle: u64, current: u64 },

    /// No bone with this name exists on the rig.
    #[error("bone '{0}' does not exist")]
    BoneNotFound(String),

    /// A bone with this name already exists.
    #[error("bone '{0}' already exists")]
    DuplicateBone(String),

    /// Bone names must be non-empty.
    #[error("bone name cannot be empty")]
    EmptyName,

    /// A field value has the wrong type or is out of its domain.
    #[error("invalid value for field '{field}': {message}")]
    InvalidFieldValue { field: String, message: String },

    /// The field exists but cannot be written in the current configuration.
    #[error("field '{field}' is read-only: {reason}")]
    ReadOnlyField { field: String, reason: String },

    /// The host refused a mode switch.
    #[error("cannot switch from {from} to {to} mode: {reason}")]
    ModeSwitchFailed {
        from: HostMode,
        to: HostMode,
        reason: String,
    },
}

impl HostError {
    /// Creates a new invalid field value error.
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidFieldValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a new read-only field error.
    pub fn read_only(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ReadOnlyField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl RigError for HostError {
    fn code(&self) -> &'static str {
        match self {
            HostError::WrongMode { .. } => "HOST_001",
            HostError::StaleHandle { .. } => "HOST_002",
            HostError::BoneNotFound(_) => "HOST_003",
            HostError::DuplicateBone(_) => "HOST_004",
            HostError::EmptyName => "HOST_005",
            HostError::InvalidFieldValue { .. } => "HOST_006",
            HostError::ReadOnlyField { .. } => "HOST_007",
            HostError::ModeSwitchFailed { .. } => "HOST_008",
        }
    }

    fn category(&self) -> &'static str {
        "host"
    }
}

/// Errors raised while building a [`BoneGraph`](crate::ir::BoneGraph).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// A field map named a field that bones do not have.
    #[error("unknown bone field '{0}'")]
    UnknownField(String),

    /// A field map value could not be converted.
    #[error("invalid value for bone field '{field}': {message}")]
    InvalidField { field: String, message: String },
}

impl RigError for GraphError {
    fn code(&self) -> &'static str {
        match self {
            GraphError::UnknownField(_) => "GRAPH_001",
            GraphError::InvalidField { .. } => "GRAPH_002",
        }
    }

    fn category(&self) -> &'static str {
        "graph"
    }
}

/// How a diagnostic affects the item it is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// The item was processed, possibly with reduced fidelity.
    Warning,
    /// The item was not processed.
    Rejected,
}

/// Diagnostic codes emitted by realization (R0xx) and mirroring (M0xx).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCode {
    /// R001: Bone has zero length and was not realized
    ZeroLengthBone,
    /// R002: Bone reference could not be resolved to a live bone
    UnresolvedReference,
    /// R003: Field value could not be written
    InvalidFieldValue,
    /// R004: Driver could not be attached
    DriverFailed,
    /// R005: Live bone missing during the behavioral pass
    MissingLiveBone,
    /// M001: Bone and its opposite are both selected
    AmbiguousDirection,
    /// M002: No mirror target and splitting not allowed
    NoMirrorTarget,
    /// M003: Mirror copies fields without geometric correction
    ReducedFidelity,
    /// M004: Mirrored bone referenced by a driver or constraint is missing
    MissingMirrorBone,
    /// M005: Action referenced by a constraint does not exist
    MissingAction,
    /// M006: Selected bone does not exist on the rig
    UnknownBone,
}

impl DiagnosticCode {
    /// Returns the diagnostic code string (e.g., "R001").
    pub fn code(&self) -> &'static str {
        match self {
            DiagnosticCode::ZeroLengthBone => "R001",
            DiagnosticCode::UnresolvedReference => "R002",
            DiagnosticCode::InvalidFieldValue => "R003",
            DiagnosticCode::DriverFailed => "R004",
            DiagnosticCode::MissingLiveBone => "R005",
            DiagnosticCode::AmbiguousDirection => "M001",
            DiagnosticCode::NoMirrorTarget => "M002",
            DiagnosticCode::ReducedFidelity => "M003",
            DiagnosticCode::MissingMirrorBone => "M004",
            DiagnosticCode::MissingAction => "M005",
            DiagnosticCode::UnknownBone => "M006",
        }
    }

    /// Returns the severity of this diagnostic.
    pub fn severity(&self) -> Severity {
        match self {
            DiagnosticCode::AmbiguousDirection
            | DiagnosticCode::NoMirrorTarget
            | DiagnosticCode::UnknownBone
            | DiagnosticCode::ZeroLengthBone
            | DiagnosticCode::MissingLiveBone => Severity::Rejected,
            _ => Severity::Warning,
        }
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A per-item diagnostic with code, message, and the bone it concerns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The diagnostic code.
    pub code: DiagnosticCode,
    /// Human-readable message.
    pub message: String,
    /// Bone the diagnostic is about, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bone: Option<String>,
}

impl Diagnostic {
    /// Creates a new diagnostic.
    pub fn new(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            bone: None,
        }
    }

    /// Creates a new diagnostic attached to a bone.
    pub fn for_bone(
        code: DiagnosticCode,
        bone: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            bone: Some(bone.into()),
        }
    }

    /// Returns the severity of this diagnostic.
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.bone {
            Some(bone) => write!(f, "[{}] {}: {}", self.code, bone, self.message),
            None => write!(f, "[{}] {}", self.code, self.message),
        }
    }
}

/// Accumulates diagnostics over one top-level call.
///
/// Every pushed diagnostic is also logged at `warn` level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        log::warn!("{}", diagnostic);
        self.items.push(diagnostic);
    }

    /// Records a diagnostic attached to a bone.
    pub fn bone(
        &mut self,
        code: DiagnosticCode,
        bone: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.push(Diagnostic::for_bone(code, bone, message));
    }

    /// Returns true if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of recorded diagnostics.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if any diagnostic carries the given code.
    pub fn contains(&self, code: DiagnosticCode) -> bool {
        self.items.iter().any(|d| d.code == code)
    }

    /// Iterates over recorded diagnostics.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    /// Consumes the collection, returning the diagnostics in record order.
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}
