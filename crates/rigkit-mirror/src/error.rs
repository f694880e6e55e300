//! Error types for the mirror engine.

use rigkit_ir::{HostError, RigError};
use thiserror::Error;

/// Result type for mirror operations.
pub type MirrorResult<T> = Result<T, MirrorError>;

/// Errors that abort a whole mirror call.
///
/// Per-bone and per-constraint problems are not errors; they are reported as
/// rejections or diagnostics on the [`MirrorReport`](crate::MirrorReport).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MirrorError {
    /// The host failed a mode switch or a mode-checked call.
    #[error("host error: {0}")]
    Host(#[from] HostError),

    /// No bones were selected.
    #[error("no bones selected for mirroring")]
    EmptySelection,
}

impl RigError for MirrorError {
    fn code(&self) -> &'static str {
        match self {
            MirrorError::Host(_) => "MIRROR_001",
            MirrorError::EmptySelection => "MIRROR_002",
        }
    }

    fn category(&self) -> &'static str {
        "mirror"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigkit_ir::HostMode;

    #[test]
    fn test_codes() {
        let err = MirrorError::from(HostError::WrongMode {
            expected: HostMode::Edit,
            actual: HostMode::Object,
        });
        assert_eq!(err.code(), "MIRROR_001");
        assert_eq!(err.category(), "mirror");
        assert!(err.to_string().starts_with("host error: operation requires EDIT"));
        assert_eq!(MirrorError::EmptySelection.code(), "MIRROR_002");
    }
}
