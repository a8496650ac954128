//! Error types for block-screen launches.

use thiserror::Error;

/// Errors reported by the block-screen collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LaunchError {
    /// The overlay / background-start grant is missing.
    #[error("block screen launch not permitted")]
    PermissionDenied,

    /// The OS refused the launch, e.g. a background-start restriction.
    #[error("block screen launch refused: {0}")]
    Refused(String),
}
