// canary-artifacts/src/error.rs
// ============================================================================
// Module: Artifact Errors
// Description: Failures writing any of the five artifact files.
// Purpose: Let the runner tell "artifact emission failed" apart from a
//          per-canary assertion failure, which is never this error type.
// Dependencies: thiserror
// ============================================================================

use thiserror::Error;

/// A failure writing one of the five artifact files (spec.md §4.7).
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// The file could not be opened for append or (re)initialization.
    #[error("failed to open artifact file {path}: {message}")]
    Open {
        /// The offending path.
        path: String,
        /// The underlying I/O error's message.
        message: String,
    },
    /// A write to an already-open file failed.
    #[error("failed to write artifact file {path}: {message}")]
    Write {
        /// The offending path.
        path: String,
        /// The underlying I/O error's message.
        message: String,
    },
    /// The value to append could not be serialized to JSON.
    #[error("failed to serialize artifact payload: {0}")]
    Serialize(String),
}
