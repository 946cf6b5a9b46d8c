// canary-runner/src/error.rs
// ============================================================================
// Module: Runner Errors
// Description: The single error variant that aborts the whole run rather
//              than degrading into a per-canary failure record (spec.md §7:
//              "On any fatal per-canary error, artifact emission still runs
//              to produce a failure record").
// Purpose: Every other failure mode observed while running one canary is
//          captured as an `AssertionError` in that canary's `RunReport`
//          instead of propagated here.
// Dependencies: canary-artifacts, thiserror
// ============================================================================

use canary_artifacts::ArtifactError;
use thiserror::Error;

/// A failure that prevents the current canary's report from being emitted
/// at all, rather than one recorded inside the report.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The artifact emitter itself failed to write.
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}
