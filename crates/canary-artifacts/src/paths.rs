// canary-artifacts/src/paths.rs
// ============================================================================
// Module: Artifact Paths
// Description: Resolves the five artifact file paths from environment
//              overrides and a system temp-dir default (spec.md §6).
// Purpose: Centralize the four env-var overrides plus the per-run-markdown
//          derivation in one place, so `canary-cli` never duplicates this
//          precedence logic.
// Dependencies: std::env
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use canary_core::RunNonce;

const CANARY_JSONL_ENV: &str = "CANARY_REPORT_JSONL_PATH";
const CANARY_MARKDOWN_ENV: &str = "CANARY_REPORT_MARKDOWN_PATH";
const ATTEMPTS_JSONL_ENV: &str = "CANARY_ATTEMPTS_JSONL_PATH";
const REVIEW_MARKDOWN_ENV: &str = "CANARY_REVIEW_MARKDOWN_PATH";

const CANARY_JSONL_DEFAULT: &str = "canary-harness-report.jsonl";
const CANARY_MARKDOWN_DEFAULT: &str = "canary-harness-report.md";
const ATTEMPTS_JSONL_DEFAULT: &str = "canary-harness-attempts.jsonl";
const REVIEW_MARKDOWN_DEFAULT: &str = "canary-harness-review.md";

/// The five artifact file paths resolved for one run (spec.md §4.7, §6).
///
/// Four of the five resolve through an explicit env-var override with a
/// system-temp-dir default; the fifth (`review_markdown_per_run`) has no
/// override of its own, it is always the persistent review markdown's path
/// with the run nonce spliced into the file stem (`DESIGN.md` records this
/// as the resolution of the "per-run" naming scheme spec.md §6 leaves
/// unspecified).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    /// Append-only JSONL of per-canary `RunReport`s.
    pub canary_jsonl: PathBuf,
    /// Persistent markdown mirror of `canary_jsonl`'s run-summary entries.
    pub canary_markdown: PathBuf,
    /// Append-only JSONL of per-attempt review entries.
    pub attempts_jsonl: PathBuf,
    /// Persistent ("latest") attempt-review markdown, re-initialized each run.
    pub review_markdown_latest: PathBuf,
    /// Per-run (timestamped by nonce) attempt-review markdown.
    pub review_markdown_per_run: PathBuf,
}

impl ArtifactPaths {
    /// Resolves every artifact path from its env-var override, falling back
    /// to a filename under the system temp directory (spec.md §6).
    #[must_use]
    pub fn resolve(run_nonce: &RunNonce) -> Self {
        let temp_dir = std::env::temp_dir();
        let canary_jsonl = resolve_one(CANARY_JSONL_ENV, &temp_dir, CANARY_JSONL_DEFAULT);
        let canary_markdown = resolve_one(CANARY_MARKDOWN_ENV, &temp_dir, CANARY_MARKDOWN_DEFAULT);
        let attempts_jsonl = resolve_one(ATTEMPTS_JSONL_ENV, &temp_dir, ATTEMPTS_JSONL_DEFAULT);
        let review_markdown_latest = resolve_one(REVIEW_MARKDOWN_ENV, &temp_dir, REVIEW_MARKDOWN_DEFAULT);
        let review_markdown_per_run = per_run_path(&review_markdown_latest, run_nonce);
        Self { canary_jsonl, canary_markdown, attempts_jsonl, review_markdown_latest, review_markdown_per_run }
    }
}

fn resolve_one(env_var: &str, temp_dir: &Path, default_name: &str) -> PathBuf {
    std::env::var(env_var).map(PathBuf::from).unwrap_or_else(|_| temp_dir.join(default_name))
}

fn per_run_path(latest: &Path, run_nonce: &RunNonce) -> PathBuf {
    let stem = latest.file_stem().and_then(|stem| stem.to_str()).unwrap_or("canary-harness-review");
    let extension = latest.extension().and_then(|ext| ext.to_str()).unwrap_or("md");
    let filename = format!("{stem}-{}.{extension}", run_nonce.as_str());
    match latest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(filename),
        _ => PathBuf::from(filename),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nonce() -> RunNonce {
        RunNonce::new("run-abc123")
    }

    #[test]
    fn defaults_land_under_temp_dir() {
        unsafe {
            std::env::remove_var(CANARY_JSONL_ENV);
        }
        let paths = ArtifactPaths::resolve(&nonce());
        assert_eq!(paths.canary_jsonl, std::env::temp_dir().join(CANARY_JSONL_DEFAULT));
    }

    #[test]
    fn env_override_is_honored() {
        unsafe {
            std::env::set_var(CANARY_JSONL_ENV, "/tmp/custom-report.jsonl");
        }
        let paths = ArtifactPaths::resolve(&nonce());
        assert_eq!(paths.canary_jsonl, PathBuf::from("/tmp/custom-report.jsonl"));
        unsafe {
            std::env::remove_var(CANARY_JSONL_ENV);
        }
    }

    #[test]
    fn per_run_path_splices_nonce_into_stem() {
        unsafe {
            std::env::set_var(REVIEW_MARKDOWN_ENV, "/tmp/review.md");
        }
        let paths = ArtifactPaths::resolve(&nonce());
        assert_eq!(paths.review_markdown_per_run, PathBuf::from("/tmp/review-run-abc123.md"));
        unsafe {
            std::env::remove_var(REVIEW_MARKDOWN_ENV);
        }
    }
}
