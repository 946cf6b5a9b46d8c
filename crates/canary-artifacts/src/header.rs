// canary-artifacts/src/header.rs
// ============================================================================
// Module: Review Header
// Description: The header block written to both review markdown files at
//              the start of every run (spec.md §4.7).
// Purpose: Give a reviewer the run's identifying facts without having to
//          cross-reference the JSONL.
// Dependencies: time
// ============================================================================

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// The header block written at the top of both review markdown files.
///
/// `window_end` and `total_runs` are intentionally left blank at header time
/// (spec.md §4.7 notes the window only has a start until the run finishes);
/// nothing in this harness goes back to fill them in after the fact, so the
/// header renders those two lines empty rather than omitting them.
#[derive(Debug, Clone)]
pub struct ReviewHeader<'a> {
    /// Run nonce shared by every canary in this invocation.
    pub run_nonce: &'a str,
    /// Deployment environment tag (`staging`, `production`).
    pub environment: &'a str,
    /// Whether `environment` was inferred rather than explicitly passed.
    pub environment_inferred: bool,
    /// Execution mode (`e2e` or `component`).
    pub mode: &'a str,
    /// API base URL of the generation service.
    pub api_base_url: &'a str,
    /// Discovered or defaulted auth base path.
    pub auth_base_path: &'a str,
    /// Public snapshot base path.
    pub snapshot_base_path: &'a str,
    /// Invocation target identifier.
    pub invocation_target: &'a str,
    /// Provenance of the invocation target identifier.
    pub invocation_target_source: &'a str,
}

impl ReviewHeader<'_> {
    /// Renders the header block as markdown, stamped with the current time
    /// as `window-start`.
    #[must_use]
    pub fn render(&self) -> String {
        let window_start = OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_else(|_| String::from("unknown"));
        let environment_note = if self.environment_inferred { " (inferred)" } else { "" };
        format!(
            "# Canary Review\n\n\
             - window-start: {window_start}\n\
             - window-end:\n\
             - total-runs:\n\
             - run-nonce: {run_nonce}\n\
             - environment: {environment}{environment_note}\n\
             - mode: {mode}\n\
             - api-base-url: {api_base_url}\n\
             - auth-base-path: {auth_base_path}\n\
             - snapshot-base-path: {snapshot_base_path}\n\
             - invocation-target: {invocation_target} (source: {invocation_target_source})\n",
            run_nonce = self.run_nonce,
            environment = self.environment,
            mode = self.mode,
            api_base_url = self.api_base_url,
            auth_base_path = self.auth_base_path,
            snapshot_base_path = self.snapshot_base_path,
            invocation_target = self.invocation_target,
            invocation_target_source = self.invocation_target_source,
        )
    }
}
