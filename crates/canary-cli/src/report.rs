// canary-cli/src/report.rs
// ============================================================================
// Module: Explicit Output Writers
// Description: The only place in this workspace allowed to write to stdout
//              or stderr (spec.md §2.1's ambient logging convention).
// Purpose: Keep `print_stdout`/`print_stderr` denied everywhere else while
//          giving the driver one narrow, explicit seam for progress lines
//          and the final JSON summary.
// Dependencies: canary-config, std::io
// ============================================================================

//! ## Overview
//! [`StderrSink`] implements [`canary_config::ProvenanceSink`] for preflight
//! and config-resolution progress lines; [`write_stdout_line`] is used
//! exactly once, for the final JSON summary spec.md §7 requires. Neither
//! function buffers or formats beyond appending a trailing newline if one
//! is missing.

use std::io::Write;

use canary_config::ProvenanceSink;

/// Writes one line to stderr, used for preflight/config provenance and
/// progress output (spec.md §2.1).
#[allow(clippy::print_stderr, reason = "the one sanctioned writer this workspace allows")]
pub fn write_stderr_line(line: &str) {
    let mut stderr = std::io::stderr();
    let _ = writeln!(stderr, "{line}");
}

/// Writes one line to stdout, used only for the final JSON summary
/// (spec.md §7).
#[allow(clippy::print_stdout, reason = "the one sanctioned writer this workspace allows")]
pub fn write_stdout_line(line: &str) {
    let mut stdout = std::io::stdout();
    let _ = writeln!(stdout, "{line}");
}

/// A [`ProvenanceSink`] that writes every line to stderr, prefixed so
/// provenance lines are visually distinct from the final stdout summary.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrSink;

impl ProvenanceSink for StderrSink {
    fn log(&self, line: &str) {
        write_stderr_line(&format!("[canary-harness] {line}"));
    }
}
