// canary-cli/src/main.rs
// ============================================================================
// Module: Entry Point
// Description: Parses CLI flags, runs the driver, and translates its
//              outcome into a process exit code (spec.md §6 "Exit codes").
// Purpose: The only place allowed to call `std::process::exit`; every other
//          module returns `Result`/`Outcome` values instead.
// Dependencies: canary-cli (this crate's own modules), clap
// ============================================================================

//! ## Overview
//! `main` does nothing but parse [`cli::Cli`], hand it to [`driver::run`],
//! and map the result to an exit code: 0 when every selected canary
//! passed, 1 for a failing canary, a fatal config/preflight/authoring
//! error, or an unknown `--mode`/`--env` value (spec.md §6, §7).

mod cli;
mod driver;
mod pool;
mod report;

use clap::Parser;

use crate::cli::Cli;
use crate::report::write_stderr_line;

#[allow(clippy::exit, reason = "the one sanctioned exit point this workspace allows")]
fn main() {
    let cli = Cli::parse();
    match driver::run(&cli) {
        Ok(outcome) => std::process::exit(i32::from(outcome.exit_code())),
        Err(err) => {
            write_stderr_line(&format!("[canary-harness] fatal: {err}"));
            std::process::exit(1);
        }
    }
}
