// canary-runner/src/lib.rs
// ============================================================================
// Module: Canary Runner
// Description: The per-canary invoke / poll / assert / remediate / emit
//              sequence (spec.md §4.5).
// Purpose: Give `canary-cli` one call per canary — [`orchestrate::run_canary`]
//          — that strings together every step this crate implements and
//          returns an already-emitted report.
// Dependencies: canary-artifacts, canary-assert, canary-config, canary-core,
//               canary-providers, serde_json, thiserror, time
// ============================================================================

//! ## Overview
//! Each module here is one lettered step from spec.md §4.5: [`invocation`]
//! (A), [`public_snapshot`] (B), [`facts`] (C), [`trace`] (D), [`remediation`]
//! (E). [`orchestrate`] strings them together into step F (build the
//! assertion context, run the kernel) and step G (build and emit the
//! `RunReport`). [`clock`] is the sleep seam the remediation poll uses;
//! [`error`] is the one error variant that aborts a canary's report entirely
//! rather than being captured inside it.

pub mod clock;
pub mod error;
pub mod facts;
pub mod invocation;
pub mod orchestrate;
pub mod public_snapshot;
pub mod remediation;
pub mod trace;

pub use clock::Clock;
pub use clock::ThreadSleepClock;
pub use error::RunnerError;
pub use facts::CharacterFacts;
pub use facts::FactsError;
pub use facts::fetch_character_facts;
pub use invocation::InvocationError;
pub use invocation::InvocationOutcome;
pub use invocation::invoke;
pub use orchestrate::CanaryRunInputs;
pub use orchestrate::CanaryRunOutcome;
pub use orchestrate::RunnerCollaborators;
pub use orchestrate::run_canary;
pub use public_snapshot::PublicSnapshotOutcome;
pub use public_snapshot::fetch_public_snapshot;
pub use remediation::AssetRemediation;
pub use remediation::RemediationOutcome;
pub use remediation::bodyshot_eligible;
pub use remediation::headshot_eligible;
pub use remediation::run_remediation;
pub use trace::TraceFetch;
pub use trace::fetch_trace;
