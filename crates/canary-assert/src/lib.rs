// canary-assert/src/lib.rs
// ============================================================================
// Module: Canary Assert
// Description: The assertion kernel (spec.md §4.6) — a pure function from
//              resolved per-canary facts to the three non-overlapping error
//              lists a `RunReport` carries.
// Purpose: Keep every invariant in one place, independent of how the runner
//          fetched the facts it hands in.
// Dependencies: canary-core, serde_json
// ============================================================================

//! ## Overview
//! Every check in [`checks`] is a pure function over [`AssertionContext`]
//! returning zero or more [`AssertionOutcome`]s. [`run_kernel`] runs the full
//! matrix for one canary and partitions the results into the
//! instrumentation/hard-fail/soft-issue lists a [`canary_core::RunReport`]
//! carries (spec.md §4.6, "Verdict").

pub mod allowlist;
pub mod checks;
pub mod context;
pub mod outcome;
pub mod species;

use canary_core::AssertionError;
use canary_core::AssetType;

pub use context::AssertionContext;
pub use context::AssetContext;
pub use context::InvocationImageFacts;
pub use context::StrictMode;
pub use outcome::AssertionOutcome;

/// The three non-overlapping error lists the assertion kernel produces for
/// one canary (spec.md §4.6).
#[derive(Debug, Clone, Default)]
pub struct KernelResult {
    /// The canary's observability was broken.
    pub instrumentation: Vec<AssertionError>,
    /// The pipeline violated a contractual expectation.
    pub hard_fail: Vec<AssertionError>,
    /// Non-blocking divergences.
    pub soft_issues: Vec<AssertionError>,
}

impl KernelResult {
    fn push(&mut self, outcome: AssertionOutcome) {
        match outcome {
            AssertionOutcome::Instrumentation(error) => self.instrumentation.push(error),
            AssertionOutcome::HardFail(error) => self.hard_fail.push(error),
            AssertionOutcome::SoftIssue(error) => self.soft_issues.push(error),
        }
    }

    fn extend(&mut self, outcomes: Vec<AssertionOutcome>) {
        for outcome in outcomes {
            self.push(outcome);
        }
    }
}

/// Runs the full assertion matrix for one canary and partitions the results
/// into the three `RunReport` lists (spec.md §4.6).
#[must_use]
pub fn run_kernel(ctx: &AssertionContext) -> KernelResult {
    let mut result = KernelResult::default();

    result.extend(checks::hosts::check_public_asset_hosts_nonempty(ctx));
    result.extend(checks::presence::check_prompt_hashes_present(ctx));
    result.extend(checks::trace_distinct::check_trace_urls_distinct(ctx));
    result.extend(checks::expectations::check_expectations(ctx));

    for asset_type in [AssetType::Headshot, AssetType::Bodyshot] {
        result.extend(checks::asset_url::check_asset_url(ctx, asset_type));
        result.extend(checks::presence::check_attempt_presence(ctx, asset_type));
        result.extend(checks::cross_consistency::check_cross_consistency(ctx, asset_type));
        result.extend(checks::request_id::check_request_id_consistency(ctx, asset_type));
        result.extend(checks::drift::check_nonhuman_drift_chain(ctx, asset_type));
    }

    result
}
