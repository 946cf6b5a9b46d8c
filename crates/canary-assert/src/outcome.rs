// canary-assert/src/outcome.rs
// ============================================================================
// Module: Assertion Outcome
// Description: The three-way classification every check emits into
//              (spec.md §4.6).
// Purpose: Let each check function return a flat `Vec<AssertionOutcome>`
//          that the kernel sorts into the report's three lists, rather than
//          threading three mutable accumulators through every check.
// Dependencies: canary-core
// ============================================================================

use canary_core::AssertionError;

/// One check's verdict on a single fact (spec.md §4.6: "Each check emits
/// exactly one of three classes").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssertionOutcome {
    /// The canary's observability is broken.
    Instrumentation(AssertionError),
    /// The pipeline failed its contract.
    HardFail(AssertionError),
    /// A non-blocking divergence.
    SoftIssue(AssertionError),
}
