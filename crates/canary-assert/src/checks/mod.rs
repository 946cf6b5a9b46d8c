// canary-assert/src/checks/mod.rs
// ============================================================================
// Module: Check Families
// Description: Groups the assertion kernel's checks by the fact family they
//              inspect (spec.md §4.6).
// Purpose: Keep each check small and independently testable against the 6
//          scenarios in spec.md §8.
// Dependencies: canary-core
// ============================================================================

pub mod asset_url;
pub mod cross_consistency;
pub mod drift;
pub mod expectations;
pub mod hosts;
pub mod presence;
pub mod request_id;
pub mod trace_distinct;
