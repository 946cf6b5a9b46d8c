// canary-assert/src/checks/drift.rs
// ============================================================================
// Check: Nonhuman Drift Chain
// Description: For nonhuman-species canaries, each asset's validation must
//              carry a non-null `nonhuman_human_default`; when it is true
//              and the attempt carries no `safety` code, a later edit
//              attempt with a validation summary must exist, and if that
//              edit attempt also defaulted to human, strict mode hard-fails
//              while lenient mode soft-issues (spec.md §4.5 step E, §4.6).
// ============================================================================

use canary_core::AssertionError;
use canary_core::AssetType;

use crate::context::AssertionContext;
use crate::outcome::AssertionOutcome;

/// Runs the nonhuman drift chain for `asset_type`, a no-op for
/// explicit-human canaries.
#[must_use]
pub fn check_nonhuman_drift_chain(ctx: &AssertionContext, asset_type: AssetType) -> Vec<AssertionOutcome> {
    if !ctx.is_nonhuman {
        return Vec::new();
    }
    let asset = ctx.asset(asset_type);
    let label = asset_type.label();
    let Some(attempt) = asset.attempt.as_ref() else {
        return Vec::new();
    };
    let Some(summary) = attempt.validation_summary.as_ref() else {
        return Vec::new();
    };

    let Some(defaulted_to_human) = summary.nonhuman_human_default else {
        return vec![AssertionOutcome::Instrumentation(AssertionError::for_asset(
            "nonhuman_human_default_missing",
            format!("{label} validation summary carries no nonhuman_human_default"),
            asset_type,
        ))];
    };

    if !defaulted_to_human || attempt.has_failure_code("safety") {
        return Vec::new();
    }

    let Some(edit_summary) = asset.edit_attempts.iter().rev().find_map(|edit| edit.validation_summary.as_ref()) else {
        return vec![AssertionOutcome::Instrumentation(AssertionError::for_asset(
            "nonhuman_drift_edit_attempt_missing",
            format!("{label} defaulted to human but no later edit attempt with a validation_summary was observed"),
            asset_type,
        ))];
    };

    if edit_summary.nonhuman_human_default != Some(true) {
        return Vec::new();
    }

    let error = AssertionError::for_asset(
        "nonhuman_drift_persisted_after_edit",
        format!("Nonhuman drift persisted after edit for {label}"),
        asset_type,
    );
    if ctx.strict.is_strict() {
        vec![AssertionOutcome::HardFail(error)]
    } else {
        let confidence = edit_summary.nonhuman_human_default_confidence;
        vec![AssertionOutcome::SoftIssue(AssertionError::for_asset(
            "nonhuman_drift_persisted_after_edit",
            format!("Nonhuman drift persisted after edit for {label} (confidence {confidence:?})"),
            asset_type,
        ))]
    }
}
