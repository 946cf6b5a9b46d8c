// canary-assert/src/checks/expectations.rs
// ============================================================================
// Check: Expectation-Driven Assertions
// Description: The four canary-authored expectation tags, each dispatched
//              only when the canary's `expectations` record requests it
//              (spec.md §4.6): `requireLimbDifference`,
//              `requireWheelchairPresence`, `requireSpeciesTruthiness`,
//              `requireSupportWorldFit`. All four inspect the bodyshot.
// ============================================================================

use canary_core::AssertionError;
use canary_core::AssetType;

use crate::context::AssertionContext;
use crate::outcome::AssertionOutcome;

/// Runs every expectation check the canary's `expectations` record requests.
#[must_use]
pub fn check_expectations(ctx: &AssertionContext) -> Vec<AssertionOutcome> {
    let mut outcomes = Vec::new();
    if ctx.require_limb_difference {
        outcomes.extend(check_limb_difference(ctx));
    }
    if ctx.require_wheelchair_presence {
        outcomes.extend(check_wheelchair_presence(ctx));
    }
    if ctx.require_species_truthiness {
        outcomes.extend(check_species_truthiness(ctx));
    }
    if ctx.require_support_world_fit {
        outcomes.extend(check_support_world_fit(ctx));
    }
    outcomes
}

/// `requireLimbDifference`: bodyshot trace must carry
/// `validation.limbs.limb_difference_confirmed === true`; otherwise, if the
/// character is not in `needs_retry`, hard_fail.
fn check_limb_difference(ctx: &AssertionContext) -> Vec<AssertionOutcome> {
    let confirmed = ctx
        .bodyshot
        .attempt
        .as_ref()
        .and_then(|attempt| attempt.validation_summary.as_ref())
        .and_then(|summary| summary.limbs.as_ref())
        .and_then(|limbs| limbs.limb_difference_confirmed);
    if confirmed == Some(true) {
        return Vec::new();
    }
    if ctx.is_needs_retry() {
        return Vec::new();
    }
    vec![AssertionOutcome::HardFail(AssertionError::for_asset(
        "limb_difference_not_confirmed",
        "Limb difference not confirmed should hard_fail bodyshot",
        AssetType::Bodyshot,
    ))]
}

/// `requireWheelchairPresence`: in bodyshot `traits_visible`, any entry
/// whose trait matches `/wheelchair/i` and has `visible === false`, and the
/// character is not in `needs_retry`, hard-fails.
fn check_wheelchair_presence(ctx: &AssertionContext) -> Vec<AssertionOutcome> {
    let Some(summary) = ctx.bodyshot.attempt.as_ref().and_then(|attempt| attempt.validation_summary.as_ref()) else {
        return Vec::new();
    };
    let missing = summary
        .traits_visible
        .iter()
        .any(|entry| entry.trait_name.to_lowercase().contains("wheelchair") && !entry.visible);
    if !missing || ctx.is_needs_retry() {
        return Vec::new();
    }
    vec![AssertionOutcome::HardFail(AssertionError::for_asset(
        "wheelchair_presence_unmet",
        "Wheelchair not visible should hard_fail bodyshot",
        AssetType::Bodyshot,
    ))]
}

/// `requireSpeciesTruthiness`: bodyshot trace's `species_anatomy_confirmed
/// !== true` hard-fails in strict mode when not `needs_retry`, else
/// soft_issue.
fn check_species_truthiness(ctx: &AssertionContext) -> Vec<AssertionOutcome> {
    let confirmed = ctx
        .bodyshot
        .attempt
        .as_ref()
        .and_then(|attempt| attempt.validation_summary.as_ref())
        .and_then(|summary| summary.species_anatomy_confirmed);
    if confirmed == Some(true) {
        return Vec::new();
    }
    let error = AssertionError::for_asset(
        "species_anatomy_unconfirmed",
        "Species anatomy not confirmed for bodyshot",
        AssetType::Bodyshot,
    );
    if ctx.strict.is_strict() && !ctx.is_needs_retry() {
        vec![AssertionOutcome::HardFail(error)]
    } else {
        vec![AssertionOutcome::SoftIssue(error)]
    }
}

/// `requireSupportWorldFit`: when bodyshot's `support_world_fit` contains a
/// `world_fit === false` entry, three soft-issue checks apply.
fn check_support_world_fit(ctx: &AssertionContext) -> Vec<AssertionOutcome> {
    let Some(summary) = ctx.bodyshot.attempt.as_ref().and_then(|attempt| attempt.validation_summary.as_ref()) else {
        return Vec::new();
    };
    if !summary.support_world_fit.iter().any(|entry| !entry.world_fit) {
        return Vec::new();
    }

    let mut outcomes = Vec::new();

    let status_ok = matches!(ctx.bodyshot.status.as_deref(), Some("soft_fail") | Some("ready"));
    if !status_ok {
        outcomes.push(AssertionOutcome::SoftIssue(AssertionError::for_asset(
            "support_world_fit_status_unexpected",
            format!("bodyshot status {:?} unexpected after support-world-fit mismatch", ctx.bodyshot.status),
            AssetType::Bodyshot,
        )));
    }

    if ctx.bodyshot.edit_attempts.is_empty() {
        outcomes.push(AssertionOutcome::SoftIssue(AssertionError::for_asset(
            "support_world_fit_no_edit_attempt",
            "support-world-fit mismatch but no bodyshot edit attempt exists",
            AssetType::Bodyshot,
        )));
    } else if let Some(edited) = ctx.bodyshot.edit_attempts.last() {
        let persisted_url = ctx.bodyshot.resolved.url.as_deref();
        if edited.image_url.as_deref() == persisted_url {
            outcomes.push(AssertionOutcome::SoftIssue(AssertionError::for_asset(
                "support_world_fit_edit_url_unchanged",
                "edited bodyshot url matches the persisted bodyshot url",
                AssetType::Bodyshot,
            )));
        }
    }

    outcomes
}
