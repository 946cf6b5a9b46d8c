// canary-assert/src/checks/presence.rs
// ============================================================================
// Check: Attempt & Prompt-Hash Presence
// Description: Per attempt, `trace_url` must be present and
//              `validation_summary` must be present unless the attempt
//              hard-failed; prompt hashes must be present for both assets
//              (spec.md §4.6).
// ============================================================================

use canary_core::AssertionError;
use canary_core::AssetType;
use canary_core::AttemptStatus;

use crate::context::AssertionContext;
use crate::outcome::AssertionOutcome;

/// Checks the latest attempt for `asset_type` carries a `trace_url`, and a
/// `validation_summary` unless the attempt hard-failed (spec.md §4.6).
#[must_use]
pub fn check_attempt_presence(ctx: &AssertionContext, asset_type: AssetType) -> Vec<AssertionOutcome> {
    let asset = ctx.asset(asset_type);
    let label = asset_type.label();
    let Some(attempt) = asset.attempt.as_ref() else {
        return vec![AssertionOutcome::Instrumentation(AssertionError::for_asset(
            "attempt_missing",
            format!("no attempt recorded for {label}"),
            asset_type,
        ))];
    };

    let mut outcomes = Vec::new();
    if attempt.trace_url.is_none() {
        outcomes.push(AssertionOutcome::Instrumentation(AssertionError::for_asset(
            "trace_url_missing",
            format!("{label} attempt {} carries no trace_url", attempt.id),
            asset_type,
        )));
    }
    if attempt.validation_summary.is_none() && attempt.status != AttemptStatus::HardFail {
        outcomes.push(AssertionOutcome::Instrumentation(AssertionError::for_asset(
            "validation_summary_missing",
            format!("{label} attempt {} carries no validation_summary", attempt.id),
            asset_type,
        )));
    }
    outcomes
}

/// Checks that prompt hashes are present for both assets (spec.md §4.6).
#[must_use]
pub fn check_prompt_hashes_present(ctx: &AssertionContext) -> Vec<AssertionOutcome> {
    [AssetType::Headshot, AssetType::Bodyshot]
        .into_iter()
        .filter_map(|asset_type| {
            let asset = ctx.asset(asset_type);
            if asset.resolved.prompt_hash.is_some() {
                None
            } else {
                Some(AssertionOutcome::Instrumentation(AssertionError::for_asset(
                    "prompt_hash_missing",
                    format!("{} prompt hash is missing", asset_type.label()),
                    asset_type,
                )))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::AssetContext;
    use crate::context::StrictMode;
    use canary_core::AttemptId;
    use canary_core::AttemptRecord;
    use canary_core::CharacterId;
    use canary_core::ResolvedAsset;
    use canary_core::ValidationSummary;

    fn attempt(status: AttemptStatus, trace_url: Option<&str>, validation: Option<ValidationSummary>) -> AttemptRecord {
        AttemptRecord {
            id: AttemptId::new("attempt-1"),
            character_id: CharacterId::new("char-1"),
            asset_type: AssetType::Headshot,
            attempt_index: Some(0),
            status,
            image_url: None,
            fail_image_url: None,
            trace_url: trace_url.map(str::to_string),
            openai_request_id: None,
            failure_codes: Vec::new(),
            failure_reason: None,
            validation_summary: validation,
            fix_of_attempt_id: None,
            created_at: None,
        }
    }

    fn base_ctx() -> AssertionContext {
        AssertionContext {
            allowed_asset_hosts: Vec::new(),
            require_limb_difference: false,
            require_wheelchair_presence: false,
            require_species_truthiness: false,
            require_support_world_fit: false,
            character_state: None,
            is_nonhuman: false,
            strict: StrictMode::Lenient,
            headshot: AssetContext::default(),
            bodyshot: AssetContext::default(),
        }
    }

    #[test]
    fn missing_attempt_is_instrumentation_error() {
        let ctx = base_ctx();
        let outcomes = check_attempt_presence(&ctx, AssetType::Headshot);
        assert_eq!(outcomes.len(), 1);
        assert!(matches!(outcomes[0], AssertionOutcome::Instrumentation(_)));
    }

    #[test]
    fn missing_validation_summary_is_excused_on_hard_fail() {
        let mut ctx = base_ctx();
        ctx.headshot.attempt = Some(attempt(AttemptStatus::HardFail, Some("https://trace.example.com/t.json"), None));
        assert!(check_attempt_presence(&ctx, AssetType::Headshot).is_empty());
    }

    #[test]
    fn missing_validation_summary_on_ok_attempt_is_flagged() {
        let mut ctx = base_ctx();
        ctx.headshot.attempt = Some(attempt(AttemptStatus::Ok, Some("https://trace.example.com/t.json"), None));
        let outcomes = check_attempt_presence(&ctx, AssetType::Headshot);
        assert_eq!(outcomes.len(), 1);
    }

    #[test]
    fn missing_prompt_hash_is_flagged_per_asset() {
        let mut ctx = base_ctx();
        ctx.headshot.resolved = ResolvedAsset { url: None, trace_url: None, prompt_hash: Some("h".to_string()) };
        let outcomes = check_prompt_hashes_present(&ctx);
        assert_eq!(outcomes.len(), 1);
    }
}
