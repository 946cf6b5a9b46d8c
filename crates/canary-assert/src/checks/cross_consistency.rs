// canary-assert/src/checks/cross_consistency.rs
// ============================================================================
// Check: Invocation / State-Store Cross-Consistency
// Description: When the invocation response returned an image entry for an
//              asset, the state-store URL, prompt hash, and trace URL must
//              match the returned values, and the returned trace URL must
//              itself pass the allowlist check (spec.md §4.6).
// ============================================================================

use canary_core::AssertionError;
use canary_core::AssetType;

use crate::allowlist::url_allowed;
use crate::context::AssertionContext;
use crate::outcome::AssertionOutcome;

/// Checks one asset's invocation-response facts against the resolved
/// state-store facts, when the invocation returned an image entry for it.
#[must_use]
pub fn check_cross_consistency(ctx: &AssertionContext, asset_type: AssetType) -> Vec<AssertionOutcome> {
    let asset = ctx.asset(asset_type);
    let Some(invocation) = asset.invocation_image.as_ref() else {
        return Vec::new();
    };
    let label = asset_type.label();
    let mut outcomes = Vec::new();

    if asset.resolved.url.as_deref() != Some(invocation.url.as_str()) {
        outcomes.push(AssertionOutcome::Instrumentation(AssertionError::for_asset(
            "url_cross_consistency_mismatch",
            format!(
                "{label} state-store url {:?} does not match invocation-returned url \"{}\"",
                asset.resolved.url, invocation.url
            ),
            asset_type,
        )));
    }

    if asset.resolved.prompt_hash.as_deref() != invocation.prompt_hash.as_deref() {
        outcomes.push(AssertionOutcome::Instrumentation(AssertionError::for_asset(
            "prompt_hash_cross_consistency_mismatch",
            format!(
                "{label} state-store prompt hash {:?} does not match invocation-returned prompt hash {:?}",
                asset.resolved.prompt_hash, invocation.prompt_hash
            ),
            asset_type,
        )));
    }

    if asset.resolved.trace_url.as_deref() != invocation.trace_url.as_deref() {
        outcomes.push(AssertionOutcome::Instrumentation(AssertionError::for_asset(
            "trace_url_cross_consistency_mismatch",
            format!(
                "{label} state-store trace_url {:?} does not match invocation-returned trace_url {:?}",
                asset.resolved.trace_url, invocation.trace_url
            ),
            asset_type,
        )));
    }

    if let Some(trace_url) = invocation.trace_url.as_deref() {
        if !url_allowed(trace_url, &ctx.allowed_asset_hosts) {
            outcomes.push(AssertionOutcome::Instrumentation(AssertionError::for_asset(
                "invocation_trace_url_host_not_allowed",
                format!("{label} invocation-returned trace_url host not allowed: {trace_url}"),
                asset_type,
            )));
        }
    }

    outcomes
}
