// canary-assert/src/checks/request_id.rs
// ============================================================================
// Check: Provider Request Id Consistency
// Description: When the invocation returned `openaiRequestId` for an asset,
//              it must equal the value carried in the persisted trace,
//              either at the top level or nested under the asset key
//              (spec.md §4.6).
// ============================================================================

use canary_core::AssertionError;
use canary_core::AssetType;
use serde_json::Value;

use crate::context::AssertionContext;
use crate::outcome::AssertionOutcome;

/// Checks that a returned `openaiRequestId` matches the value carried in
/// the fetched trace for `asset_type`, when the invocation returned one.
#[must_use]
pub fn check_request_id_consistency(ctx: &AssertionContext, asset_type: AssetType) -> Vec<AssertionOutcome> {
    let asset = ctx.asset(asset_type);
    let Some(expected) = asset.invocation_image.as_ref().and_then(|image| image.openai_request_id.as_deref())
    else {
        return Vec::new();
    };
    let label = asset_type.label();
    let found = asset.trace_raw.as_ref().and_then(|trace| trace_request_id(trace, asset_type));
    if found.as_deref() == Some(expected) {
        Vec::new()
    } else {
        vec![AssertionOutcome::Instrumentation(AssertionError::for_asset(
            "openai_request_id_mismatch",
            format!(
                "{label} invocation-returned openaiRequestId \"{expected}\" not found in persisted trace (found {found:?})"
            ),
            asset_type,
        ))]
    }
}

/// Extracts a request id from a trace, preferring the top-level key but
/// falling back to a nested object keyed by the asset's label.
fn trace_request_id(trace: &Value, asset_type: AssetType) -> Option<String> {
    if let Some(id) = trace.get("openai_request_id").or_else(|| trace.get("openaiRequestId")).and_then(Value::as_str) {
        return Some(id.to_string());
    }
    trace
        .get(asset_type.label())
        .and_then(|nested| nested.get("openai_request_id").or_else(|| nested.get("openaiRequestId")))
        .and_then(Value::as_str)
        .map(str::to_string)
}
