// canary-assert/src/checks/trace_distinct.rs
// ============================================================================
// Check: Trace URL Distinctness
// Description: `headshot_trace_url != bodyshot_trace_url` when both present
//              (spec.md §4.6).
// ============================================================================

use canary_core::AssertionError;

use crate::context::AssertionContext;
use crate::outcome::AssertionOutcome;

/// Checks that the resolved headshot and bodyshot trace URLs differ, when
/// both are present.
#[must_use]
pub fn check_trace_urls_distinct(ctx: &AssertionContext) -> Vec<AssertionOutcome> {
    let headshot_trace = ctx.headshot.resolved.trace_url.as_deref();
    let bodyshot_trace = ctx.bodyshot.resolved.trace_url.as_deref();
    match (headshot_trace, bodyshot_trace) {
        (Some(headshot), Some(bodyshot)) if headshot == bodyshot => {
            vec![AssertionOutcome::Instrumentation(AssertionError::new(
                "trace_urls_not_distinct",
                format!("headshot and bodyshot trace_url are identical: {headshot}"),
            ))]
        }
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::AssetContext;
    use crate::context::StrictMode;
    use canary_core::ResolvedAsset;

    fn ctx(headshot_trace: Option<&str>, bodyshot_trace: Option<&str>) -> AssertionContext {
        AssertionContext {
            allowed_asset_hosts: Vec::new(),
            require_limb_difference: false,
            require_wheelchair_presence: false,
            require_species_truthiness: false,
            require_support_world_fit: false,
            character_state: None,
            is_nonhuman: false,
            strict: StrictMode::Lenient,
            headshot: AssetContext {
                resolved: ResolvedAsset { url: None, trace_url: headshot_trace.map(str::to_string), prompt_hash: None },
                ..AssetContext::default()
            },
            bodyshot: AssetContext {
                resolved: ResolvedAsset { url: None, trace_url: bodyshot_trace.map(str::to_string), prompt_hash: None },
                ..AssetContext::default()
            },
        }
    }

    #[test]
    fn identical_trace_urls_are_flagged() {
        let ctx = ctx(Some("https://trace.example.com/a.json"), Some("https://trace.example.com/a.json"));
        assert_eq!(check_trace_urls_distinct(&ctx).len(), 1);
    }

    #[test]
    fn distinct_trace_urls_pass() {
        let ctx = ctx(Some("https://trace.example.com/a.json"), Some("https://trace.example.com/b.json"));
        assert!(check_trace_urls_distinct(&ctx).is_empty());
    }

    #[test]
    fn missing_one_side_passes() {
        let ctx = ctx(Some("https://trace.example.com/a.json"), None);
        assert!(check_trace_urls_distinct(&ctx).is_empty());
    }
}
