// canary-assert/src/checks/asset_url.rs
// ============================================================================
// Check: Asset URL Presence & Allowlist
// Description: For each of `headshot_url` and `bodyshot_url`: present,
//              `https://`, not `data:`, host allowlisted (spec.md §4.6).
// ============================================================================

use canary_core::AssertionError;
use canary_core::AssetType;

use crate::allowlist::url_allowed;
use crate::context::AssertionContext;
use crate::outcome::AssertionOutcome;

/// Checks one asset's resolved URL for presence and allowlist membership.
#[must_use]
pub fn check_asset_url(ctx: &AssertionContext, asset_type: AssetType) -> Vec<AssertionOutcome> {
    let asset = ctx.asset(asset_type);
    let label = asset_type.label();
    let Some(url) = asset.resolved.url.as_deref() else {
        return vec![AssertionOutcome::Instrumentation(AssertionError::for_asset(
            "asset_url_missing",
            format!("{label}_url is missing"),
            asset_type,
        ))];
    };
    if url_allowed(url, &ctx.allowed_asset_hosts) {
        Vec::new()
    } else {
        vec![AssertionOutcome::Instrumentation(AssertionError::for_asset(
            "asset_url_host_not_allowed",
            format!("{label}_url host not allowed: {url}"),
            asset_type,
        ))]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::AssetContext;
    use crate::context::StrictMode;
    use canary_core::ResolvedAsset;

    fn ctx_with_headshot_url(url: Option<&str>, hosts: Vec<String>) -> AssertionContext {
        AssertionContext {
            allowed_asset_hosts: hosts,
            require_limb_difference: false,
            require_wheelchair_presence: false,
            require_species_truthiness: false,
            require_support_world_fit: false,
            character_state: None,
            is_nonhuman: false,
            strict: StrictMode::Lenient,
            headshot: AssetContext {
                resolved: ResolvedAsset { url: url.map(str::to_string), trace_url: None, prompt_hash: None },
                ..AssetContext::default()
            },
            bodyshot: AssetContext::default(),
        }
    }

    #[test]
    fn missing_url_is_instrumentation_error() {
        let ctx = ctx_with_headshot_url(None, vec!["cdn.example.com".to_string()]);
        let outcomes = check_asset_url(&ctx, AssetType::Headshot);
        assert_eq!(outcomes.len(), 1);
        assert!(matches!(outcomes[0], AssertionOutcome::Instrumentation(_)));
    }

    #[test]
    fn disallowed_host_is_instrumentation_error() {
        let ctx = ctx_with_headshot_url(Some("https://evil.example.com/h.png"), vec!["bad.example.com".to_string()]);
        let outcomes = check_asset_url(&ctx, AssetType::Headshot);
        assert_eq!(outcomes.len(), 1);
    }

    #[test]
    fn allowed_host_passes() {
        let ctx = ctx_with_headshot_url(Some("https://cdn.example.com/h.png"), vec!["cdn.example.com".to_string()]);
        assert!(check_asset_url(&ctx, AssetType::Headshot).is_empty());
    }
}
