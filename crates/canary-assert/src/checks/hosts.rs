// canary-assert/src/checks/hosts.rs
// ============================================================================
// Check: Public Asset Hosts Configured
// Description: `publicAssetHosts` is non-empty (spec.md §4.6).
// ============================================================================

use canary_core::AssertionError;

use crate::context::AssertionContext;
use crate::outcome::AssertionOutcome;

/// Checks that the allowlist is non-empty; an empty allowlist means no URL
/// could ever pass, which is itself an instrumentation gap.
#[must_use]
pub fn check_public_asset_hosts_nonempty(ctx: &AssertionContext) -> Vec<AssertionOutcome> {
    if ctx.allowed_asset_hosts.is_empty() {
        vec![AssertionOutcome::Instrumentation(AssertionError::new(
            "public_asset_hosts_empty",
            "publicAssetHosts is empty",
        ))]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::AssetContext;
    use crate::context::StrictMode;

    fn base_ctx(hosts: Vec<String>) -> AssertionContext {
        AssertionContext {
            allowed_asset_hosts: hosts,
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
    fn empty_allowlist_is_instrumentation_error() {
        let ctx = base_ctx(Vec::new());
        assert_eq!(check_public_asset_hosts_nonempty(&ctx).len(), 1);
    }

    #[test]
    fn nonempty_allowlist_passes() {
        let ctx = base_ctx(vec!["cdn.example.com".to_string()]);
        assert!(check_public_asset_hosts_nonempty(&ctx).is_empty());
    }
}
