// canary-preflight/src/credentials.rs
// ============================================================================
// Step 4: Credential Resolution
// Description: Resolves canary-user email/password through the primary
//              `/canary/auth_*` paths, falling back to the legacy
//              `/test/user-*` paths with a deprecation warning (spec.md
//              §4.4 step 4).
// Purpose: Layer the legacy-path deprecation behavior on top of the generic
//          config resolver without duplicating its precedence logic.
// Dependencies: canary-config
// ============================================================================

use canary_config::ProvenanceSink;
use canary_config::SecretSource;
use canary_config::SecretSpec;
use canary_config::Source;
use canary_config::resolve;

use crate::error::PreflightError;

/// Sunset date communicated in the legacy-path deprecation warning (spec.md
/// §4.4 step 4: "deprecation warning with a sunset date").
pub const LEGACY_CREDENTIAL_SUNSET_DATE: &str = "2026-12-31";

/// Resolved canary-user credentials and whether the legacy path was used.
#[derive(Debug, Clone)]
pub struct ResolvedCredential {
    /// Resolved canary email.
    pub email: String,
    /// Resolved canary password.
    pub password: String,
    /// Whether either value came from a legacy `/test/user-*` path.
    pub legacy_used: bool,
}

/// Resolves the canary email and password, trying the primary
/// `<prefix>/canary/auth_email|password` paths before the legacy
/// `<prefix>/test/user-email|password` paths, and emitting a deprecation
/// warning when a legacy path is used (spec.md §4.4 step 4).
///
/// `fallback_email`/`fallback_password` thread the `--canary-email` /
/// `--canary-password` CLI flags (spec.md §6) through as the resolver's
/// last-resort fallback, the same role the CLI flags play for every other
/// config key in the layered resolver (spec.md §4.2).
///
/// # Errors
///
/// Returns `Ok(None)` when neither value resolves from any source; returns
/// [`PreflightError::Config`] only if the underlying resolver is misused
/// (it never is, since both specs here are non-required).
pub fn resolve_canary_credentials(
    param_store_prefix: &str,
    fallback_email: Option<&str>,
    fallback_password: Option<&str>,
    secret_source: &dyn SecretSource,
    sink: &dyn ProvenanceSink,
) -> Result<Option<ResolvedCredential>, PreflightError> {
    let legacy_email_path = format!("{param_store_prefix}/test/user-email");
    let legacy_password_path = format!("{param_store_prefix}/test/user-password");

    let email_spec = SecretSpec {
        name: "canary_auth_email".to_string(),
        env_var: "CANARY_AUTH_EMAIL".to_string(),
        param_paths: vec![format!("{param_store_prefix}/canary/auth_email"), legacy_email_path.clone()],
        fallback: fallback_email.map(str::to_string),
        required: false,
        secret: false,
    };
    let password_spec = SecretSpec {
        name: "canary_auth_password".to_string(),
        env_var: "CANARY_AUTH_PASSWORD".to_string(),
        param_paths: vec![format!("{param_store_prefix}/canary/auth_password"), legacy_password_path.clone()],
        fallback: fallback_password.map(str::to_string),
        required: false,
        secret: true,
    };

    let email = resolve(&email_spec, secret_source, sink)?;
    let password = resolve(&password_spec, secret_source, sink)?;

    let (Some(email), Some(password)) = (email, password) else {
        return Ok(None);
    };

    let legacy_used =
        email.source == Source::ParamStore(legacy_email_path) || password.source == Source::ParamStore(legacy_password_path);
    if legacy_used {
        sink.log(&format!(
            "canary credentials resolved from legacy /test/user-email|password paths; deprecated, sunset {LEGACY_CREDENTIAL_SUNSET_DATE}, migrate to /canary/auth_email|password"
        ));
    }

    Ok(Some(ResolvedCredential { email: email.value, password: password.value, legacy_used }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use canary_config::NullSink;
    use canary_config::StaticSecretSource;

    #[test]
    fn primary_path_resolves_without_legacy_warning() {
        let source = StaticSecretSource::new([
            ("/prefix/canary/auth_email".to_string(), "canary@example.com".to_string()),
            ("/prefix/canary/auth_password".to_string(), "hunter2".to_string()),
        ]);
        let credential = resolve_canary_credentials("/prefix", None, None, &source, &NullSink)
            .expect("must resolve")
            .expect("must be present");
        assert_eq!(credential.email, "canary@example.com");
        assert!(!credential.legacy_used);
    }

    #[test]
    fn legacy_path_is_used_and_flagged() {
        let source = StaticSecretSource::new([
            ("/prefix/test/user-email".to_string(), "legacy@example.com".to_string()),
            ("/prefix/test/user-password".to_string(), "legacy-pw".to_string()),
        ]);
        let credential = resolve_canary_credentials("/prefix", None, None, &source, &NullSink)
            .expect("must resolve")
            .expect("must be present");
        assert_eq!(credential.email, "legacy@example.com");
        assert!(credential.legacy_used);
    }

    #[test]
    fn cli_fallback_is_used_when_no_source_has_a_value() {
        let source = StaticSecretSource::default();
        let credential = resolve_canary_credentials(
            "/prefix",
            Some("cli@example.com"),
            Some("cli-pw"),
            &source,
            &NullSink,
        )
        .expect("must resolve")
        .expect("must be present");
        assert_eq!(credential.email, "cli@example.com");
    }

    #[test]
    fn nothing_resolved_returns_none() {
        let source = StaticSecretSource::default();
        let credential =
            resolve_canary_credentials("/prefix", None, None, &source, &NullSink).expect("must resolve");
        assert!(credential.is_none());
    }
}
