// canary-preflight/src/auth_preflight.rs
// ============================================================================
// Step 7: Auth Preflight
// Description: Logs in with the resolved canary credentials and classifies
//              the returned token via `/auth/me` (spec.md §4.4 step 7).
// Purpose: Catch an expired or misconfigured canary account before any
//          generation-service invocation spends a real request.
// Dependencies: canary-config, canary-providers
// ============================================================================

use canary_config::TokenKind;
use canary_providers::AuthClient;

use crate::error::PreflightError;

/// Outcome of the auth preflight step.
#[derive(Debug, Clone)]
pub struct AuthPreflightOutcome {
    /// The access token obtained from login.
    pub access_token: String,
    /// The classified token kind.
    pub token_kind: TokenKind,
    /// The raw issuer string, if one could be parsed.
    pub issuer: Option<String>,
}

/// Logs in against `<auth_base_path>/auth/login` and classifies the
/// resulting token via `/auth/me` (spec.md §4.4 step 7).
///
/// Callers honoring `--skip-auth-preflight` (spec.md §6) should not call
/// this function at all; skipping is a driver-level decision, not this
/// function's concern.
///
/// # Errors
///
/// Returns [`PreflightError::AuthPreflightFailed`] if either the login or
/// the identity fetch fails.
pub fn run_auth_preflight(
    client: &dyn AuthClient,
    auth_base_path: &str,
    email: &str,
    password: &str,
) -> Result<AuthPreflightOutcome, PreflightError> {
    let login = client.login(auth_base_path, email, password).map_err(PreflightError::AuthPreflightFailed)?;
    let identity = client
        .fetch_identity(auth_base_path, &login.access_token)
        .map_err(PreflightError::AuthPreflightFailed)?;
    Ok(AuthPreflightOutcome { access_token: login.access_token, token_kind: identity.kind, issuer: identity.issuer })
}

#[cfg(test)]
mod tests {
    use super::*;
    use canary_providers::LoginOutcome;
    use canary_providers::ProviderError;
    use canary_providers::TokenClassification;

    struct StubAuth {
        login_fails: bool,
        identity_fails: bool,
    }

    impl AuthClient for StubAuth {
        fn detect_auth_prefix(&self) -> Result<Option<String>, ProviderError> {
            unimplemented!("not exercised by this test")
        }

        fn login(&self, _auth_base_path: &str, _email: &str, _password: &str) -> Result<LoginOutcome, ProviderError> {
            if self.login_fails {
                Err(ProviderError::Status { url: "https://api.example.com/api/v1/auth/login".to_string(), status: 401 })
            } else {
                Ok(LoginOutcome { access_token: "token-123".to_string() })
            }
        }

        fn fetch_identity(
            &self,
            _auth_base_path: &str,
            _access_token: &str,
        ) -> Result<TokenClassification, ProviderError> {
            if self.identity_fails {
                Err(ProviderError::Status { url: "https://api.example.com/api/v1/auth/me".to_string(), status: 500 })
            } else {
                Ok(TokenClassification { kind: TokenKind::SupabaseJwt, issuer: Some("https://x.supabase.co".to_string()) })
            }
        }
    }

    #[test]
    fn successful_login_and_identity_classify_token() {
        let client = StubAuth { login_fails: false, identity_fails: false };
        let outcome = run_auth_preflight(&client, "/api/v1", "canary@example.com", "hunter2").expect("must succeed");
        assert_eq!(outcome.access_token, "token-123");
        assert_eq!(outcome.token_kind, TokenKind::SupabaseJwt);
    }

    #[test]
    fn login_failure_is_reported() {
        let client = StubAuth { login_fails: true, identity_fails: false };
        let err = run_auth_preflight(&client, "/api/v1", "canary@example.com", "hunter2").expect_err("must fail");
        assert!(matches!(err, PreflightError::AuthPreflightFailed(_)));
    }

    #[test]
    fn identity_failure_is_reported() {
        let client = StubAuth { login_fails: false, identity_fails: true };
        let err = run_auth_preflight(&client, "/api/v1", "canary@example.com", "hunter2").expect_err("must fail");
        assert!(matches!(err, PreflightError::AuthPreflightFailed(_)));
    }
}
