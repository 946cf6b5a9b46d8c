// canary-preflight/src/auth_prefix.rs
// ============================================================================
// Step 3: Auth-Prefix Detection
// Description: Probes `/api/v1/auth/login` then `/v1/auth/login`, defaulting
//              to `/api/v1` with a warning if both 404 (spec.md §4.4 step 3).
// Purpose: Resolve the one auth base path every later step depends on.
// Dependencies: canary-config, canary-providers
// ============================================================================

use canary_config::ProvenanceSink;
use canary_providers::AuthClient;

use crate::error::PreflightError;

const DEFAULT_AUTH_BASE_PATH: &str = "/api/v1";

/// Outcome of auth-prefix detection (spec.md §4.4 step 3).
#[derive(Debug, Clone)]
pub struct AuthPrefix {
    /// The discovered (or defaulted) prefix.
    pub prefix: String,
    /// Whether neither candidate prefix answered and the default was used.
    pub defaulted: bool,
}

/// Detects the auth service's base path, logging a warning and defaulting
/// to `/api/v1` if both candidates 404 (spec.md §4.4 step 3).
///
/// # Errors
///
/// Returns [`PreflightError::Provider`] on transport failure of either
/// probe.
pub fn detect_auth_prefix(client: &dyn AuthClient, sink: &dyn ProvenanceSink) -> Result<AuthPrefix, PreflightError> {
    match client.detect_auth_prefix()? {
        Some(prefix) => Ok(AuthPrefix { prefix, defaulted: false }),
        None => {
            sink.log("auth-prefix detection: both /api/v1 and /v1 returned 404; defaulting to /api/v1");
            Ok(AuthPrefix { prefix: DEFAULT_AUTH_BASE_PATH.to_string(), defaulted: true })
        }
    }
}
