// canary-preflight/src/ensure_user.rs
// ============================================================================
// Step 5: Ensure Canary User
// Description: Optionally provisions the canary user through the admin
//              service when credentials are missing or `--ensure-canary-user`
//              was explicitly requested (spec.md §4.4 step 5, §4.3).
// Purpose: Let staging runs self-heal a missing canary account while keeping
//          production provisioning behind both guardrail flags.
// Dependencies: canary-config, canary-providers
// ============================================================================

use canary_config::Environment;
use canary_config::GuardrailFlags;
use canary_providers::AdminClient;

use crate::credentials::ResolvedCredential;
use crate::error::PreflightError;

/// Generated password length for a freshly provisioned canary user.
const GENERATED_PASSWORD_LEN: usize = 24;

/// Whether step 5 should run at all, per spec.md §4.4 step 5: explicit
/// request, or staging with no resolved credentials (self-heal).
#[must_use]
pub fn should_ensure_user(
    environment: Environment,
    flags: GuardrailFlags,
    credentials: Option<&ResolvedCredential>,
) -> bool {
    if flags.ensure_canary_user {
        return true;
    }
    environment == Environment::Staging && credentials.is_none()
}

/// Provisions the canary user via the admin service and returns the
/// resulting credentials, generating a password when the caller didn't
/// supply one (spec.md §4.4 step 5).
///
/// Callers must have already rejected production ensure-user requests that
/// lack both `--confirm-production` and `--allow-prod-ensure-user` via
/// [`canary_config::enforce_guardrails`]; this function performs no
/// guardrail check of its own.
///
/// # Errors
///
/// Returns [`PreflightError::Provider`] if the admin service call fails.
pub fn ensure_canary_user(
    client: &dyn AdminClient,
    email: &str,
    password_seed: Option<&str>,
    rng_bytes: &[u8; GENERATED_PASSWORD_LEN],
) -> Result<ResolvedCredential, PreflightError> {
    let password = match password_seed {
        Some(existing) => existing.to_string(),
        None => generate_password(rng_bytes),
    };
    client.ensure_canary_user(email, &password)?;
    Ok(ResolvedCredential { email: email.to_string(), password, legacy_used: false })
}

fn generate_password(rng_bytes: &[u8; GENERATED_PASSWORD_LEN]) -> String {
    const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz23456789";
    rng_bytes.iter().map(|byte| ALPHABET[(*byte as usize) % ALPHABET.len()] as char).collect()
}
