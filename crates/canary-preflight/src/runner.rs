// canary-preflight/src/runner.rs
// ============================================================================
// Preflight Runner
// Description: Orchestrates all seven preflight steps in order, short-
//              circuiting on the first hard-gate failure (spec.md §4.4).
// Purpose: Give `canary-cli` one call that either returns a fully resolved
//          `RunConfig` or a `PreflightError` naming exactly which gate
//          tripped.
// Dependencies: canary-config, canary-core, canary-providers
// ============================================================================

use std::path::Path;

use canary_config::Environment;
use canary_config::GuardrailFlags;
use canary_config::ProvenanceSink;
use canary_config::SecretSource;
use canary_config::enforce_guardrails;
use canary_providers::AdminClient;
use canary_providers::AuthClient;
use canary_providers::ReadinessClient;
use canary_providers::StateStoreClient;

use crate::auth_prefix::detect_auth_prefix;
use crate::auth_preflight::AuthPreflightOutcome;
use crate::auth_preflight::run_auth_preflight;
use crate::connectivity::probe_connectivity;
use crate::credentials::ResolvedCredential;
use crate::credentials::resolve_canary_credentials;
use crate::ensure_user::ensure_canary_user;
use crate::ensure_user::should_ensure_user;
use crate::error::PreflightError;
use crate::schema_parity::check_schema_parity;
use crate::secret_scan::scan_recovery_directory;

/// Everything the runner needs that isn't a plain value: the external
/// collaborators, supplied as trait objects so the caller controls whether
/// a real `Http*Client` or an in-memory test double is used.
pub struct PreflightCollaborators<'a> {
    /// Readiness probe client (step 2).
    pub readiness: &'a dyn ReadinessClient,
    /// Auth-service client (steps 3, 7).
    pub auth: &'a dyn AuthClient,
    /// Admin-service client (step 5).
    pub admin: &'a dyn AdminClient,
    /// State-store client (step 6).
    pub state_store: &'a dyn StateStoreClient,
    /// Parameter-store-backed secret source (step 4).
    pub secret_source: &'a dyn SecretSource,
    /// Provenance sink every step logs through.
    pub sink: &'a dyn ProvenanceSink,
}

/// CLI-level inputs the runner consults but does not itself parse
/// (spec.md §6).
#[derive(Debug, Clone)]
pub struct PreflightInputs<'a> {
    /// API base URL of the generation service.
    pub api_base_url: &'a str,
    /// Parameter-store prefix.
    pub param_store_prefix: &'a str,
    /// Recovery directory to scan in step 1.
    pub recovery_dir: &'a Path,
    /// Resolved deployment environment (from `--env` or inferred).
    pub environment: Environment,
    /// Invocation target identifier.
    pub invocation_target: &'a str,
    /// Production/ensure-user guardrail flags.
    pub guardrail_flags: GuardrailFlags,
    /// `--canary-email` CLI override.
    pub canary_email_flag: Option<&'a str>,
    /// `--canary-password` CLI override.
    pub canary_password_flag: Option<&'a str>,
    /// `--skip-auth-preflight` was passed.
    pub skip_auth_preflight: bool,
    /// RNG bytes used only if a canary password must be generated.
    pub generated_password_seed: [u8; 24],
}

/// Everything preflight resolved, handed to the canary runner.
#[derive(Debug, Clone)]
pub struct PreflightReport {
    /// The discovered (or defaulted) auth base path.
    pub auth_base_path: String,
    /// Whether the auth base path was defaulted rather than discovered.
    pub auth_prefix_defaulted: bool,
    /// The resolved canary credentials.
    pub credentials: ResolvedCredential,
    /// Whether ensure-canary-user ran.
    pub ensure_user_ran: bool,
    /// The auth-preflight outcome, unless `--skip-auth-preflight` was set.
    pub auth_preflight: Option<AuthPreflightOutcome>,
}

/// Runs every preflight step in order (spec.md §4.4), returning on the
/// first hard-gate failure.
///
/// # Errors
///
/// Returns the [`PreflightError`] naming the first gate that failed.
pub fn run_preflight(
    collaborators: &PreflightCollaborators<'_>,
    inputs: &PreflightInputs<'_>,
) -> Result<PreflightReport, PreflightError> {
    collaborators.sink.log("preflight guardrails: checking production access");
    if let Some(warning) = enforce_guardrails(
        inputs.api_base_url,
        inputs.environment,
        inputs.invocation_target,
        inputs.guardrail_flags,
    )? {
        collaborators.sink.log(&format!("preflight guardrails: {}", warning.0));
    } else {
        collaborators.sink.log("preflight guardrails: passed");
    }

    collaborators.sink.log("preflight step 1: scanning recovery directory for leaked secrets");
    scan_recovery_directory(inputs.recovery_dir)?;
    collaborators.sink.log("preflight step 1: passed");

    collaborators.sink.log("preflight step 2: probing connectivity");
    probe_connectivity(collaborators.readiness, inputs.api_base_url)?;
    collaborators.sink.log("preflight step 2: passed");

    collaborators.sink.log("preflight step 3: detecting auth prefix");
    let auth_prefix = detect_auth_prefix(collaborators.auth, collaborators.sink)?;
    collaborators.sink.log(&format!("preflight step 3: resolved auth prefix {}", auth_prefix.prefix));

    collaborators.sink.log("preflight step 4: resolving canary credentials");
    let resolved_credentials = resolve_canary_credentials(
        inputs.param_store_prefix,
        inputs.canary_email_flag,
        inputs.canary_password_flag,
        collaborators.secret_source,
        collaborators.sink,
    )?;
    collaborators.sink.log(&format!(
        "preflight step 4: credentials {}",
        if resolved_credentials.is_some() { "resolved" } else { "unresolved" }
    ));

    collaborators.sink.log("preflight step 5: evaluating ensure-canary-user eligibility");
    let (credentials, ensure_user_ran) = if should_ensure_user(
        inputs.environment,
        inputs.guardrail_flags,
        resolved_credentials.as_ref(),
    ) {
        let email = resolved_credentials
            .as_ref()
            .map(|credential| credential.email.clone())
            .or_else(|| inputs.canary_email_flag.map(str::to_string))
            .unwrap_or_else(|| "canary@example.com".to_string());
        let password_seed = resolved_credentials.as_ref().map(|credential| credential.password.clone());
        let credential = ensure_canary_user(
            collaborators.admin,
            &email,
            password_seed.as_deref(),
            &inputs.generated_password_seed,
        )?;
        collaborators.sink.log("preflight step 5: ensure-canary-user ran");
        (credential, true)
    } else {
        collaborators.sink.log("preflight step 5: ensure-canary-user skipped");
        let Some(credential) = resolved_credentials else {
            return Err(PreflightError::CredentialsUnresolved);
        };
        (credential, false)
    };

    collaborators.sink.log("preflight step 6: checking characters table schema parity");
    check_schema_parity(collaborators.state_store)?;
    collaborators.sink.log("preflight step 6: passed");

    let auth_preflight = if inputs.skip_auth_preflight {
        collaborators.sink.log("preflight step 7: skipped via --skip-auth-preflight");
        None
    } else {
        collaborators.sink.log("preflight step 7: logging in and classifying token");
        let outcome =
            run_auth_preflight(collaborators.auth, &auth_prefix.prefix, &credentials.email, &credentials.password)?;
        collaborators.sink.log(&format!("preflight step 7: token classified as {:?}", outcome.token_kind));
        Some(outcome)
    };

    Ok(PreflightReport {
        auth_base_path: auth_prefix.prefix,
        auth_prefix_defaulted: auth_prefix.defaulted,
        credentials,
        ensure_user_ran,
        auth_preflight,
    })
}
