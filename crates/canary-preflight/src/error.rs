// canary-preflight/src/error.rs
// ============================================================================
// Module: Preflight Errors
// Description: One error type spanning every hard gate in the preflight
//              sequence (spec.md §4.4, §7 "Preflight errors").
// Purpose: Let `PreflightRunner::run` short-circuit on the first failure
//          while still telling the driver exactly which gate tripped.
// Dependencies: canary-config, canary-providers, thiserror
// ============================================================================

use canary_config::ConfigError;
use canary_config::GuardrailError;
use canary_providers::ProviderError;
use thiserror::Error;

/// A hard-gate failure from the preflight sequence.
#[derive(Debug, Error)]
pub enum PreflightError {
    /// Step 1: the recovery directory scan found a secret-shaped string in
    /// a JSON file.
    #[error("secret scan found suspicious content in: {}", .paths.join(", "))]
    SecretsFound {
        /// Every offending file path, in walk order.
        paths: Vec<String>,
    },
    /// Step 2: `<apiBase>/ready` returned 404.
    #[error("ready endpoint not found at {url}; try: {}", .actions.join("; "))]
    ReadyEndpointNotFound {
        /// The URL that was requested.
        url: String,
        /// Suggested operator actions.
        actions: Vec<String>,
    },
    /// Step 2: `<apiBase>/ready` returned a 5xx status.
    #[error("ready endpoint at {url} returned a server error")]
    ReadyEndpointServerError {
        /// The URL that was requested.
        url: String,
    },
    /// Step 2: the ready probe failed to resolve DNS.
    #[error("DNS resolution failed probing {url}; try: {}", .actions.join("; "))]
    DnsResolutionFailed {
        /// The URL that was requested.
        url: String,
        /// Suggested operator actions.
        actions: Vec<String>,
    },
    /// Step 5: ensure-user was requested against production without both
    /// required flags.
    #[error("ensure-canary-user against production requires both --confirm-production and --allow-prod-ensure-user")]
    EnsureUserRequiresBothProductionFlags,
    /// Step 5/4: no canary credentials could be resolved and ensure-user
    /// was not eligible to run.
    #[error("no canary credentials resolved and ensure-canary-user did not run")]
    CredentialsUnresolved,
    /// Step 6: one or more required `characters` columns are missing.
    #[error("schema parity failed: missing columns {}\n{remediation_sql}", .missing.join(", "))]
    SchemaParityFailed {
        /// Every missing column name.
        missing: Vec<String>,
        /// The `ALTER TABLE` remediation block to hand the operator.
        remediation_sql: String,
    },
    /// Step 7: login or `/auth/me` failed.
    #[error("auth preflight failed: {0}")]
    AuthPreflightFailed(#[source] ProviderError),
    /// A config-resolution failure propagated from `canary-config`.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A guardrail violation propagated from `canary-config`.
    #[error(transparent)]
    Guardrail(#[from] GuardrailError),
    /// A provider-level transport/decode/status failure not covered by a
    /// more specific variant above.
    #[error(transparent)]
    Provider(#[from] ProviderError),
    /// An invariant the preflight sequence assumes was violated; this
    /// indicates a bug in the sequence itself, not an external failure.
    #[error("preflight internal error: {0}")]
    Internal(String),
}
