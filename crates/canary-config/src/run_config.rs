// canary-config/src/run_config.rs
// ============================================================================
// Module: Run Config
// Description: The resolved environment record produced by preflight.
// Purpose: Carry every secret/config value, once resolved, as one record
//          that is mutable only during preflight and frozen thereafter
//          (spec.md §3).
// Dependencies: canary-core, canary-config::env
// ============================================================================

//! ## Overview
//! `RunConfig` starts empty and is filled in field-by-field during
//! preflight (auth base path discovery, credential resolution, auth token
//! acquisition). `canary-preflight` owns the mutation; every other crate
//! only ever reads a `&RunConfig`.

use canary_core::RunMode;
use canary_core::RunNonce;

use crate::env::Environment;

/// Authentication token metadata (spec.md §4.4 step 7).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Issuer name contained `supabase`.
    SupabaseJwt,
    /// Any other issuer.
    CustomJwt,
}

/// The resolved environment for one run (spec.md §3).
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// API base URL of the generation service.
    pub api_base_url: String,
    /// Discovered auth base path (`/api/v1` or `/v1`).
    pub auth_base_path: String,
    /// Public snapshot base path.
    pub snapshot_base_path: String,
    /// Parameter-store prefix.
    pub param_store_prefix: String,
    /// Inferred or explicitly selected environment tag.
    pub environment: Environment,
    /// State-store base URL.
    pub state_store_url: String,
    /// State-store service credential.
    pub state_store_credential: String,
    /// Invocation target identifier (e.g. a deployment/run label).
    pub invocation_target: String,
    /// Provenance of the invocation target identifier.
    pub invocation_target_source: String,
    /// Test user id used by the canary runs.
    pub test_user_id: Option<String>,
    /// Test library id used by the canary runs.
    pub test_library_id: Option<String>,
    /// Allowed public asset hosts.
    pub allowed_asset_hosts: Vec<String>,
    /// Nonce shared by every canary in this run.
    pub run_nonce: RunNonce,
    /// Execution mode.
    pub mode: RunMode,
    /// Resolved auth access token, once acquired.
    pub access_token: Option<String>,
    /// Resolved auth token kind, once classified.
    pub token_kind: Option<TokenKind>,
    /// Raw issuer string extracted from the access token, once classified.
    pub token_issuer: Option<String>,
}

impl RunConfig {
    /// Returns whether `--force-bad-host` narrowed the allowlist down to a
    /// single synthetic host (spec.md §8, scenario 3).
    #[must_use]
    pub fn allowlist_forced_bad(&self) -> bool {
        self.allowed_asset_hosts.len() == 1 && self.allowed_asset_hosts[0] == "bad.example.com"
    }
}
