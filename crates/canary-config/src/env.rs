// canary-config/src/env.rs
// ============================================================================
// Module: Environment Inferrer & Production Guardrails
// Description: `inferEnv`, `isProductionApi`, and the four production
//              guardrails (spec.md §4.3).
// Purpose: Infer staging/production from an API host and enforce the
//          guardrails before any canary invocation runs.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Guardrails are pure functions over already-resolved inputs (API base
//! URL, resolved environment, CLI flags); they have no I/O of their own so
//! they stay trivially unit-testable.

use thiserror::Error;

/// Inferred deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Staging/test deployment.
    Staging,
    /// Production deployment.
    Production,
}

impl Environment {
    /// Parses a `--env` CLI value.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "staging" => Some(Self::Staging),
            "production" => Some(Self::Production),
            _ => None,
        }
    }
}

const STAGING_HOSTS: &[&str] = &["staging-api.example.com", "staging.example.com"];
const PRODUCTION_HOSTS: &[&str] = &["api.example.com", "app.example.com"];

/// Infers staging/production from an API base URL (spec.md §4.3).
///
/// `staging` when the host is in the staging list or the host/path
/// contains `staging`; `production` when the host is in the production
/// list; `production` otherwise (fail toward the safer, more-guarded
/// default).
#[must_use]
pub fn infer_env(api_base_url: &str) -> Environment {
    let lower = api_base_url.to_lowercase();
    let host = host_of(&lower);
    if STAGING_HOSTS.contains(&host.as_str()) || lower.contains("staging") {
        return Environment::Staging;
    }
    if PRODUCTION_HOSTS.contains(&host.as_str()) {
        return Environment::Production;
    }
    Environment::Production
}

/// Returns whether an API base URL's host is a known production host
/// (spec.md §4.3).
#[must_use]
pub fn is_production_api(api_base_url: &str) -> bool {
    let lower = api_base_url.to_lowercase();
    PRODUCTION_HOSTS.contains(&host_of(&lower).as_str())
}

fn host_of(url: &str) -> String {
    let without_scheme = url.split("://").next_back().unwrap_or(url);
    let host_and_port = without_scheme.split('/').next().unwrap_or(without_scheme);
    host_and_port.split(':').next().unwrap_or(host_and_port).to_string()
}

/// CLI-level flags the guardrails consult.
#[derive(Debug, Clone, Copy, Default)]
pub struct GuardrailFlags {
    /// `--confirm-production` was passed.
    pub confirm_production: bool,
    /// `--ensure-canary-user` was passed.
    pub ensure_canary_user: bool,
    /// `--allow-prod-ensure-user` was passed.
    pub allow_prod_ensure_user: bool,
}

/// A guardrail violation (spec.md §4.3, §7 "Preflight errors").
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GuardrailError {
    /// API host is production but `--confirm-production` is absent.
    #[error(
        "API host is production but --confirm-production was not passed; refusing to run against production without explicit confirmation"
    )]
    ProductionRequiresConfirmation,
    /// Production ensure-user was requested without both required flags.
    #[error(
        "ensure-canary-user against production requires both --confirm-production and --allow-prod-ensure-user"
    )]
    ProductionEnsureUserRequiresBothFlags,
    /// Resolved environment isn't production but the invocation target
    /// identifier names production.
    #[error(
        "resolved environment is not production but invocation target \"{target}\" names production"
    )]
    TargetNamesProductionOutsideProduction {
        /// The offending invocation-target identifier.
        target: String,
    },
}

/// A non-fatal guardrail warning (spec.md §4.3, fourth bullet).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardrailWarning(pub String);

/// Runs all four production guardrails (spec.md §4.3), returning the first
/// violation encountered.
///
/// # Errors
///
/// Returns [`GuardrailError`] naming the first violated guardrail.
pub fn enforce_guardrails(
    api_base_url: &str,
    resolved_env: Environment,
    invocation_target: &str,
    flags: GuardrailFlags,
) -> Result<Option<GuardrailWarning>, GuardrailError> {
    if is_production_api(api_base_url) && !flags.confirm_production {
        return Err(GuardrailError::ProductionRequiresConfirmation);
    }

    if resolved_env == Environment::Production
        && flags.ensure_canary_user
        && !(flags.confirm_production && flags.allow_prod_ensure_user)
    {
        return Err(GuardrailError::ProductionEnsureUserRequiresBothFlags);
    }

    if resolved_env != Environment::Production && invocation_target.to_lowercase().contains("production")
    {
        return Err(GuardrailError::TargetNamesProductionOutsideProduction {
            target: invocation_target.to_string(),
        });
    }

    if resolved_env == Environment::Staging && is_production_api(api_base_url) {
        return Ok(Some(GuardrailWarning(format!(
            "resolved environment is staging but API host \"{api_base_url}\" looks production"
        ))));
    }

    Ok(None)
}
