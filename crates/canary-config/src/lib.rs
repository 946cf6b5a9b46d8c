// canary-config/src/lib.rs
// ============================================================================
// Module: Canary Config
// Description: Config Resolver, Environment Inferrer, and production
//              guardrails (spec.md §4.2, §4.3).
// Purpose: Resolve every secret/config value from env → parameter-store →
//          fallback with provenance, and gate production access before any
//          canary invocation runs.
// Dependencies: canary-core, thiserror
// ============================================================================

//! ## Overview
//! `canary-config` depends only on `canary-core`; the parameter store
//! itself is a pluggable [`secret::SecretSource`] supplied by
//! `canary-providers` at the call site, keeping this crate's dependency
//! graph free of HTTP concerns (spec.md §1 treats the parameter store as an
//! external collaborator).

pub mod env;
pub mod run_config;
pub mod secret;

pub use env::Environment;
pub use env::GuardrailError;
pub use env::GuardrailFlags;
pub use env::GuardrailWarning;
pub use env::enforce_guardrails;
pub use env::infer_env;
pub use env::is_production_api;
pub use run_config::RunConfig;
pub use run_config::TokenKind;
pub use secret::ConfigError;
pub use secret::NullSink;
pub use secret::ProvenanceSink;
pub use secret::Resolved;
pub use secret::SecretSource;
pub use secret::SecretSpec;
pub use secret::Source;
pub use secret::StaticSecretSource;
pub use secret::persist_if_requested;
pub use secret::resolve;
pub use secret::resolve_required;
