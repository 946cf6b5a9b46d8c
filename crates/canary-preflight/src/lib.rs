// canary-preflight/src/lib.rs
// ============================================================================
// Module: Canary Preflight
// Description: The seven-step preflight gate that runs before any canary
//              invocation (spec.md §4.4).
// Purpose: Give `canary-cli` one `run_preflight` entry point that resolves
//          a `RunConfig`-ready set of facts or fails fast with an
//          actionable error.
// Dependencies: canary-config, canary-core, canary-providers, thiserror
// ============================================================================

//! ## Overview
//! Each step lives in its own module and is independently unit-tested
//! against an in-memory collaborator double; [`runner::run_preflight`] is
//! the only function that sequences them, so a reviewer can read any one
//! step's semantics without wading through the orchestration.

pub mod auth_prefix;
pub mod auth_preflight;
pub mod connectivity;
pub mod credentials;
pub mod ensure_user;
pub mod error;
pub mod runner;
pub mod schema_parity;
pub mod secret_scan;

pub use auth_prefix::AuthPrefix;
pub use auth_prefix::detect_auth_prefix;
pub use auth_preflight::AuthPreflightOutcome;
pub use auth_preflight::run_auth_preflight;
pub use connectivity::probe_connectivity;
pub use credentials::LEGACY_CREDENTIAL_SUNSET_DATE;
pub use credentials::ResolvedCredential;
pub use credentials::resolve_canary_credentials;
pub use ensure_user::ensure_canary_user;
pub use ensure_user::should_ensure_user;
pub use error::PreflightError;
pub use runner::PreflightCollaborators;
pub use runner::PreflightInputs;
pub use runner::PreflightReport;
pub use runner::run_preflight;
pub use schema_parity::check_schema_parity;
pub use schema_parity::quote_identifier;
pub use secret_scan::scan_recovery_directory;
