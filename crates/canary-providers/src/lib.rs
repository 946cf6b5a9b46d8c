// canary-providers/src/lib.rs
// ============================================================================
// Module: Canary Providers
// Description: HTTP-backed implementations of every external collaborator
//              (spec.md §1): generation service, state store, trace store,
//              public snapshot endpoint, auth service, admin service,
//              readiness probe, and parameter store.
// Purpose: Keep every network call behind a trait so `canary-preflight` and
//          `canary-runner` can be exercised against in-memory test doubles.
// Dependencies: canary-config, canary-core, reqwest, serde, serde_json,
//               thiserror
// ============================================================================

pub mod admin;
pub mod auth;
pub mod error;
pub mod generation;
pub mod param_store;
pub mod readiness;
pub mod snapshot;
pub mod state_store;
pub mod trace_store;

pub use admin::AdminClient;
pub use admin::HttpAdminClient;
pub use auth::AuthClient;
pub use auth::HttpAuthClient;
pub use auth::LoginOutcome;
pub use auth::TokenClassification;
pub use auth::classify_token;
pub use error::ProviderError;
pub use generation::GenerationServiceClient;
pub use generation::HttpGenerationServiceClient;
pub use generation::ImageEntry;
pub use generation::InvocationResponse;
pub use generation::RemediationRequest;
pub use param_store::HttpParamStoreClient;
pub use readiness::HttpReadinessClient;
pub use readiness::ReadinessClient;
pub use readiness::ReadyOutcome;
pub use snapshot::HttpSnapshotClient;
pub use snapshot::SnapshotClient;
pub use snapshot::SnapshotFetch;
pub use state_store::ColumnProbe;
pub use state_store::HttpStateStoreClient;
pub use state_store::StateStoreClient;
pub use trace_store::HttpTraceStoreClient;
pub use trace_store::TraceStoreClient;
