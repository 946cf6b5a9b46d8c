// canary-core/src/lib.rs
// ============================================================================
// Module: Canary Core
// Description: Shared data model for the canary harness.
// Purpose: Give every other crate in the workspace one place to import
//          `CanaryDefinition`, `CharacterRecord`, `AttemptRecord`,
//          `RunReport` and their supporting identifier and enum types.
// Dependencies: serde, serde_json, thiserror, time
// ============================================================================

//! ## Overview
//! `canary-core` has no external collaborators and makes no network calls;
//! it exists purely to give the harness's entities (spec.md §3) one
//! canonical definition shared by `canary-canon`, `canary-config`,
//! `canary-preflight`, `canary-assert`, `canary-artifacts`, `canary-runner`
//! and `canary-cli`.

pub mod ids;
pub mod model;

pub use ids::AttemptId;
pub use ids::CanaryId;
pub use ids::CharacterId;
pub use ids::RunNonce;
pub use model::attempt::AssetType;
pub use model::attempt::AttemptRecord;
pub use model::attempt::AttemptSet;
pub use model::attempt::AttemptStatus;
pub use model::attempt::LimbValidation;
pub use model::attempt::SupportWorldFitEntry;
pub use model::attempt::TraitVisibility;
pub use model::attempt::ValidationSummary;
pub use model::character::CharacterRecord;
pub use model::character::ReferenceImage;
pub use model::character::ResolvedAsset;
pub use model::definition::CanaryDefinition;
pub use model::definition::Expectations;
pub use model::failure_code::FailureClass;
pub use model::failure_code::FailureCode;
pub use model::normalized::NormalizedCanaryInput;
pub use model::normalized::merge_free_text;
pub use model::report::AssertionError;
pub use model::report::AssetReport;
pub use model::report::PublicSnapshotReceipt;
pub use model::report::RunMode;
pub use model::report::RunReport;
pub use model::report::ValidatorFireRates;
pub use model::report::VerdictStatus;
