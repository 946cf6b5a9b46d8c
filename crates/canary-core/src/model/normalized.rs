// canary-core/src/model/normalized.rs
// ============================================================================
// Module: Normalized Canary Input
// Description: Canonical form of a canary, derived immediately before
//              invocation.
// Purpose: Carry resolved canonical keys and merged free-text fields into the
//          canary runner, rather than re-deriving them per step.
// Dependencies: serde, std::collections
// ============================================================================

//! ## Overview
//! `NormalizedCanaryInput` is created once per canary, immediately before the
//! generation service is invoked. `species` is replaced by its canonical key;
//! `appearance` is `appearance + species_descriptor`; `personality` is
//! `personality + about_them`; defaults are applied so downstream code never
//! has to special-case `Option`s that canonicalization already resolved.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::ids::CanaryId;
use crate::model::definition::Expectations;

/// Canonicalized, merged form of a [`crate::model::definition::CanaryDefinition`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedCanaryInput {
    /// Canary identifier, carried through unchanged.
    pub id: CanaryId,
    /// Display name, carried through unchanged.
    pub display_name: String,
    /// Character age in whole years.
    pub age: i64,
    /// Canonical age bucket key, if resolved.
    pub age_bucket: Option<String>,
    /// Canonical species key.
    pub species: String,
    /// `appearance` merged with `species_descriptor`.
    pub appearance: String,
    /// `personality` merged with `about_them`.
    pub personality: String,
    /// Canonical personality trait keys.
    pub personality_traits: Vec<String>,
    /// Canonical ethnicity keys.
    pub ethnicities: Vec<String>,
    /// Canonical inclusivity trait keys.
    pub inclusivity_traits: Vec<String>,
    /// Per-trait free-text user descriptions, keyed by canonical trait id.
    pub trait_user_descriptions: BTreeMap<String, String>,
    /// Canonical character spoken language key, if resolved.
    pub character_spoken_language: Option<String>,
    /// Canonical reader language key, if resolved.
    pub reader_language: Option<String>,
    /// Canonical gender key, if resolved.
    pub gender: Option<String>,
    /// Expectation flags, copied from the authored definition unchanged.
    pub expectations: Expectations,
}

/// Merges two optional free-text fields with a single space, skipping empty
/// or absent parts.
#[must_use]
pub fn merge_free_text(primary: &str, secondary: Option<&str>) -> String {
    let secondary = secondary.unwrap_or("").trim();
    let primary = primary.trim();
    match (primary.is_empty(), secondary.is_empty()) {
        (true, true) => String::new(),
        (true, false) => secondary.to_string(),
        (false, true) => primary.to_string(),
        (false, false) => format!("{primary} {secondary}"),
    }
}
