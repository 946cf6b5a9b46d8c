// canary-core/src/model/definition.rs
// ============================================================================
// Module: Canary Definition
// Description: Authored canary input and its expectation flags.
// Purpose: Represent one test case exactly as authored, before normalization.
// Dependencies: serde, std::collections
// ============================================================================

//! ## Overview
//! `CanaryDefinition` is the immutable authored form of one canary. It is
//! validated once at startup by `canary-canon`'s `validate_canary_batch` and
//! never mutated afterward; `NormalizedCanaryInput` (see [`crate::model::normalized`])
//! is derived from it per invocation.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::ids::CanaryId;

/// Boolean expectation flags dispatched on by the assertion kernel.
///
/// Each flag is a tag, not a free-form key: the kernel checks for the tag's
/// presence and dispatches to the matching check, never by probing for
/// arbitrary keys in the authored record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expectations {
    /// Bodyshot trace must confirm `limbs.limb_difference_confirmed`.
    #[serde(default)]
    pub require_limb_difference: bool,
    /// Bodyshot `traits_visible` must not report an invisible wheelchair.
    #[serde(default)]
    pub require_wheelchair_presence: bool,
    /// Bodyshot trace must confirm `species_anatomy_confirmed`.
    #[serde(default)]
    pub require_species_truthiness: bool,
    /// Bodyshot `support_world_fit` must not contain a `world_fit: false` entry
    /// without corresponding remediation evidence.
    #[serde(default)]
    pub require_support_world_fit: bool,
}

/// Authored input describing one canary test case.
///
/// Invariants (enforced by `canary-canon::validate_canary_batch`, not by this
/// type itself):
/// - Every enumerated field resolves canonically.
/// - `ethnicities` is only permitted when `species` resolves to `human` or
///   `superhero`.
/// - Every key in `trait_user_descriptions` appears in `inclusivity_traits`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanaryDefinition {
    /// Stable identifier for this canary, unique within a run pool.
    pub id: CanaryId,
    /// Human-readable display name.
    pub display_name: String,
    /// Character age in whole years.
    pub age: i64,
    /// Optional authored age bucket token (resolved canonically if present).
    pub age_bucket: Option<String>,
    /// Authored species token (resolved canonically).
    pub species: String,
    /// Optional free-text species descriptor, merged into `appearance` on
    /// normalization.
    pub species_descriptor: Option<String>,
    /// Free-text appearance description.
    #[serde(default)]
    pub appearance: String,
    /// Free-text personality description.
    #[serde(default)]
    pub personality: String,
    /// Free-text "about them" description, merged into `personality` on
    /// normalization.
    pub about_them: Option<String>,
    /// Authored personality trait tokens (each resolved canonically).
    #[serde(default)]
    pub personality_traits: Vec<String>,
    /// Authored ethnicity tokens (each resolved canonically); only valid for
    /// `species` in `{human, superhero}`.
    #[serde(default)]
    pub ethnicities: Vec<String>,
    /// Authored inclusivity trait tokens (each resolved canonically).
    #[serde(default)]
    pub inclusivity_traits: Vec<String>,
    /// Per-trait free-text user descriptions, keyed by inclusivity trait id.
    #[serde(default)]
    pub trait_user_descriptions: BTreeMap<String, String>,
    /// Authored character spoken language token.
    pub character_spoken_language: Option<String>,
    /// Authored reader language token.
    pub reader_language: Option<String>,
    /// Authored gender token.
    pub gender: Option<String>,
    /// Assertion-kernel expectation flags for this canary.
    #[serde(default)]
    pub expectations: Expectations,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_minimal_canary() {
        let json = serde_json::json!({
            "id": "canary-1",
            "displayName": "Minimal Canary",
            "age": 9,
            "species": "human",
        });
        let def: CanaryDefinition = serde_json::from_value(json).expect("valid minimal canary");
        assert_eq!(def.id.as_str(), "canary-1");
        assert_eq!(def.age, 9);
        assert!(def.ethnicities.is_empty());
        assert!(!def.expectations.require_limb_difference);
    }
}
