// canary-core/src/model/character.rs
// ============================================================================
// Module: Character Record
// Description: State-store row for a generated character.
// Purpose: Represent the character record exactly as fetched, including the
//          `reference_images` authoritative-override shape.
// Dependencies: serde, std::collections
// ============================================================================

//! ## Overview
//! When both `reference_images` and the legacy top-level URL/hash fields are
//! present, the `reference_images` entries are authoritative. [`CharacterRecord::headshot`]
//! and [`CharacterRecord::bodyshot`] encode that precedence so callers never
//! have to re-derive it.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::ids::CharacterId;
use crate::model::attempt::AssetType;

/// One entry of a character's `reference_images` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceImage {
    /// Asset type this reference image belongs to.
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    /// Asset URL.
    pub url: String,
    /// Trace URL for this asset.
    pub trace_url: Option<String>,
    /// Prompt hash for this asset.
    pub prompt_hash: Option<String>,
    /// Originating provider request id, when known.
    pub openai_request_id: Option<String>,
}

/// Resolved per-asset fields, after `reference_images` precedence is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedAsset {
    /// Resolved asset URL, if any.
    pub url: Option<String>,
    /// Resolved trace URL, if any.
    pub trace_url: Option<String>,
    /// Resolved prompt hash, if any.
    pub prompt_hash: Option<String>,
}

/// The state-store row for a generated character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterRecord {
    /// State-store character id.
    pub id: CharacterId,
    /// Character name.
    pub name: String,
    /// Canonical species key.
    pub species: String,
    /// Free-text species descriptor as persisted.
    pub species_descriptor: Option<String>,
    /// Canonicalized trait map as persisted.
    #[serde(default)]
    pub traits: BTreeMap<String, String>,
    /// Top-level headshot URL (may be superseded by `reference_images`).
    pub headshot_url: Option<String>,
    /// Top-level bodyshot URL (may be superseded by `reference_images`).
    pub bodyshot_url: Option<String>,
    /// Top-level headshot trace URL (may be superseded by `reference_images`).
    pub headshot_trace_url: Option<String>,
    /// Top-level bodyshot trace URL (may be superseded by `reference_images`).
    pub bodyshot_trace_url: Option<String>,
    /// Top-level headshot prompt hash (may be superseded by `reference_images`).
    pub headshot_prompt_hash: Option<String>,
    /// Top-level bodyshot prompt hash (may be superseded by `reference_images`).
    pub bodyshot_prompt_hash: Option<String>,
    /// Global style hash shared by both assets.
    pub global_style_hash: Option<String>,
    /// Headshot generation status.
    pub headshot_status: Option<String>,
    /// Bodyshot generation status.
    pub bodyshot_status: Option<String>,
    /// Overall character lifecycle state (e.g. `ready`, `needs_retry`).
    pub character_state: Option<String>,
    /// Generation start timestamp (ISO 8601).
    pub generation_started_at: Option<String>,
    /// Generation completion timestamp (ISO 8601).
    pub generation_completed_at: Option<String>,
    /// Inclusivity traits that were actually applied.
    #[serde(default)]
    pub applied_inclusivity_traits: Vec<String>,
    /// Inclusivity traits that were excluded during generation.
    #[serde(default)]
    pub excluded_inclusivity_traits: Vec<String>,
    /// Image model identifier used for generation.
    pub image_model: Option<String>,
    /// Current headshot attempt id.
    pub current_headshot_attempt_id: Option<String>,
    /// Last known-good headshot attempt id.
    pub last_good_headshot_attempt_id: Option<String>,
    /// Current bodyshot attempt id.
    pub current_bodyshot_attempt_id: Option<String>,
    /// Last known-good bodyshot attempt id.
    pub last_good_bodyshot_attempt_id: Option<String>,
    /// Failure codes recorded at the character level.
    #[serde(default)]
    pub failure_codes: Vec<String>,
    /// Authoritative per-asset reference image entries, when present.
    #[serde(default)]
    pub reference_images: Vec<ReferenceImage>,
}

impl CharacterRecord {
    /// Resolves the URL/trace URL/prompt hash for one asset, preferring a
    /// matching `reference_images` entry over the legacy top-level fields.
    #[must_use]
    pub fn resolved_asset(&self, asset_type: AssetType) -> ResolvedAsset {
        if let Some(reference) =
            self.reference_images.iter().find(|entry| entry.asset_type == asset_type)
        {
            return ResolvedAsset {
                url: Some(reference.url.clone()),
                trace_url: reference.trace_url.clone(),
                prompt_hash: reference.prompt_hash.clone(),
            };
        }
        match asset_type {
            AssetType::Headshot => ResolvedAsset {
                url: self.headshot_url.clone(),
                trace_url: self.headshot_trace_url.clone(),
                prompt_hash: self.headshot_prompt_hash.clone(),
            },
            AssetType::Bodyshot => ResolvedAsset {
                url: self.bodyshot_url.clone(),
                trace_url: self.bodyshot_trace_url.clone(),
                prompt_hash: self.bodyshot_prompt_hash.clone(),
            },
        }
    }

    /// Returns the status string recorded for one asset, if any.
    #[must_use]
    pub fn status_for(&self, asset_type: AssetType) -> Option<&str> {
        match asset_type {
            AssetType::Headshot => self.headshot_status.as_deref(),
            AssetType::Bodyshot => self.bodyshot_status.as_deref(),
        }
    }

    /// Returns the originating request id for one asset from
    /// `reference_images`, when present.
    #[must_use]
    pub fn reference_request_id(&self, asset_type: AssetType) -> Option<&str> {
        self.reference_images
            .iter()
            .find(|entry| entry.asset_type == asset_type)
            .and_then(|entry| entry.openai_request_id.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_record() -> CharacterRecord {
        CharacterRecord {
            id: CharacterId::new("char-1"),
            name: "Rex".to_string(),
            species: "dragon".to_string(),
            species_descriptor: None,
            traits: BTreeMap::new(),
            headshot_url: Some("https://cdn.example.com/legacy-head.png".to_string()),
            bodyshot_url: None,
            headshot_trace_url: Some("https://trace.example.com/legacy-head.json".to_string()),
            bodyshot_trace_url: None,
            headshot_prompt_hash: Some("legacy-hash".to_string()),
            bodyshot_prompt_hash: None,
            global_style_hash: None,
            headshot_status: Some("ready".to_string()),
            bodyshot_status: None,
            character_state: Some("ready".to_string()),
            generation_started_at: None,
            generation_completed_at: None,
            applied_inclusivity_traits: Vec::new(),
            excluded_inclusivity_traits: Vec::new(),
            image_model: None,
            current_headshot_attempt_id: None,
            last_good_headshot_attempt_id: None,
            current_bodyshot_attempt_id: None,
            last_good_bodyshot_attempt_id: None,
            failure_codes: Vec::new(),
            reference_images: Vec::new(),
        }
    }

    #[test]
    fn reference_images_take_precedence_over_legacy_fields() {
        let mut record = base_record();
        record.reference_images.push(ReferenceImage {
            asset_type: AssetType::Headshot,
            url: "https://cdn.example.com/authoritative-head.png".to_string(),
            trace_url: Some("https://trace.example.com/authoritative-head.json".to_string()),
            prompt_hash: Some("authoritative-hash".to_string()),
            openai_request_id: Some("req-1".to_string()),
        });
        let resolved = record.resolved_asset(AssetType::Headshot);
        assert_eq!(resolved.url.as_deref(), Some("https://cdn.example.com/authoritative-head.png"));
        assert_eq!(resolved.prompt_hash.as_deref(), Some("authoritative-hash"));
    }

    #[test]
    fn falls_back_to_legacy_fields_when_no_reference_image() {
        let record = base_record();
        let resolved = record.resolved_asset(AssetType::Headshot);
        assert_eq!(resolved.url.as_deref(), Some("https://cdn.example.com/legacy-head.png"));
    }
}
