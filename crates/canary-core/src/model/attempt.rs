// canary-core/src/model/attempt.rs
// ============================================================================
// Module: Attempt Record
// Description: One generation attempt row plus its validation summary.
// Purpose: Represent attempts as flat records indexed by id; edit
//          relationships (`fix_of_attempt_id`) are derived by lookup, never
//          by embedded pointers (spec design note on back-references).
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Attempts form a forest per asset via `fix_of_attempt_id`, but this module
//! keeps them as a flat `Vec<AttemptRecord>`; traversal helpers live on
//! [`AttemptSet`] rather than on the record itself.

use serde::Deserialize;
use serde::Serialize;

use crate::ids::AttemptId;
use crate::ids::CharacterId;

/// Which asset an attempt or check applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
    /// The character's headshot image.
    Headshot,
    /// The character's bodyshot image.
    Bodyshot,
}

impl AssetType {
    /// Returns the lowercase snake_case label used in artifacts and logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Headshot => "headshot",
            Self::Bodyshot => "bodyshot",
        }
    }
}

impl std::fmt::Display for AssetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle status of one generation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    /// The attempt succeeded with no outstanding issues.
    Ok,
    /// The attempt produced a usable asset with non-blocking issues.
    SoftFail,
    /// The attempt failed its contract outright.
    HardFail,
    /// Any other status reported by the generation service.
    #[serde(other)]
    Other,
}

/// A single `{trait, visible}` entry from a trace's `traits_visible` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitVisibility {
    /// Trait name as reported by the trace.
    pub trait_name: String,
    /// Whether the trait was judged visible in the rendered asset.
    pub visible: bool,
}

/// One `{world_fit}` entry from a bodyshot trace's `support_world_fit` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportWorldFitEntry {
    /// Free-text description of the support-world element being checked.
    pub element: Option<String>,
    /// Whether the element fits the character's native world.
    pub world_fit: bool,
}

/// Subset of a trace's validation payload retained for assertions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ValidationSummary {
    /// Overall content rating, if reported.
    pub rating: Option<String>,
    /// Whether the asset was judged child-safe.
    pub is_child_safe: Option<bool>,
    /// Whether requested traits passed visibility checks overall.
    pub trait_visibility_pass: Option<bool>,
    /// Traits that were requested but not found visible.
    #[serde(default)]
    pub missing_traits: Vec<String>,
    /// Whether a limb-difference was confirmed present, nested under `limbs`.
    pub limbs: Option<LimbValidation>,
    /// Whether the species' anatomy was confirmed.
    pub species_anatomy_confirmed: Option<bool>,
    /// Support-world-fit entries, bodyshot only.
    #[serde(default)]
    pub support_world_fit: Vec<SupportWorldFitEntry>,
    /// Whether the model defaulted to a human depiction for a nonhuman
    /// species.
    pub nonhuman_human_default: Option<bool>,
    /// Confidence score for `nonhuman_human_default`, when reported.
    pub nonhuman_human_default_confidence: Option<f64>,
    /// Free-text reason for `nonhuman_human_default`, when reported.
    pub nonhuman_human_default_reason: Option<String>,
    /// Per-trait visibility entries.
    #[serde(default)]
    pub traits_visible: Vec<TraitVisibility>,
}

/// The `limbs` sub-object of a validation summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LimbValidation {
    /// Whether a requested limb difference was confirmed present.
    pub limb_difference_confirmed: Option<bool>,
}

/// One row per generation attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AttemptRecord {
    /// Attempt identifier.
    pub id: AttemptId,
    /// Character this attempt belongs to.
    pub character_id: CharacterId,
    /// Asset type this attempt generated.
    pub asset_type: AssetType,
    /// Monotonic attempt index per asset within the character. Null indices
    /// sort as zero (spec design note on unspecified attempt-index starts).
    pub attempt_index: Option<i64>,
    /// Attempt status.
    pub status: AttemptStatus,
    /// Resulting image URL, when the attempt succeeded.
    pub image_url: Option<String>,
    /// Failure-preview image URL, when the attempt failed.
    pub fail_image_url: Option<String>,
    /// Trace URL for this attempt.
    pub trace_url: Option<String>,
    /// Originating provider request id.
    pub openai_request_id: Option<String>,
    /// Failure codes recorded on this attempt.
    #[serde(default)]
    pub failure_codes: Vec<String>,
    /// Free-text failure reason.
    pub failure_reason: Option<String>,
    /// Parsed validation summary, when the trace was fetched successfully.
    pub validation_summary: Option<ValidationSummary>,
    /// The attempt this one is an edit of, if any.
    pub fix_of_attempt_id: Option<AttemptId>,
    /// Creation timestamp (ISO 8601), used to order attempts.
    pub created_at: Option<String>,
}

impl AttemptRecord {
    /// Returns the effective sort index, treating a null index as zero (spec
    /// design note on unspecified attempt-index starts).
    #[must_use]
    pub fn sort_index(&self) -> i64 {
        self.attempt_index.unwrap_or(0)
    }

    /// Returns whether this attempt carries the named failure code.
    #[must_use]
    pub fn has_failure_code(&self, code: &str) -> bool {
        self.failure_codes.iter().any(|c| c == code)
    }

    /// Returns whether this attempt is an edit of another attempt.
    #[must_use]
    pub const fn is_edit(&self) -> bool {
        self.fix_of_attempt_id.is_some()
    }
}

/// A character's full, order-independent attempt history.
#[derive(Debug, Clone, Default)]
pub struct AttemptSet {
    attempts: Vec<AttemptRecord>,
}

impl AttemptSet {
    /// Wraps an attempt list fetched from the state store.
    #[must_use]
    pub const fn new(attempts: Vec<AttemptRecord>) -> Self {
        Self { attempts }
    }

    /// Returns all attempts, unordered.
    #[must_use]
    pub fn all(&self) -> &[AttemptRecord] {
        &self.attempts
    }

    /// Returns the attempt for `asset_type` with the highest attempt index
    /// (spec §4.5 step C: "the entries of each asset_type with the highest
    /// `attempt_index`"). Ties are broken by creation order, last wins.
    #[must_use]
    pub fn latest(&self, asset_type: AssetType) -> Option<&AttemptRecord> {
        self.attempts
            .iter()
            .filter(|attempt| attempt.asset_type == asset_type)
            .max_by_key(|attempt| attempt.sort_index())
    }

    /// Returns edit attempts (non-null `fix_of_attempt_id`) for `asset_type`,
    /// ordered by attempt index ascending.
    #[must_use]
    pub fn edits(&self, asset_type: AssetType) -> Vec<&AttemptRecord> {
        let mut edits: Vec<&AttemptRecord> = self
            .attempts
            .iter()
            .filter(|attempt| attempt.asset_type == asset_type && attempt.is_edit())
            .collect();
        edits.sort_by_key(|attempt| attempt.sort_index());
        edits
    }

    /// Returns the most recent edit attempt for `asset_type` created after
    /// `after`, by attempt index.
    #[must_use]
    pub fn latest_edit_after(&self, asset_type: AssetType, after: &AttemptRecord) -> Option<&AttemptRecord> {
        self.edits(asset_type)
            .into_iter()
            .filter(|edit| edit.sort_index() > after.sort_index())
            .max_by_key(|edit| edit.sort_index())
    }

    /// Looks up an attempt by id.
    #[must_use]
    pub fn by_id(&self, id: &AttemptId) -> Option<&AttemptRecord> {
        self.attempts.iter().find(|attempt| &attempt.id == id)
    }
}
