// canary-assert/src/context.rs
// ============================================================================
// Module: Assertion Context
// Description: The resolved, per-canary facts the assertion kernel runs its
//              checks against (spec.md §4.5 steps B-D feed this in).
// Purpose: Decouple the kernel from the HTTP/state-store types in
//          `canary-providers`; the runner assembles this context once per
//          canary and the kernel never reaches back into it.
// Dependencies: canary-core, serde_json
// ============================================================================

use canary_core::AssetType;
use canary_core::AttemptRecord;
use canary_core::ResolvedAsset;
use serde_json::Value;

/// Whether strict mode is in effect (`--strict` / `--strict-mode`,
/// spec.md §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrictMode {
    /// `--strict` was not given.
    Lenient,
    /// `--strict` was given.
    Strict,
}

impl StrictMode {
    /// Returns whether strict mode is active.
    #[must_use]
    pub const fn is_strict(self) -> bool {
        matches!(self, Self::Strict)
    }
}

/// The facts an invocation response carried for one asset, when it returned
/// an `images` entry for that asset (spec.md §4.5 step A).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationImageFacts {
    /// Returned asset URL.
    pub url: String,
    /// Returned trace URL.
    pub trace_url: Option<String>,
    /// Returned prompt hash.
    pub prompt_hash: Option<String>,
    /// Returned originating provider request id.
    pub openai_request_id: Option<String>,
}

/// Resolved, per-asset facts the kernel checks.
#[derive(Debug, Clone, Default)]
pub struct AssetContext {
    /// The latest attempt for this asset, if any (spec.md §4.5 step C).
    pub attempt: Option<AttemptRecord>,
    /// `reference_images`-preferred URL/trace-URL/prompt-hash
    /// (`CharacterRecord::resolved_asset`).
    pub resolved: ResolvedAsset,
    /// Character-level generation status string for this asset.
    pub status: Option<String>,
    /// Invocation-response image entry for this asset, if the invocation
    /// returned one.
    pub invocation_image: Option<InvocationImageFacts>,
    /// Raw trace JSON fetched for the latest attempt, if the fetch
    /// succeeded (spec.md §4.5 step D).
    pub trace_raw: Option<Value>,
    /// Edit attempts observed for this asset after the latest non-edit
    /// attempt, ordered oldest to newest.
    pub edit_attempts: Vec<AttemptRecord>,
}

/// All resolved facts the assertion kernel runs its checks against for one
/// canary (spec.md §4.6).
#[derive(Debug, Clone)]
pub struct AssertionContext {
    /// The configured public asset host allowlist.
    pub allowed_asset_hosts: Vec<String>,
    /// Expectation flags from the authored canary.
    pub require_limb_difference: bool,
    /// See [`Self::require_limb_difference`].
    pub require_wheelchair_presence: bool,
    /// See [`Self::require_limb_difference`].
    pub require_species_truthiness: bool,
    /// See [`Self::require_limb_difference`].
    pub require_support_world_fit: bool,
    /// Character-level lifecycle state (e.g. `needs_retry`, `ready`).
    pub character_state: Option<String>,
    /// Whether the canary's species is nonhuman (spec.md §4.5 step E).
    pub is_nonhuman: bool,
    /// Strict-mode setting for this run.
    pub strict: StrictMode,
    /// Headshot facts.
    pub headshot: AssetContext,
    /// Bodyshot facts.
    pub bodyshot: AssetContext,
}

impl AssertionContext {
    /// Returns whether the character is in the `needs_retry` lifecycle
    /// state (several checks are suppressed while a retry is already
    /// pending).
    #[must_use]
    pub fn is_needs_retry(&self) -> bool {
        self.character_state.as_deref() == Some("needs_retry")
    }

    /// Returns the context for `asset_type`.
    #[must_use]
    pub const fn asset(&self, asset_type: AssetType) -> &AssetContext {
        match asset_type {
            AssetType::Headshot => &self.headshot,
            AssetType::Bodyshot => &self.bodyshot,
        }
    }
}
