// canary-runner/src/facts.rs
// ============================================================================
// Step C: State-Store Poll
// Description: Fetches the character row and attempt list, then derives the
//              latest attempt per asset type (spec.md §4.5 step C).
// Purpose: Give later steps one `CharacterFacts` value instead of two
//          separate fetches plus ad hoc attempt-index scanning.
// Dependencies: canary-core, canary-providers
// ============================================================================

use canary_core::AttemptRecord;
use canary_core::AssetType;
use canary_core::AttemptSet;
use canary_core::CharacterId;
use canary_core::CharacterRecord;
use canary_providers::ProviderError;
use canary_providers::StateStoreClient;
use thiserror::Error;

/// Everything step C resolved about one character.
#[derive(Debug, Clone)]
pub struct CharacterFacts {
    /// The fetched character row.
    pub record: CharacterRecord,
    /// The character's full attempt history.
    pub attempts: AttemptSet,
}

impl CharacterFacts {
    /// Returns the latest attempt for `asset_type`, if any (spec.md §4.5
    /// step C: "the entries of each asset_type with the highest
    /// `attempt_index`").
    #[must_use]
    pub fn latest_attempt(&self, asset_type: AssetType) -> Option<&AttemptRecord> {
        self.attempts.latest(asset_type)
    }
}

/// A failure specific to step C.
#[derive(Debug, Error)]
pub enum FactsError {
    /// A transport/decode/status failure from the state store.
    #[error(transparent)]
    Provider(#[from] ProviderError),
    /// The character row was not found by the state store.
    #[error("character {0} not found in state store")]
    CharacterNotFound(CharacterId),
}

/// Runs step C for one character: fetch the row and its attempt history
/// (spec.md §4.5 step C).
///
/// # Errors
///
/// Returns [`FactsError`] on transport failure or when the character row is
/// missing.
pub fn fetch_character_facts(
    state_store: &dyn StateStoreClient,
    character_id: &CharacterId,
) -> Result<CharacterFacts, FactsError> {
    let record = state_store
        .fetch_character(character_id)?
        .ok_or_else(|| FactsError::CharacterNotFound(character_id.clone()))?;
    let attempts = state_store.fetch_attempts(character_id)?;
    Ok(CharacterFacts { record, attempts })
}
