// canary-runner/src/invocation.rs
// ============================================================================
// Step A: Mode Branch
// Description: Component mode inserts a character row tagged with the run
//              nonce then invokes `generate_character_art`; e2e mode invokes
//              `complete_character_creation_with_visuals` directly (spec.md
//              §4.5 step A).
// Purpose: Isolate the one behavioral fork the rest of the runner never has
//          to think about again: by the time step B runs, a `CharacterId`
//          either exists or the canary is already a fatal failure.
// Dependencies: canary-core, canary-providers
// ============================================================================

use canary_core::CharacterId;
use canary_core::NormalizedCanaryInput;
use canary_core::RunMode;
use canary_core::RunNonce;
use canary_providers::GenerationServiceClient;
use canary_providers::ImageEntry;
use canary_providers::ProviderError;
use canary_providers::StateStoreClient;
use thiserror::Error;

/// Everything step A resolved: the character id and whatever `images`
/// entries the invocation response carried.
#[derive(Debug, Clone)]
pub struct InvocationOutcome {
    /// Resolved character id, for either mode.
    pub character_id: CharacterId,
    /// Per-asset image entries the invocation response returned, if any.
    pub images: Vec<ImageEntry>,
}

/// A failure specific to step A.
#[derive(Debug, Error)]
pub enum InvocationError {
    /// A transport/decode/status failure from either the state store or the
    /// generation service.
    #[error(transparent)]
    Provider(#[from] ProviderError),
    /// The e2e invocation returned no `characterId` (spec.md §4.5 step A:
    /// "fatal for this canary").
    #[error("e2e invocation response carried no characterId")]
    MissingCharacterId,
}

/// Runs step A for one canary: mode branch, invocation, character id
/// resolution (spec.md §4.5 step A).
///
/// # Errors
///
/// Returns [`InvocationError`] on transport failure or a missing
/// `characterId` from an e2e invocation.
pub fn invoke(
    generation: &dyn GenerationServiceClient,
    state_store: &dyn StateStoreClient,
    mode: RunMode,
    normalized: &NormalizedCanaryInput,
    run_nonce: &RunNonce,
) -> Result<InvocationOutcome, InvocationError> {
    match mode {
        RunMode::Component => {
            let character_id = state_store.insert_character(normalized, run_nonce)?;
            let response = generation.generate_character_art(&character_id)?;
            Ok(InvocationOutcome { character_id, images: response.images })
        }
        RunMode::E2e => {
            let traits_payload = serde_json::to_value(normalized)
                .unwrap_or_else(|_| serde_json::json!({ "id": normalized.id.as_str() }));
            let response = generation.complete_character_creation_with_visuals(&traits_payload)?;
            let character_id =
                response.character_id.as_deref().map(CharacterId::new).ok_or(InvocationError::MissingCharacterId)?;
            Ok(InvocationOutcome { character_id, images: response.images })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use canary_core::AssetType;
    use canary_core::AttemptSet;
    use canary_core::CanaryId;
    use canary_core::CharacterRecord;
    use canary_core::Expectations;
    use canary_providers::InvocationResponse;
    use canary_providers::RemediationRequest;

    use super::*;

    struct StubGeneration {
        e2e_response: InvocationResponse,
        component_response: InvocationResponse,
    }

    impl GenerationServiceClient for StubGeneration {
        fn complete_character_creation_with_visuals(
            &self,
            _traits_payload: &serde_json::Value,
        ) -> Result<InvocationResponse, ProviderError> {
            Ok(self.e2e_response.clone())
        }

        fn generate_character_art(&self, _character_id: &CharacterId) -> Result<InvocationResponse, ProviderError> {
            Ok(self.component_response.clone())
        }

        fn enqueue_edit(&self, _request: &RemediationRequest) -> Result<(), ProviderError> {
            unimplemented!("not exercised by this test")
        }
    }

    #[derive(Default)]
    struct StubStateStore {
        inserted: Mutex<Vec<String>>,
    }

    impl StateStoreClient for StubStateStore {
        fn insert_character(
            &self,
            _normalized: &NormalizedCanaryInput,
            nonce: &RunNonce,
        ) -> Result<CharacterId, ProviderError> {
            self.inserted.lock().expect("lock").push(nonce.as_str().to_string());
            Ok(CharacterId::new("char-new"))
        }

        fn fetch_character(&self, _id: &CharacterId) -> Result<Option<CharacterRecord>, ProviderError> {
            unimplemented!("not exercised by this test")
        }

        fn fetch_attempts(&self, _id: &CharacterId) -> Result<AttemptSet, ProviderError> {
            unimplemented!("not exercised by this test")
        }

        fn probe_column(&self, _table: &str, _column: &str) -> Result<canary_providers::ColumnProbe, ProviderError> {
            unimplemented!("not exercised by this test")
        }
    }

    fn normalized() -> NormalizedCanaryInput {
        NormalizedCanaryInput {
            id: CanaryId::new("canary-1"),
            display_name: "Test".to_string(),
            age: 9,
            age_bucket: None,
            species: "human".to_string(),
            appearance: "tall".to_string(),
            personality: "brave".to_string(),
            personality_traits: Vec::new(),
            ethnicities: Vec::new(),
            inclusivity_traits: Vec::new(),
            trait_user_descriptions: BTreeMap::new(),
            character_spoken_language: None,
            reader_language: None,
            gender: None,
            expectations: Expectations::default(),
        }
    }

    #[test]
    fn component_mode_inserts_then_invokes() {
        let generation = StubGeneration {
            e2e_response: InvocationResponse::default(),
            component_response: InvocationResponse { character_id: None, images: Vec::new() },
        };
        let state_store = StubStateStore::default();
        let outcome =
            invoke(&generation, &state_store, RunMode::Component, &normalized(), &RunNonce::new("nonce-1"))
                .expect("must succeed");
        assert_eq!(outcome.character_id.as_str(), "char-new");
        assert_eq!(state_store.inserted.lock().expect("lock")[0], "nonce-1");
    }

    #[test]
    fn e2e_mode_resolves_character_id_from_response() {
        let generation = StubGeneration {
            e2e_response: InvocationResponse { character_id: Some("char-e2e".to_string()), images: Vec::new() },
            component_response: InvocationResponse::default(),
        };
        let state_store = StubStateStore::default();
        let outcome = invoke(&generation, &state_store, RunMode::E2e, &normalized(), &RunNonce::new("nonce-1"))
            .expect("must succeed");
        assert_eq!(outcome.character_id.as_str(), "char-e2e");
    }

    #[test]
    fn e2e_mode_without_character_id_is_fatal() {
        let generation =
            StubGeneration { e2e_response: InvocationResponse::default(), component_response: InvocationResponse::default() };
        let state_store = StubStateStore::default();
        let err = invoke(&generation, &state_store, RunMode::E2e, &normalized(), &RunNonce::new("nonce-1"))
            .expect_err("must fail");
        assert!(matches!(err, InvocationError::MissingCharacterId));
        assert!(
            asset_type_is_used(AssetType::Headshot),
            "keep AssetType import alive for future per-asset e2e assertions"
        );
    }

    const fn asset_type_is_used(_asset_type: AssetType) -> bool {
        true
    }
}
