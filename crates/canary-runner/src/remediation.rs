// canary-runner/src/remediation.rs
// ============================================================================
// Step E: Remediation Pass (Edit-Fix)
// Description: Eligibility rules, enqueue, and bounded poll for an edit
//              attempt (spec.md §4.5 step E, §5 timing budget).
// Purpose: Keep the drift-code eligibility tables and the poll budget in one
//          place, grounded directly in the attempt-forest primitives
//          `AttemptSet::edits`/`AttemptSet::latest_edit_after`.
// Dependencies: canary-core, canary-providers
// ============================================================================

use std::time::Duration;

use canary_core::AssertionError;
use canary_core::AssetType;
use canary_core::AttemptRecord;
use canary_core::CharacterId;
use canary_providers::GenerationServiceClient;
use canary_providers::ProviderError;
use canary_providers::RemediationRequest;
use canary_providers::StateStoreClient;

use crate::clock::Clock;

/// Bodyshot drift codes that make an edit-fix eligible (spec.md §4.5 step E).
const BODYSHOT_DRIFT_CODES: &[&str] = &[
    "nonhuman_drift_human_default",
    "species_anatomy_unconfirmed",
    "elemental_embodiment_missing",
    "missing_traits",
    "wheelchair_not_present",
    "limb_difference_missing_not_present",
    "wheelchair_unconfirmed",
    "world_native_support_missing",
];

const POLL_BUDGET: Duration = Duration::from_secs(180);
const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Whether a latest headshot attempt is eligible for an edit-fix (spec.md
/// §4.5 step E: "nonhuman AND `failure_codes` contains
/// `nonhuman_drift_human_default`").
#[must_use]
pub fn headshot_eligible(is_nonhuman: bool, attempt: &AttemptRecord) -> bool {
    is_nonhuman && attempt.has_failure_code("nonhuman_drift_human_default")
}

/// Whether a latest bodyshot attempt is eligible for an edit-fix (spec.md
/// §4.5 step E).
#[must_use]
pub fn bodyshot_eligible(attempt: &AttemptRecord) -> bool {
    !attempt.has_failure_code("safety") && BODYSHOT_DRIFT_CODES.iter().any(|code| attempt.has_failure_code(code))
}

/// Outcome of step E for one asset type.
#[derive(Debug, Clone, Default)]
pub struct AssetRemediation {
    /// The edit attempt observed after enqueuing, if any.
    pub edit_attempt: Option<AttemptRecord>,
    /// Set if this asset was eligible but no edit attempt was ever observed
    /// (only raised for bodyshot; spec.md §4.5 step E: "pipeline bug").
    pub instrumentation: Option<AssertionError>,
}

/// Outcome of step E across both assets.
#[derive(Debug, Clone, Default)]
pub struct RemediationOutcome {
    /// Headshot remediation outcome.
    pub headshot: AssetRemediation,
    /// Bodyshot remediation outcome.
    pub bodyshot: AssetRemediation,
}

/// Runs step E for one character: eligibility check, enqueue, bounded poll,
/// for both headshot and bodyshot (spec.md §4.5 step E).
///
/// # Errors
///
/// Returns [`ProviderError`] on transport failure of the attempt-polling
/// fetch. Enqueue failures are fire-and-forget (spec.md §4.5 step E) and do
/// not abort the pass; the poll simply proceeds and likely times out.
pub fn run_remediation(
    generation: &dyn GenerationServiceClient,
    state_store: &dyn StateStoreClient,
    clock: &dyn Clock,
    character_id: &CharacterId,
    is_nonhuman: bool,
    latest_headshot: Option<&AttemptRecord>,
    latest_bodyshot: Option<&AttemptRecord>,
    headshot_edits_exist: bool,
    bodyshot_edits_exist: bool,
) -> Result<RemediationOutcome, ProviderError> {
    let mut outcome = RemediationOutcome::default();

    if let Some(attempt) = latest_headshot {
        if !headshot_edits_exist && headshot_eligible(is_nonhuman, attempt) {
            let _ = generation.enqueue_edit(&RemediationRequest::edit(
                character_id.clone(),
                attempt.id.clone(),
                AssetType::Headshot,
            ));
            outcome.headshot.edit_attempt =
                poll_for_edit(state_store, clock, character_id, AssetType::Headshot, attempt)?;
        }
    }

    if let Some(attempt) = latest_bodyshot {
        if !bodyshot_edits_exist && bodyshot_eligible(attempt) {
            let _ = generation.enqueue_edit(&RemediationRequest::edit(
                character_id.clone(),
                attempt.id.clone(),
                AssetType::Bodyshot,
            ));
            outcome.bodyshot.edit_attempt =
                poll_for_edit(state_store, clock, character_id, AssetType::Bodyshot, attempt)?;
            if outcome.bodyshot.edit_attempt.is_none() {
                outcome.bodyshot.instrumentation = Some(AssertionError::new(
                    "remediation_bodyshot_edit_missing",
                    "eligible bodyshot drift code was present but no bodyshot edit attempt ever appeared",
                ));
            }
        }
    }

    Ok(outcome)
}

fn poll_for_edit(
    state_store: &dyn StateStoreClient,
    clock: &dyn Clock,
    character_id: &CharacterId,
    asset_type: AssetType,
    original_latest: &AttemptRecord,
) -> Result<Option<AttemptRecord>, ProviderError> {
    let mut elapsed = Duration::ZERO;
    while elapsed < POLL_BUDGET {
        clock.sleep(POLL_INTERVAL);
        elapsed += POLL_INTERVAL;
        let attempts = state_store.fetch_attempts(character_id)?;
        if let Some(edit) = attempts.latest_edit_after(asset_type, original_latest) {
            return Ok(Some(edit.clone()));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::sync::Mutex;

    use canary_core::AttemptId;
    use canary_core::AttemptSet;
    use canary_core::AttemptStatus;
    use canary_providers::ColumnProbe;
    use canary_providers::InvocationResponse;

    use super::*;
    use crate::clock::test_support::FakeClock;

    fn attempt(id: &str, asset_type: AssetType, index: i64, failure_codes: &[&str]) -> AttemptRecord {
        AttemptRecord {
            id: AttemptId::new(id),
            character_id: CharacterId::new("char-1"),
            asset_type,
            attempt_index: Some(index),
            status: AttemptStatus::HardFail,
            image_url: None,
            fail_image_url: None,
            trace_url: None,
            openai_request_id: None,
            failure_codes: failure_codes.iter().map(|code| (*code).to_string()).collect(),
            failure_reason: None,
            validation_summary: None,
            fix_of_attempt_id: None,
            created_at: None,
        }
    }

    #[test]
    fn headshot_eligible_requires_nonhuman_and_drift_code() {
        let attempt = attempt("a1", AssetType::Headshot, 0, &["nonhuman_drift_human_default"]);
        assert!(headshot_eligible(true, &attempt));
        assert!(!headshot_eligible(false, &attempt));
    }

    #[test]
    fn bodyshot_eligible_excludes_safety_failures() {
        let drifted = attempt("a1", AssetType::Bodyshot, 0, &["missing_traits"]);
        assert!(bodyshot_eligible(&drifted));
        let unsafe_attempt = attempt("a2", AssetType::Bodyshot, 0, &["missing_traits", "safety"]);
        assert!(!bodyshot_eligible(&unsafe_attempt));
    }

    struct StubGeneration {
        enqueued: Mutex<Vec<RemediationRequest>>,
    }

    impl GenerationServiceClient for StubGeneration {
        fn complete_character_creation_with_visuals(
            &self,
            _traits_payload: &serde_json::Value,
        ) -> Result<InvocationResponse, ProviderError> {
            unimplemented!("not exercised by this test")
        }

        fn generate_character_art(&self, _character_id: &CharacterId) -> Result<InvocationResponse, ProviderError> {
            unimplemented!("not exercised by this test")
        }

        fn enqueue_edit(&self, request: &RemediationRequest) -> Result<(), ProviderError> {
            self.enqueued.lock().expect("lock").push(request.clone());
            Ok(())
        }
    }

    struct StubStateStore {
        attempts_after_poll: RefCell<Vec<AttemptRecord>>,
    }

    impl StateStoreClient for StubStateStore {
        fn insert_character(
            &self,
            _normalized: &canary_core::NormalizedCanaryInput,
            _nonce: &canary_core::RunNonce,
        ) -> Result<CharacterId, ProviderError> {
            unimplemented!("not exercised by this test")
        }

        fn fetch_character(&self, _id: &CharacterId) -> Result<Option<canary_core::CharacterRecord>, ProviderError> {
            unimplemented!("not exercised by this test")
        }

        fn fetch_attempts(&self, _id: &CharacterId) -> Result<AttemptSet, ProviderError> {
            Ok(AttemptSet::new(self.attempts_after_poll.borrow().clone()))
        }

        fn probe_column(&self, _table: &str, _column: &str) -> Result<ColumnProbe, ProviderError> {
            unimplemented!("not exercised by this test")
        }
    }

    #[test]
    fn enqueues_and_observes_bodyshot_edit_on_first_poll() {
        let original = attempt("a1", AssetType::Bodyshot, 0, &["missing_traits"]);
        let edit = attempt("a2", AssetType::Bodyshot, 1, &[]);
        let generation = StubGeneration { enqueued: Mutex::new(Vec::new()) };
        let state_store = StubStateStore { attempts_after_poll: RefCell::new(vec![edit.clone()]) };
        let clock = FakeClock::default();

        let outcome = run_remediation(
            &generation,
            &state_store,
            &clock,
            &CharacterId::new("char-1"),
            false,
            None,
            Some(&original),
            false,
            false,
        )
        .expect("must succeed");

        assert_eq!(generation.enqueued.lock().expect("lock").len(), 1);
        assert_eq!(outcome.bodyshot.edit_attempt.map(|a| a.id.as_str().to_string()), Some("a2".to_string()));
        assert!(outcome.bodyshot.instrumentation.is_none());
        assert_eq!(clock.elapsed(), Duration::from_secs(5));
    }

    #[test]
    fn times_out_without_observing_edit_raises_instrumentation() {
        let original = attempt("a1", AssetType::Bodyshot, 0, &["missing_traits"]);
        let generation = StubGeneration { enqueued: Mutex::new(Vec::new()) };
        let state_store = StubStateStore { attempts_after_poll: RefCell::new(vec![original.clone()]) };
        let clock = FakeClock::default();

        let outcome = run_remediation(
            &generation,
            &state_store,
            &clock,
            &CharacterId::new("char-1"),
            false,
            None,
            Some(&original),
            false,
            false,
        )
        .expect("must succeed");

        assert!(outcome.bodyshot.edit_attempt.is_none());
        assert!(outcome.bodyshot.instrumentation.is_some());
        assert_eq!(clock.elapsed(), POLL_BUDGET);
    }

    #[test]
    fn existing_edit_skips_enqueue() {
        let original = attempt("a1", AssetType::Bodyshot, 0, &["missing_traits"]);
        let generation = StubGeneration { enqueued: Mutex::new(Vec::new()) };
        let state_store = StubStateStore { attempts_after_poll: RefCell::new(Vec::new()) };
        let clock = FakeClock::default();

        let outcome = run_remediation(
            &generation,
            &state_store,
            &clock,
            &CharacterId::new("char-1"),
            false,
            None,
            Some(&original),
            false,
            true,
        )
        .expect("must succeed");

        assert!(generation.enqueued.lock().expect("lock").is_empty());
        assert!(outcome.bodyshot.edit_attempt.is_none());
    }
}
