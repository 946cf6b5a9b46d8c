// canary-runner/tests/scenarios.rs
// ============================================================================
// Module: Canary Runner Scenarios
// Description: The six concrete scenarios spec.md §8 seeds the test suite
//              with, driven end to end through `run_canary` against
//              in-memory fakes for every external collaborator.
// Purpose: Exercise steps A-G together, not just in isolation, so a
//          regression in how the steps compose (not just within one step)
//          is caught.
// Dependencies: canary-artifacts, canary-assert, canary-config, canary-core,
//               canary-providers, canary-runner, serde_json, tempfile
// ============================================================================

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

use canary_artifacts::ArtifactEmitter;
use canary_artifacts::ArtifactPaths;
use canary_artifacts::ReviewHeader;
use canary_assert::StrictMode;
use canary_config::TokenKind;
use canary_core::AssetType;
use canary_core::AttemptId;
use canary_core::AttemptRecord;
use canary_core::AttemptSet;
use canary_core::AttemptStatus;
use canary_core::CanaryId;
use canary_core::CharacterId;
use canary_core::CharacterRecord;
use canary_core::Expectations;
use canary_core::NormalizedCanaryInput;
use canary_core::RunMode;
use canary_core::RunNonce;
use canary_core::VerdictStatus;
use canary_providers::ColumnProbe;
use canary_providers::GenerationServiceClient;
use canary_providers::ImageEntry;
use canary_providers::InvocationResponse;
use canary_providers::ProviderError;
use canary_providers::RemediationRequest;
use canary_providers::SnapshotClient;
use canary_providers::SnapshotFetch;
use canary_providers::StateStoreClient;
use canary_providers::TokenClassification;
use canary_providers::TraceStoreClient;
use canary_runner::CanaryRunInputs;
use canary_runner::RunnerCollaborators;
use canary_runner::clock::Clock;
use canary_runner::run_canary;
use serde_json::Value;
use serde_json::json;

fn normalized(id: &str, species: &str, expectations: Expectations) -> NormalizedCanaryInput {
    NormalizedCanaryInput {
        id: CanaryId::new(id),
        display_name: "Test Canary".to_string(),
        age: 9,
        age_bucket: None,
        species: species.to_string(),
        appearance: "tall and scaly".to_string(),
        personality: "brave".to_string(),
        personality_traits: Vec::new(),
        ethnicities: Vec::new(),
        inclusivity_traits: Vec::new(),
        trait_user_descriptions: BTreeMap::new(),
        character_spoken_language: None,
        reader_language: None,
        gender: None,
        expectations,
    }
}

fn base_record(species: &str) -> CharacterRecord {
    CharacterRecord {
        id: CharacterId::new("char-1"),
        name: "Rex".to_string(),
        species: species.to_string(),
        species_descriptor: None,
        traits: BTreeMap::new(),
        headshot_url: Some("https://cdn.example.com/h.png".to_string()),
        bodyshot_url: Some("https://cdn.example.com/b.png".to_string()),
        headshot_trace_url: Some("https://trace.example.com/h.json".to_string()),
        bodyshot_trace_url: Some("https://trace.example.com/b.json".to_string()),
        headshot_prompt_hash: Some("hash-h".to_string()),
        bodyshot_prompt_hash: Some("hash-b".to_string()),
        global_style_hash: Some("style-1".to_string()),
        headshot_status: Some("ready".to_string()),
        bodyshot_status: Some("ready".to_string()),
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

fn attempt(
    id: &str,
    asset_type: AssetType,
    index: i64,
    status: AttemptStatus,
    failure_codes: &[&str],
    fix_of: Option<&str>,
) -> AttemptRecord {
    let url = match asset_type {
        AssetType::Headshot => "https://cdn.example.com/h.png",
        AssetType::Bodyshot => "https://cdn.example.com/b.png",
    };
    let trace_url = match asset_type {
        AssetType::Headshot => "https://trace.example.com/h.json",
        AssetType::Bodyshot => "https://trace.example.com/b.json",
    };
    AttemptRecord {
        id: AttemptId::new(id),
        character_id: CharacterId::new("char-1"),
        asset_type,
        attempt_index: Some(index),
        status,
        image_url: Some(url.to_string()),
        fail_image_url: None,
        trace_url: Some(trace_url.to_string()),
        openai_request_id: None,
        failure_codes: failure_codes.iter().map(|code| (*code).to_string()).collect(),
        failure_reason: None,
        validation_summary: None,
        fix_of_attempt_id: fix_of.map(AttemptId::new),
        created_at: None,
    }
}

fn passing_validation() -> Value {
    json!({
        "rating": "g",
        "is_child_safe": true,
        "trait_visibility_pass": true,
        "missing_traits": [],
        "species_anatomy_confirmed": true,
        "nonhuman_human_default": false,
    })
}

struct FakeClock;

impl Clock for FakeClock {
    fn sleep(&self, _duration: Duration) {}
}

struct FakeGeneration {
    response: InvocationResponse,
    enqueued: Mutex<Vec<RemediationRequest>>,
}

impl FakeGeneration {
    fn new(response: InvocationResponse) -> Self {
        Self { response, enqueued: Mutex::new(Vec::new()) }
    }
}

impl GenerationServiceClient for FakeGeneration {
    fn complete_character_creation_with_visuals(&self, _traits_payload: &Value) -> Result<InvocationResponse, ProviderError> {
        Ok(self.response.clone())
    }

    fn generate_character_art(&self, _character_id: &CharacterId) -> Result<InvocationResponse, ProviderError> {
        Ok(self.response.clone())
    }

    fn enqueue_edit(&self, request: &RemediationRequest) -> Result<(), ProviderError> {
        self.enqueued.lock().expect("lock").push(request.clone());
        Ok(())
    }
}

/// A state store whose attempt list can grow between polls, to simulate an
/// edit attempt appearing partway through remediation's bounded poll.
struct FakeStateStore {
    record: CharacterRecord,
    attempts: RefCell<Vec<AttemptRecord>>,
    polls_until_edit_appears: RefCell<u32>,
    pending_edit: RefCell<Option<AttemptRecord>>,
}

impl FakeStateStore {
    fn new(record: CharacterRecord, attempts: Vec<AttemptRecord>) -> Self {
        Self {
            record,
            attempts: RefCell::new(attempts),
            polls_until_edit_appears: RefCell::new(0),
            pending_edit: RefCell::new(None),
        }
    }

    fn with_edit_after_polls(self, polls: u32, edit: AttemptRecord) -> Self {
        *self.polls_until_edit_appears.borrow_mut() = polls;
        *self.pending_edit.borrow_mut() = Some(edit);
        self
    }
}

impl StateStoreClient for FakeStateStore {
    fn insert_character(&self, _normalized: &NormalizedCanaryInput, _nonce: &RunNonce) -> Result<CharacterId, ProviderError> {
        Ok(CharacterId::new("char-1"))
    }

    fn fetch_character(&self, _id: &CharacterId) -> Result<Option<CharacterRecord>, ProviderError> {
        Ok(Some(self.record.clone()))
    }

    fn fetch_attempts(&self, _id: &CharacterId) -> Result<AttemptSet, ProviderError> {
        let mut remaining = self.polls_until_edit_appears.borrow_mut();
        if *remaining > 0 {
            *remaining -= 1;
            if *remaining == 0 {
                if let Some(edit) = self.pending_edit.borrow_mut().take() {
                    self.attempts.borrow_mut().push(edit);
                }
            }
        }
        Ok(AttemptSet::new(self.attempts.borrow().clone()))
    }

    fn probe_column(&self, _table: &str, _column: &str) -> Result<ColumnProbe, ProviderError> {
        unimplemented!("not exercised by these scenarios")
    }
}

struct FakeSnapshot;

impl SnapshotClient for FakeSnapshot {
    fn fetch_snapshot(&self, snapshot_base_path: &str, _auth_base_path: &str, character_id: &str) -> Result<SnapshotFetch, ProviderError> {
        Ok(SnapshotFetch {
            receipt: canary_core::PublicSnapshotReceipt {
                url: format!("https://api.example.com{snapshot_base_path}/characters/{character_id}"),
                status: 200,
                ok: true,
                prefix: snapshot_base_path.to_string(),
            },
            data: Some(json!({ "species": "dragon" })),
        })
    }
}

struct FakeTraceStore {
    traces: BTreeMap<String, Value>,
}

impl TraceStoreClient for FakeTraceStore {
    fn fetch_trace(&self, trace_url: &str) -> Option<Value> {
        self.traces.get(trace_url).cloned()
    }
}

fn emitter(nonce: &RunNonce) -> (tempfile::TempDir, ArtifactEmitter) {
    let dir = tempfile::tempdir().expect("tempdir");
    unsafe {
        std::env::set_var("CANARY_REPORT_JSONL_PATH", dir.path().join("report.jsonl"));
        std::env::set_var("CANARY_REPORT_MARKDOWN_PATH", dir.path().join("report.md"));
        std::env::set_var("CANARY_ATTEMPTS_JSONL_PATH", dir.path().join("attempts.jsonl"));
        std::env::set_var("CANARY_REVIEW_MARKDOWN_PATH", dir.path().join("review.md"));
    }
    let paths = ArtifactPaths::resolve(nonce);
    let header = ReviewHeader {
        run_nonce: nonce.as_str(),
        environment: "staging",
        environment_inferred: true,
        mode: "component",
        api_base_url: "https://api.example.com",
        auth_base_path: "/api/v1",
        snapshot_base_path: "/public/v1",
        invocation_target: "canary-run",
        invocation_target_source: "fallback",
    };
    let emitter = ArtifactEmitter::open(&paths, &header).expect("emitter opens");
    (dir, emitter)
}

fn base_inputs<'a>(
    normalized: &'a NormalizedCanaryInput,
    nonce: RunNonce,
    allowed_asset_hosts: Vec<String>,
    strict: StrictMode,
) -> CanaryRunInputs<'a> {
    CanaryRunInputs {
        normalized,
        mode: RunMode::Component,
        run_nonce: nonce,
        allowed_asset_hosts,
        strict,
        snapshot_base_path: "/public/v1",
        auth_base_path: "/api/v1",
        token: TokenClassification { kind: TokenKind::CustomJwt, issuer: Some("self".to_string()) },
    }
}

/// Scenario 1: well-formed happy path — human species, no inclusivity
/// traits, matching invocation/state-store URLs and hashes, single passing
/// attempt per asset. Expected: status pass, zero errors.
#[test]
fn scenario_1_well_formed_happy_path() {
    let normalized = normalized("canary-1", "human", Expectations::default());
    let record = base_record("human");

    let headshot = attempt("h1", AssetType::Headshot, 0, AttemptStatus::Ok, &[], None);
    let bodyshot = attempt("b1", AssetType::Bodyshot, 0, AttemptStatus::Ok, &[], None);

    let generation = FakeGeneration::new(InvocationResponse {
        character_id: Some("char-1".to_string()),
        images: vec![
            ImageEntry {
                asset_type: AssetType::Headshot,
                url: "https://cdn.example.com/h.png".to_string(),
                trace_url: Some("https://trace.example.com/h.json".to_string()),
                prompt_hash: Some("hash-h".to_string()),
                openai_request_id: None,
            },
            ImageEntry {
                asset_type: AssetType::Bodyshot,
                url: "https://cdn.example.com/b.png".to_string(),
                trace_url: Some("https://trace.example.com/b.json".to_string()),
                prompt_hash: Some("hash-b".to_string()),
                openai_request_id: None,
            },
        ],
    });
    let state_store = FakeStateStore::new(record, vec![headshot, bodyshot]);
    let snapshot = FakeSnapshot;
    let trace_store = FakeTraceStore {
        traces: BTreeMap::from([
            ("https://trace.example.com/h.json".to_string(), passing_validation()),
            ("https://trace.example.com/b.json".to_string(), passing_validation()),
        ]),
    };
    let clock = FakeClock;
    let collaborators = RunnerCollaborators { generation: &generation, state_store: &state_store, snapshot: &snapshot, trace_store: &trace_store, clock: &clock };

    let nonce = RunNonce::new("run-1");
    let (_dir, mut emitter) = emitter(&nonce);
    let inputs = base_inputs(&normalized, nonce, vec!["cdn.example.com".to_string()], StrictMode::Lenient);

    let outcome = run_canary(&collaborators, &inputs, &mut emitter).expect("run succeeds");
    assert_eq!(outcome.report.status, VerdictStatus::Pass);
    assert!(outcome.report.instrumentation.is_empty());
    assert!(outcome.report.hard_fail.is_empty());
}

/// Scenario 3: host allowlist negative test — only `bad.example.com` is
/// allowed, so both asset URLs fail the allowlist. Expected: instrumentation
/// errors for both assets, status fail.
#[test]
fn scenario_3_host_allowlist_negative() {
    let normalized = normalized("canary-3", "human", Expectations::default());
    let record = base_record("human");
    let headshot = attempt("h1", AssetType::Headshot, 0, AttemptStatus::Ok, &[], None);
    let bodyshot = attempt("b1", AssetType::Bodyshot, 0, AttemptStatus::Ok, &[], None);

    let generation = FakeGeneration::new(InvocationResponse { character_id: Some("char-1".to_string()), images: Vec::new() });
    let state_store = FakeStateStore::new(record, vec![headshot, bodyshot]);
    let snapshot = FakeSnapshot;
    let trace_store = FakeTraceStore { traces: BTreeMap::new() };
    let clock = FakeClock;
    let collaborators = RunnerCollaborators { generation: &generation, state_store: &state_store, snapshot: &snapshot, trace_store: &trace_store, clock: &clock };

    let nonce = RunNonce::new("run-3");
    let (_dir, mut emitter) = emitter(&nonce);
    let inputs = base_inputs(&normalized, nonce, vec!["bad.example.com".to_string()], StrictMode::Lenient);

    let outcome = run_canary(&collaborators, &inputs, &mut emitter).expect("run succeeds");
    assert_eq!(outcome.report.status, VerdictStatus::Fail);
    assert!(outcome.report.instrumentation.iter().any(|e| e.code == "asset_url_host_not_allowed" && e.asset == Some(AssetType::Headshot)));
    assert!(outcome.report.instrumentation.iter().any(|e| e.code == "asset_url_host_not_allowed" && e.asset == Some(AssetType::Bodyshot)));
}

/// Scenario 4: limb-difference expectation unmet — `requireLimbDifference`
/// is set, bodyshot validation reports `limb_difference_confirmed = false`,
/// character state is `ready`. Expected: a hard failure, status fail.
#[test]
fn scenario_4_limb_difference_expectation_unmet() {
    let expectations = Expectations { require_limb_difference: true, ..Expectations::default() };
    let normalized = normalized("canary-4", "human", expectations);
    let record = base_record("human");

    let headshot = attempt("h1", AssetType::Headshot, 0, AttemptStatus::Ok, &[], None);
    let bodyshot = attempt("b1", AssetType::Bodyshot, 0, AttemptStatus::Ok, &[], None);

    let mut bodyshot_trace = passing_validation();
    bodyshot_trace["limbs"] = json!({ "limb_difference_confirmed": false });

    let generation = FakeGeneration::new(InvocationResponse { character_id: Some("char-1".to_string()), images: Vec::new() });
    let state_store = FakeStateStore::new(record, vec![headshot, bodyshot]);
    let snapshot = FakeSnapshot;
    let trace_store = FakeTraceStore {
        traces: BTreeMap::from([
            ("https://trace.example.com/h.json".to_string(), passing_validation()),
            ("https://trace.example.com/b.json".to_string(), bodyshot_trace),
        ]),
    };
    let clock = FakeClock;
    let collaborators = RunnerCollaborators { generation: &generation, state_store: &state_store, snapshot: &snapshot, trace_store: &trace_store, clock: &clock };

    let nonce = RunNonce::new("run-4");
    let (_dir, mut emitter) = emitter(&nonce);
    let inputs = base_inputs(&normalized, nonce, vec!["cdn.example.com".to_string()], StrictMode::Lenient);

    let outcome = run_canary(&collaborators, &inputs, &mut emitter).expect("run succeeds");
    assert_eq!(outcome.report.status, VerdictStatus::Fail);
    assert!(outcome.report.hard_fail.iter().any(|e| e.code == "limb_difference_not_confirmed"));
}

/// Scenario 5: nonhuman drift with successful remediation — latest bodyshot
/// carries `nonhuman_drift_human_default`, no safety code, no prior edit.
/// The runner enqueues one edit, polling observes a clean edit attempt.
/// Expected: status pass, zero hard failures, zero soft issues.
#[test]
fn scenario_5_nonhuman_drift_with_remediation() {
    let normalized = normalized("canary-5", "dragon", Expectations::default());
    let record = base_record("dragon");

    let headshot = attempt("h1", AssetType::Headshot, 0, AttemptStatus::Ok, &[], None);
    let bodyshot = attempt("b1", AssetType::Bodyshot, 0, AttemptStatus::HardFail, &["nonhuman_drift_human_default"], None);

    let mut bodyshot_trace = passing_validation();
    bodyshot_trace["nonhuman_human_default"] = json!(true);
    let mut edit_trace = passing_validation();
    edit_trace["nonhuman_human_default"] = json!(false);

    let mut edit = attempt("b2", AssetType::Bodyshot, 1, AttemptStatus::Ok, &[], Some("b1"));
    edit.trace_url = Some("https://trace.example.com/b2.json".to_string());

    let generation = FakeGeneration::new(InvocationResponse { character_id: Some("char-1".to_string()), images: Vec::new() });
    let state_store = FakeStateStore::new(record, vec![headshot, bodyshot]).with_edit_after_polls(1, edit);
    let snapshot = FakeSnapshot;
    let trace_store = FakeTraceStore {
        traces: BTreeMap::from([
            ("https://trace.example.com/h.json".to_string(), passing_validation()),
            ("https://trace.example.com/b.json".to_string(), bodyshot_trace),
            ("https://trace.example.com/b2.json".to_string(), edit_trace),
        ]),
    };
    let clock = FakeClock;
    let collaborators = RunnerCollaborators { generation: &generation, state_store: &state_store, snapshot: &snapshot, trace_store: &trace_store, clock: &clock };

    let nonce = RunNonce::new("run-5");
    let (_dir, mut emitter) = emitter(&nonce);
    let inputs = base_inputs(&normalized, nonce, vec!["cdn.example.com".to_string()], StrictMode::Lenient);

    let outcome = run_canary(&collaborators, &inputs, &mut emitter).expect("run succeeds");
    assert_eq!(generation.enqueued.lock().expect("lock").len(), 1);
    assert!(outcome.report.hard_fail.is_empty());
    assert!(outcome.report.soft_issues.is_empty());
    assert_eq!(outcome.report.status, VerdictStatus::Pass);
}

/// Scenario 6: nonhuman drift persists after edit, strict mode — same setup
/// as scenario 5 but the edit attempt's own trace still reports
/// `nonhuman_human_default = true`. Expected: a hard failure, status fail.
#[test]
fn scenario_6_nonhuman_drift_persists_after_edit_strict() {
    let normalized = normalized("canary-6", "dragon", Expectations::default());
    let record = base_record("dragon");

    let headshot = attempt("h1", AssetType::Headshot, 0, AttemptStatus::Ok, &[], None);
    let bodyshot = attempt("b1", AssetType::Bodyshot, 0, AttemptStatus::HardFail, &["nonhuman_drift_human_default"], None);

    let mut bodyshot_trace = passing_validation();
    bodyshot_trace["nonhuman_human_default"] = json!(true);
    let mut edit_trace = passing_validation();
    edit_trace["nonhuman_human_default"] = json!(true);

    let mut edit = attempt("b2", AssetType::Bodyshot, 1, AttemptStatus::Ok, &[], Some("b1"));
    edit.trace_url = Some("https://trace.example.com/b2.json".to_string());

    let generation = FakeGeneration::new(InvocationResponse { character_id: Some("char-1".to_string()), images: Vec::new() });
    let state_store = FakeStateStore::new(record, vec![headshot, bodyshot]).with_edit_after_polls(1, edit);
    let snapshot = FakeSnapshot;
    let trace_store = FakeTraceStore {
        traces: BTreeMap::from([
            ("https://trace.example.com/h.json".to_string(), passing_validation()),
            ("https://trace.example.com/b.json".to_string(), bodyshot_trace),
            ("https://trace.example.com/b2.json".to_string(), edit_trace),
        ]),
    };
    let clock = FakeClock;
    let collaborators = RunnerCollaborators { generation: &generation, state_store: &state_store, snapshot: &snapshot, trace_store: &trace_store, clock: &clock };

    let nonce = RunNonce::new("run-6");
    let (_dir, mut emitter) = emitter(&nonce);
    let inputs = base_inputs(&normalized, nonce, vec!["cdn.example.com".to_string()], StrictMode::Strict);

    let outcome = run_canary(&collaborators, &inputs, &mut emitter).expect("run succeeds");
    assert_eq!(outcome.report.status, VerdictStatus::Fail);
    assert!(outcome.report.hard_fail.iter().any(|e| e.code == "nonhuman_drift_persisted_after_edit"));
}
