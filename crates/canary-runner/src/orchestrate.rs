// canary-runner/src/orchestrate.rs
// ============================================================================
// Module: Canary Orchestration
// Description: Strings steps A-G together for one canary (spec.md §4.5) and
//              emits the resulting report.
// Purpose: Give `canary-cli` a single call per canary that returns a
//          finished, already-emitted `RunReport` plus whether the public
//          snapshot failure means the whole run must stop after this canary
//          (spec.md §7).
// Dependencies: canary-artifacts, canary-assert, canary-core, canary-providers, time
// ============================================================================

use canary_artifacts::ArtifactEmitter;
use canary_assert::AssertionContext;
use canary_assert::AssetContext;
use canary_assert::InvocationImageFacts;
use canary_assert::StrictMode;
use canary_assert::run_kernel;
use canary_assert::species;
use canary_core::AssertionError;
use canary_core::AssetReport;
use canary_core::AssetType;
use canary_core::AttemptRecord;
use canary_core::CharacterId;
use canary_core::NormalizedCanaryInput;
use canary_core::PublicSnapshotReceipt;
use canary_core::RunMode;
use canary_core::RunNonce;
use canary_core::RunReport;
use canary_core::ValidatorFireRates;
use canary_providers::GenerationServiceClient;
use canary_providers::SnapshotClient;
use canary_providers::StateStoreClient;
use canary_providers::TokenClassification;
use canary_providers::TraceStoreClient;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::clock::Clock;
use crate::error::RunnerError;
use crate::facts::CharacterFacts;
use crate::facts::fetch_character_facts;
use crate::invocation::InvocationOutcome;
use crate::invocation::invoke;
use crate::public_snapshot::fetch_public_snapshot;
use crate::remediation::run_remediation;
use crate::trace::fetch_trace;

/// Every external collaborator a single canary run needs.
pub struct RunnerCollaborators<'a> {
    /// Generation service (invocation + remediation).
    pub generation: &'a dyn GenerationServiceClient,
    /// Character/attempt state store.
    pub state_store: &'a dyn StateStoreClient,
    /// Public snapshot endpoint.
    pub snapshot: &'a dyn SnapshotClient,
    /// Trace store.
    pub trace_store: &'a dyn TraceStoreClient,
    /// Remediation poll clock.
    pub clock: &'a dyn Clock,
}

/// Everything specific to one canary invocation.
pub struct CanaryRunInputs<'a> {
    /// Canonicalized canary input, already resolved by `canary-canon`.
    pub normalized: &'a NormalizedCanaryInput,
    /// Execution mode.
    pub mode: RunMode,
    /// Run nonce shared by every canary in this invocation.
    pub run_nonce: RunNonce,
    /// Configured public asset host allowlist.
    pub allowed_asset_hosts: Vec<String>,
    /// Strict-mode setting for this run.
    pub strict: StrictMode,
    /// Public snapshot base path.
    pub snapshot_base_path: &'a str,
    /// Auth base path (also used as the public snapshot's 404 fallback).
    pub auth_base_path: &'a str,
    /// Classification of the access token used for this run.
    pub token: TokenClassification,
}

/// Outcome of running one canary: its finished, already-emitted report, and
/// whether the public-snapshot-receipt failure mode fired (spec.md §7: that
/// one failure mode ends the whole run after the current canary).
pub struct CanaryRunOutcome {
    /// The canary's finished report.
    pub report: RunReport,
    /// Whether the caller must stop running further canaries.
    pub abort_run: bool,
}

/// Runs steps A through G for one canary and emits its report (spec.md
/// §4.5).
///
/// # Errors
///
/// Returns [`RunnerError`] only if the artifact emitter itself fails to
/// write; every other failure mode this function observes is captured as an
/// [`AssertionError`] inside the emitted [`RunReport`] instead.
pub fn run_canary(
    collaborators: &RunnerCollaborators<'_>,
    inputs: &CanaryRunInputs<'_>,
    emitter: &mut ArtifactEmitter,
) -> Result<CanaryRunOutcome, RunnerError> {
    let started_at = timestamp();
    let mut instrumentation = Vec::new();
    let mut hard_fail = Vec::new();
    let mut soft_issues = Vec::new();

    let invocation = match invoke(
        collaborators.generation,
        collaborators.state_store,
        inputs.mode,
        inputs.normalized,
        &inputs.run_nonce,
    ) {
        Ok(outcome) => outcome,
        Err(err) => {
            instrumentation.push(AssertionError::new("invocation_failed", err.to_string()));
            return finish(
                emitter,
                inputs,
                started_at,
                None,
                instrumentation,
                hard_fail,
                soft_issues,
                AssetReport::default(),
                AssetReport::default(),
                ValidatorFireRates::default(),
                None,
                false,
            );
        }
    };
    let character_id = invocation.character_id.clone();

    let mut public_snapshot = None;
    let mut abort_run = false;
    match fetch_public_snapshot(
        collaborators.snapshot,
        inputs.snapshot_base_path,
        inputs.auth_base_path,
        character_id.as_str(),
        inputs.token.clone(),
    ) {
        Ok(outcome) => {
            public_snapshot = Some(outcome.receipt);
            if let Some(error) = outcome.instrumentation {
                instrumentation.push(error);
                abort_run = true;
            }
        }
        Err(err) => instrumentation.push(AssertionError::new("public_snapshot_fetch_failed", err.to_string())),
    }

    let mut facts = match fetch_character_facts(collaborators.state_store, &character_id) {
        Ok(facts) => facts,
        Err(err) => {
            instrumentation.push(AssertionError::new("character_facts_failed", err.to_string()));
            return finish(
                emitter,
                inputs,
                started_at,
                Some(character_id),
                instrumentation,
                hard_fail,
                soft_issues,
                AssetReport::default(),
                AssetReport::default(),
                ValidatorFireRates::default(),
                public_snapshot,
                abort_run,
            );
        }
    };

    let is_nonhuman = species::is_nonhuman(&facts.record.species, facts.record.species_descriptor.as_deref());
    let headshot_edits_exist = !facts.attempts.edits(AssetType::Headshot).is_empty();
    let bodyshot_edits_exist = !facts.attempts.edits(AssetType::Bodyshot).is_empty();
    let latest_headshot = facts.latest_attempt(AssetType::Headshot).cloned();
    let latest_bodyshot = facts.latest_attempt(AssetType::Bodyshot).cloned();

    match run_remediation(
        collaborators.generation,
        collaborators.state_store,
        collaborators.clock,
        &character_id,
        is_nonhuman,
        latest_headshot.as_ref(),
        latest_bodyshot.as_ref(),
        headshot_edits_exist,
        bodyshot_edits_exist,
    ) {
        Ok(outcome) => {
            let remediated = outcome.headshot.edit_attempt.is_some() || outcome.bodyshot.edit_attempt.is_some();
            if let Some(error) = outcome.headshot.instrumentation {
                instrumentation.push(error);
            }
            if let Some(error) = outcome.bodyshot.instrumentation {
                instrumentation.push(error);
            }
            if remediated {
                match fetch_character_facts(collaborators.state_store, &character_id) {
                    Ok(refreshed) => facts = refreshed,
                    Err(err) => {
                        instrumentation.push(AssertionError::new("character_facts_refetch_failed", err.to_string()));
                    }
                }
            }
        }
        Err(err) => instrumentation.push(AssertionError::new("remediation_failed", err.to_string())),
    }

    let (headshot_context, headshot_report) =
        build_asset(collaborators.trace_store, &facts, &invocation, AssetType::Headshot);
    let (bodyshot_context, bodyshot_report) =
        build_asset(collaborators.trace_store, &facts, &invocation, AssetType::Bodyshot);
    let validator_fire_rates = compute_fire_rates(&headshot_report, &bodyshot_report);

    let ctx = AssertionContext {
        allowed_asset_hosts: inputs.allowed_asset_hosts.clone(),
        require_limb_difference: inputs.normalized.expectations.require_limb_difference,
        require_wheelchair_presence: inputs.normalized.expectations.require_wheelchair_presence,
        require_species_truthiness: inputs.normalized.expectations.require_species_truthiness,
        require_support_world_fit: inputs.normalized.expectations.require_support_world_fit,
        character_state: facts.record.character_state.clone(),
        is_nonhuman,
        strict: inputs.strict,
        headshot: headshot_context,
        bodyshot: bodyshot_context,
    };

    let kernel = run_kernel(&ctx);
    instrumentation.extend(kernel.instrumentation);
    hard_fail.extend(kernel.hard_fail);
    soft_issues.extend(kernel.soft_issues);

    finish(
        emitter,
        inputs,
        started_at,
        Some(character_id),
        instrumentation,
        hard_fail,
        soft_issues,
        headshot_report,
        bodyshot_report,
        validator_fire_rates,
        public_snapshot,
        abort_run,
    )
}

/// Resolves an asset's context (for the kernel) and report (for the
/// artifact) from the character's current facts (spec.md §4.5 step C-D).
fn build_asset(
    trace_store: &dyn TraceStoreClient,
    facts: &CharacterFacts,
    invocation: &InvocationOutcome,
    asset_type: AssetType,
) -> (AssetContext, AssetReport) {
    let resolved = facts.record.resolved_asset(asset_type);
    let status = facts.record.status_for(asset_type).map(ToString::to_string);
    let invocation_image = invocation.images.iter().find(|entry| entry.asset_type == asset_type).map(|entry| {
        InvocationImageFacts {
            url: entry.url.clone(),
            trace_url: entry.trace_url.clone(),
            prompt_hash: entry.prompt_hash.clone(),
            openai_request_id: entry.openai_request_id.clone(),
        }
    });

    let mut attempt = facts.latest_attempt(asset_type).cloned();
    let trace_fetch = fetch_trace(trace_store, attempt.as_ref().and_then(|a| a.trace_url.as_deref()));
    if let Some(attempt) = attempt.as_mut() {
        if attempt.validation_summary.is_none() {
            attempt.validation_summary = trace_fetch.validation_summary.clone();
        }
    }

    let edit_attempts: Vec<AttemptRecord> = facts
        .attempts
        .edits(asset_type)
        .into_iter()
        .cloned()
        .map(|mut edit| {
            if edit.validation_summary.is_none() {
                let fetch = fetch_trace(trace_store, edit.trace_url.as_deref());
                edit.validation_summary = fetch.validation_summary;
            }
            edit
        })
        .collect();

    let mut attempts_for_report: Vec<AttemptRecord> =
        facts.attempts.all().iter().filter(|a| a.asset_type == asset_type).cloned().collect();
    attempts_for_report.sort_by_key(|a| std::cmp::Reverse(a.sort_index()));
    if let Some(current) = attempt.as_ref() {
        if let Some(slot) = attempts_for_report.iter_mut().find(|a| a.id == current.id) {
            slot.validation_summary = current.validation_summary.clone();
        }
    }
    for edit in &edit_attempts {
        if let Some(slot) = attempts_for_report.iter_mut().find(|a| a.id == edit.id) {
            slot.validation_summary = edit.validation_summary.clone();
        }
    }
    let validation_summaries = attempts_for_report.iter().map(|a| a.validation_summary.clone()).collect();

    let asset_report = AssetReport {
        url: resolved.url.clone(),
        trace_url: resolved.trace_url.clone(),
        prompt_hash: resolved.prompt_hash.clone(),
        status: status.clone(),
        attempts: attempts_for_report,
        validation_summaries,
    };

    let asset_context =
        AssetContext { attempt, resolved, status, invocation_image, trace_raw: trace_fetch.raw, edit_attempts };

    (asset_context, asset_report)
}

/// Summarizes how often attempts carried a failure code, across both assets
/// (spec.md §3, "validator fire-rate stats").
fn compute_fire_rates(headshot: &AssetReport, bodyshot: &AssetReport) -> ValidatorFireRates {
    let all_attempts = headshot.attempts.iter().chain(bodyshot.attempts.iter());
    let attempts_observed = u32::try_from(headshot.attempts.len() + bodyshot.attempts.len()).unwrap_or(u32::MAX);
    let attempts_with_failure_codes =
        u32::try_from(all_attempts.filter(|attempt| !attempt.failure_codes.is_empty()).count()).unwrap_or(u32::MAX);
    ValidatorFireRates { attempts_observed, attempts_with_failure_codes }
}

/// Assembles the final [`RunReport`], emits it, and emits every recorded
/// attempt (spec.md §4.5 step G, §4.7).
#[allow(clippy::too_many_arguments, reason = "one field per RunReport component; a builder would not clarify this")]
fn finish(
    emitter: &mut ArtifactEmitter,
    inputs: &CanaryRunInputs<'_>,
    started_at: String,
    character_id: Option<CharacterId>,
    instrumentation: Vec<AssertionError>,
    hard_fail: Vec<AssertionError>,
    soft_issues: Vec<AssertionError>,
    headshot: AssetReport,
    bodyshot: AssetReport,
    validator_fire_rates: ValidatorFireRates,
    public_snapshot: Option<PublicSnapshotReceipt>,
    abort_run: bool,
) -> Result<CanaryRunOutcome, RunnerError> {
    let status = RunReport::verdict(&instrumentation, &hard_fail);
    let report = RunReport {
        run_nonce: inputs.run_nonce.clone(),
        canary_id: inputs.normalized.id.clone(),
        started_at,
        finished_at: timestamp(),
        normalized_input: inputs.normalized.clone(),
        mode: inputs.mode,
        status,
        instrumentation,
        hard_fail,
        soft_issues,
        character_id: character_id.clone(),
        headshot,
        bodyshot,
        validator_fire_rates,
        public_snapshot,
    };

    emitter.record_run_summary(&report)?;

    if let Some(character_id) = character_id.as_ref() {
        record_attempts(emitter, character_id, AssetType::Headshot, &report.headshot)?;
        record_attempts(emitter, character_id, AssetType::Bodyshot, &report.bodyshot)?;
    }

    Ok(CanaryRunOutcome { report, abort_run })
}

/// Records every attempt for `asset_type`, or a single `no_attempts` entry
/// when there were none (spec.md §4.7).
fn record_attempts(
    emitter: &mut ArtifactEmitter,
    character_id: &CharacterId,
    asset_type: AssetType,
    asset_report: &AssetReport,
) -> Result<(), RunnerError> {
    if asset_report.attempts.is_empty() {
        emitter.record_no_attempts(character_id, asset_type)?;
        return Ok(());
    }
    for attempt in &asset_report.attempts {
        emitter.record_attempt(character_id, asset_type, attempt)?;
    }
    Ok(())
}

/// Current time, formatted as RFC 3339 UTC, falling back to a fixed sentinel
/// if formatting ever fails (it practically never does for `now_utc`).
fn timestamp() -> String {
    OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}
