// canary-core/src/model/report.rs
// ============================================================================
// Module: Run Report
// Description: Per-canary verdict emitted to the artifact JSONL.
// Purpose: Collect the three non-overlapping error lists and every resolved
//          fact about a canary's generation into one serializable record.
// Dependencies: serde, crate::model
// ============================================================================

//! ## Overview
//! `RunReport` is assembled once per canary, at the end of the canary runner's
//! step G (spec.md §4.5). `status` is `Fail` whenever `hard_fail` or
//! `instrumentation` is non-empty; `soft_issues` never affects the verdict
//! (spec.md §4.6, "Verdict").

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::ids::CanaryId;
use crate::ids::CharacterId;
use crate::ids::RunNonce;
use crate::model::attempt::AssetType;
use crate::model::attempt::AttemptRecord;
use crate::model::attempt::ValidationSummary;
use crate::model::normalized::NormalizedCanaryInput;

/// Canary execution mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Exercises `complete_character_creation_with_visuals` end to end.
    E2e,
    /// Inserts a character row directly and exercises `generate_character_art`.
    Component,
}

impl RunMode {
    /// Parses a CLI `--mode` value, applying the `end-to-end` → `e2e` alias.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "e2e" | "end-to-end" => Some(Self::E2e),
            "component" => Some(Self::Component),
            _ => None,
        }
    }
}

/// Overall pass/fail verdict for one canary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictStatus {
    /// No hard failures or instrumentation errors were recorded.
    Pass,
    /// At least one hard failure or instrumentation error was recorded.
    Fail,
}

/// One entry in a `RunReport`'s instrumentation/hard-fail/soft-issue lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssertionError {
    /// Stable machine-readable code for this error, e.g. `url_not_allowed`.
    pub code: String,
    /// Human-readable message, suitable for direct display in the review
    /// pack.
    pub message: String,
    /// Asset this error pertains to, if any.
    pub asset: Option<AssetType>,
}

impl AssertionError {
    /// Builds an error with no associated asset.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self { code: code.into(), message: message.into(), asset: None }
    }

    /// Builds an error associated with a specific asset.
    #[must_use]
    pub fn for_asset(code: impl Into<String>, message: impl Into<String>, asset: AssetType) -> Self {
        Self { code: code.into(), message: message.into(), asset: Some(asset) }
    }
}

/// Per-asset public facts resolved during the canary run, for reporting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetReport {
    /// Resolved asset URL.
    pub url: Option<String>,
    /// Resolved trace URL.
    pub trace_url: Option<String>,
    /// Resolved prompt hash.
    pub prompt_hash: Option<String>,
    /// Generation status string.
    pub status: Option<String>,
    /// Attempts recorded for this asset, newest first.
    pub attempts: Vec<AttemptRecord>,
    /// Validation summaries fetched for this asset's attempts, in the same
    /// order as `attempts`.
    pub validation_summaries: Vec<Option<ValidationSummary>>,
}

/// Receipt of the public snapshot endpoint probe (spec.md §4.5 step B).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicSnapshotReceipt {
    /// URL actually requested.
    pub url: String,
    /// HTTP status code returned.
    pub status: u16,
    /// Whether the response was treated as successful.
    pub ok: bool,
    /// Which path prefix produced this receipt (`snapshotBasePath` or
    /// `authBasePath`).
    pub prefix: String,
}

/// Validator fire-rate statistics summarized for review (not specified
/// beyond "validator fire-rate stats" in spec.md §3; recorded as simple
/// per-code counters here).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorFireRates {
    /// Number of attempts observed for this canary.
    pub attempts_observed: u32,
    /// Number of attempts carrying at least one failure code.
    pub attempts_with_failure_codes: u32,
}

/// The per-canary verdict emitted to the artifact JSONL.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// Run identifier shared by every canary in this invocation (the run
    /// nonce).
    pub run_nonce: RunNonce,
    /// Canary identifier this report describes.
    pub canary_id: CanaryId,
    /// Run start timestamp (ISO 8601, UTC).
    pub started_at: String,
    /// Run finish timestamp (ISO 8601, UTC).
    pub finished_at: String,
    /// Canonicalized canary input used for this run.
    pub normalized_input: NormalizedCanaryInput,
    /// Execution mode.
    pub mode: RunMode,
    /// Overall verdict.
    pub status: VerdictStatus,
    /// The canary's observability was broken.
    pub instrumentation: Vec<AssertionError>,
    /// The pipeline violated a contractual expectation.
    pub hard_fail: Vec<AssertionError>,
    /// Non-blocking divergences.
    pub soft_issues: Vec<AssertionError>,
    /// Resolved character id, when one was created.
    pub character_id: Option<CharacterId>,
    /// Headshot facts.
    pub headshot: AssetReport,
    /// Bodyshot facts.
    pub bodyshot: AssetReport,
    /// Validator fire-rate statistics.
    pub validator_fire_rates: ValidatorFireRates,
    /// Public snapshot receipt, when the probe ran.
    pub public_snapshot: Option<PublicSnapshotReceipt>,
}

impl RunReport {
    /// Computes the verdict from the three error lists (spec.md §4.6,
    /// "Verdict: if any hard_fail OR instrumentation error is present the
    /// canary is fail; soft_issues never fail").
    #[must_use]
    pub fn verdict(instrumentation: &[AssertionError], hard_fail: &[AssertionError]) -> VerdictStatus {
        if instrumentation.is_empty() && hard_fail.is_empty() {
            VerdictStatus::Pass
        } else {
            VerdictStatus::Fail
        }
    }
}
