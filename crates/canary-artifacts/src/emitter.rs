// canary-artifacts/src/emitter.rs
// ============================================================================
// Module: Artifact Emitter
// Description: Opens the five artifact files and writes run-summary,
//              attempt-review, and no-attempts entries to them (spec.md
//              §4.7).
// Purpose: Give the canary runner one object that owns every open file
//          handle and every heading/line format, so call sites never touch
//          `std::fs` directly.
// Dependencies: canary-core, serde_json, std::fs
// ============================================================================

use std::fs::File;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use canary_core::AssetType;
use canary_core::AttemptRecord;
use canary_core::CanaryId;
use canary_core::CharacterId;
use canary_core::RunReport;
use serde::Serialize;

use crate::error::ArtifactError;
use crate::header::ReviewHeader;
use crate::paths::ArtifactPaths;

/// One attempt-review line written to `attempts_jsonl` (spec.md §4.7).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct AttemptReviewLine<'a> {
    /// Character this attempt belongs to.
    character_id: &'a CharacterId,
    /// Asset type this attempt generated.
    asset_type: AssetType,
    /// The attempt record itself.
    attempt: &'a AttemptRecord,
}

/// A `no_attempts` line written to `attempts_jsonl` when an asset has no
/// recorded attempts at all (spec.md §4.7).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct NoAttemptsLine<'a> {
    /// Character this entry concerns.
    character_id: &'a CharacterId,
    /// Asset type that had no attempts.
    asset_type: AssetType,
    /// Always `true`, present so an `attempts_jsonl` reader can tell a
    /// `no_attempts` line apart from an [`AttemptReviewLine`] without
    /// looking for the absence of an `attempt` field.
    no_attempts: bool,
}

/// Owns every open artifact file handle for one run and writes every entry
/// in the exact heading/line formats spec.md §4.7 names.
pub struct ArtifactEmitter {
    canary_jsonl: File,
    canary_markdown: File,
    attempts_jsonl: File,
    review_markdown_latest: File,
    review_markdown_per_run: File,
}

impl ArtifactEmitter {
    /// Opens all five artifact files, truncating and stamping a header on
    /// the two review markdown files (spec.md §4.7: the "latest" review
    /// markdown is re-initialized at the start of every run; the per-run
    /// file is always new).
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::Open`] if any file cannot be opened, or
    /// [`ArtifactError::Write`] if a header cannot be written.
    pub fn open(paths: &ArtifactPaths, header: &ReviewHeader<'_>) -> Result<Self, ArtifactError> {
        let canary_jsonl = open_append(&paths.canary_jsonl)?;
        let canary_markdown = open_append(&paths.canary_markdown)?;
        let attempts_jsonl = open_append(&paths.attempts_jsonl)?;
        let mut review_markdown_latest = open_truncate(&paths.review_markdown_latest)?;
        let mut review_markdown_per_run = open_truncate(&paths.review_markdown_per_run)?;

        let rendered_header = header.render();
        write_all(&mut review_markdown_latest, &paths.review_markdown_latest, &rendered_header)?;
        write_all(&mut review_markdown_per_run, &paths.review_markdown_per_run, &rendered_header)?;

        Ok(Self { canary_jsonl, canary_markdown, attempts_jsonl, review_markdown_latest, review_markdown_per_run })
    }

    /// Records a canary's final verdict: one JSON line to `canary_jsonl` and
    /// one `## <id> / run_summary` block appended to `canary_markdown`.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::Serialize`] if the report cannot be encoded,
    /// or [`ArtifactError::Write`] if either file write fails.
    pub fn record_run_summary(&mut self, report: &RunReport) -> Result<(), ArtifactError> {
        let line = serde_json::to_string(report).map_err(|err| ArtifactError::Serialize(err.to_string()))?;
        write_line(&mut self.canary_jsonl, &self.canary_jsonl_path_label(), &line)?;

        let block = format!(
            "## {} / run_summary\n\n- status: {:?}\n- hard_fail: {}\n- instrumentation: {}\n- soft_issues: {}\n\n",
            report.canary_id,
            report.status,
            report.hard_fail.len(),
            report.instrumentation.len(),
            report.soft_issues.len(),
        );
        write_all(&mut self.canary_markdown, &self.canary_markdown_path_label(), &block)
    }

    /// Records one attempt: a JSON line to `attempts_jsonl`, and a
    /// `## <character-id> / <asset-type> / attempt <n>` block appended to
    /// both review markdown files.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::Serialize`] or [`ArtifactError::Write`].
    pub fn record_attempt(
        &mut self,
        character_id: &CharacterId,
        asset_type: AssetType,
        attempt: &AttemptRecord,
    ) -> Result<(), ArtifactError> {
        let entry = AttemptReviewLine { character_id, asset_type, attempt };
        let line = serde_json::to_string(&entry).map_err(|err| ArtifactError::Serialize(err.to_string()))?;
        write_line(&mut self.attempts_jsonl, &self.attempts_jsonl_path_label(), &line)?;

        let block = format!(
            "## {character_id} / {asset_type} / attempt {index}\n\n- status: {status:?}\n- image_url: {image_url}\n- failure_codes: {failure_codes}\n\n",
            index = attempt.sort_index(),
            status = attempt.status,
            image_url = attempt.image_url.as_deref().unwrap_or("(none)"),
            failure_codes = if attempt.failure_codes.is_empty() {
                "(none)".to_string()
            } else {
                attempt.failure_codes.join(", ")
            },
        );
        self.append_to_both_review_files(&block)
    }

    /// Records that `asset_type` had no attempts at all: a `no_attempts`
    /// JSON line to `attempts_jsonl`, and a `## <character-id> / no_attempts`
    /// block appended to both review markdown files.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::Serialize`] or [`ArtifactError::Write`].
    pub fn record_no_attempts(&mut self, character_id: &CharacterId, asset_type: AssetType) -> Result<(), ArtifactError> {
        let entry = NoAttemptsLine { character_id, asset_type, no_attempts: true };
        let line = serde_json::to_string(&entry).map_err(|err| ArtifactError::Serialize(err.to_string()))?;
        write_line(&mut self.attempts_jsonl, &self.attempts_jsonl_path_label(), &line)?;

        let block = format!("## {character_id} / no_attempts\n\n- asset_type: {asset_type}\n\n");
        self.append_to_both_review_files(&block)
    }

    /// Appends `block` to both the "latest" and per-run review markdown
    /// files, since every attempt-review entry is mirrored to each.
    fn append_to_both_review_files(&mut self, block: &str) -> Result<(), ArtifactError> {
        write_all(&mut self.review_markdown_latest, &self.review_markdown_latest_path_label(), block)?;
        write_all(&mut self.review_markdown_per_run, &self.review_markdown_per_run_path_label(), block)
    }

    /// Label used in error messages; kept as a method since the path is
    /// only known to the file handles' owner, not a static string.
    fn canary_jsonl_path_label(&self) -> String {
        "canary-report.jsonl".to_string()
    }

    /// See [`Self::canary_jsonl_path_label`].
    fn canary_markdown_path_label(&self) -> String {
        "canary-report.md".to_string()
    }

    /// See [`Self::canary_jsonl_path_label`].
    fn attempts_jsonl_path_label(&self) -> String {
        "canary-attempts.jsonl".to_string()
    }

    /// See [`Self::canary_jsonl_path_label`].
    fn review_markdown_latest_path_label(&self) -> String {
        "canary-review.md".to_string()
    }

    /// See [`Self::canary_jsonl_path_label`].
    fn review_markdown_per_run_path_label(&self) -> String {
        "canary-review-<run>.md".to_string()
    }
}

/// Opens `path` for append, creating it if absent.
fn open_append(path: &Path) -> Result<File, ArtifactError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|err| ArtifactError::Open { path: path.display().to_string(), message: err.to_string() })
}

/// Opens `path` for a fresh write, truncating any existing content.
fn open_truncate(path: &Path) -> Result<File, ArtifactError> {
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .map_err(|err| ArtifactError::Open { path: path.display().to_string(), message: err.to_string() })
}

/// Writes `content` verbatim, with no trailing newline added.
fn write_all(file: &mut File, path_label: &str, content: &str) -> Result<(), ArtifactError> {
    file.write_all(content.as_bytes())
        .map_err(|err| ArtifactError::Write { path: path_label.to_string(), message: err.to_string() })
}

/// Writes `line` followed by a single newline, for JSONL files.
fn write_line(file: &mut File, path_label: &str, line: &str) -> Result<(), ArtifactError> {
    writeln!(file, "{line}").map_err(|err| ArtifactError::Write { path: path_label.to_string(), message: err.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use canary_core::AttemptId;
    use canary_core::AttemptStatus;
    use canary_core::RunNonce;
    use std::fs;

    fn temp_paths() -> (tempfile::TempDir, ArtifactPaths) {
        let dir = tempfile::tempdir().expect("tempdir");
        let nonce = RunNonce::new("nonce-1");
        let paths = ArtifactPaths {
            canary_jsonl: dir.path().join("canary.jsonl"),
            canary_markdown: dir.path().join("canary.md"),
            attempts_jsonl: dir.path().join("attempts.jsonl"),
            review_markdown_latest: dir.path().join("review.md"),
            review_markdown_per_run: dir.path().join(format!("review-{}.md", nonce.as_str())),
        };
        (dir, paths)
    }

    fn header<'a>() -> ReviewHeader<'a> {
        ReviewHeader {
            run_nonce: "nonce-1",
            environment: "staging",
            environment_inferred: false,
            mode: "e2e",
            api_base_url: "https://api.example.com",
            auth_base_path: "/api/v1",
            snapshot_base_path: "/api/v1/public",
            invocation_target: "local",
            invocation_target_source: "default",
        }
    }

    fn attempt() -> AttemptRecord {
        AttemptRecord {
            id: AttemptId::new("attempt-1"),
            character_id: CharacterId::new("char-1"),
            asset_type: AssetType::Headshot,
            attempt_index: Some(0),
            status: AttemptStatus::Ok,
            image_url: Some("https://cdn.example.com/a.png".to_string()),
            fail_image_url: None,
            trace_url: None,
            openai_request_id: None,
            failure_codes: Vec::new(),
            failure_reason: None,
            validation_summary: None,
            fix_of_attempt_id: None,
            created_at: None,
        }
    }

    #[test]
    fn open_stamps_header_on_both_review_files_only() {
        let (_dir, paths) = temp_paths();
        let header = header();
        let _emitter = ArtifactEmitter::open(&paths, &header).expect("open must succeed");
        let latest = fs::read_to_string(&paths.review_markdown_latest).expect("read latest");
        let per_run = fs::read_to_string(&paths.review_markdown_per_run).expect("read per-run");
        assert!(latest.contains("run-nonce: nonce-1"));
        assert!(per_run.contains("run-nonce: nonce-1"));
        let canary_md = fs::read_to_string(&paths.canary_markdown).expect("read canary markdown");
        assert!(canary_md.is_empty());
    }

    #[test]
    fn record_attempt_writes_heading_to_both_review_files_and_jsonl() {
        let (_dir, paths) = temp_paths();
        let header = header();
        let mut emitter = ArtifactEmitter::open(&paths, &header).expect("open must succeed");
        let character_id = CharacterId::new("char-1");
        emitter.record_attempt(&character_id, AssetType::Headshot, &attempt()).expect("record must succeed");

        let attempts_jsonl = fs::read_to_string(&paths.attempts_jsonl).expect("read attempts jsonl");
        assert_eq!(attempts_jsonl.lines().count(), 1);
        assert!(attempts_jsonl.contains("\"characterId\":\"char-1\""));

        let latest = fs::read_to_string(&paths.review_markdown_latest).expect("read latest");
        assert!(latest.contains("## char-1 / headshot / attempt 0"));
    }

    #[test]
    fn record_no_attempts_writes_heading_with_no_asset_in_title() {
        let (_dir, paths) = temp_paths();
        let header = header();
        let mut emitter = ArtifactEmitter::open(&paths, &header).expect("open must succeed");
        let character_id = CharacterId::new("char-2");
        emitter.record_no_attempts(&character_id, AssetType::Bodyshot).expect("record must succeed");

        let latest = fs::read_to_string(&paths.review_markdown_latest).expect("read latest");
        assert!(latest.contains("## char-2 / no_attempts"));
        let attempts_jsonl = fs::read_to_string(&paths.attempts_jsonl).expect("read attempts jsonl");
        assert!(attempts_jsonl.contains("\"noAttempts\":true"));
    }

    #[test]
    fn canary_markdown_is_append_only_across_opens() {
        let (_dir, paths) = temp_paths();
        let header = header();
        {
            let mut emitter = ArtifactEmitter::open(&paths, &header).expect("open 1");
            let report = sample_report();
            emitter.record_run_summary(&report).expect("record 1");
        }
        {
            let mut emitter = ArtifactEmitter::open(&paths, &header).expect("open 2");
            let report = sample_report();
            emitter.record_run_summary(&report).expect("record 2");
        }
        let canary_md = fs::read_to_string(&paths.canary_markdown).expect("read canary markdown");
        assert_eq!(canary_md.matches("run_summary").count(), 2);
    }

    fn sample_report() -> RunReport {
        use canary_core::AssetReport;
        use canary_core::CanaryId;
        use canary_core::Expectations;
        use canary_core::NormalizedCanaryInput;
        use canary_core::RunMode;
        use canary_core::ValidatorFireRates;
        use canary_core::VerdictStatus;
        use std::collections::BTreeMap;

        let normalized_input = NormalizedCanaryInput {
            id: CanaryId::new("canary-1"),
            display_name: "Sample Canary".to_string(),
            age: 12,
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
        };

        RunReport {
            run_nonce: RunNonce::new("nonce-1"),
            canary_id: CanaryId::new("canary-1"),
            started_at: "2026-07-28T00:00:00Z".to_string(),
            finished_at: "2026-07-28T00:01:00Z".to_string(),
            normalized_input,
            mode: RunMode::E2e,
            status: VerdictStatus::Pass,
            instrumentation: Vec::new(),
            hard_fail: Vec::new(),
            soft_issues: Vec::new(),
            character_id: None,
            headshot: AssetReport::default(),
            bodyshot: AssetReport::default(),
            validator_fire_rates: ValidatorFireRates::default(),
            public_snapshot: None,
        }
    }
}
