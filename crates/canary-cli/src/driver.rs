// canary-cli/src/driver.rs
// ============================================================================
// Module: Driver
// Description: Selects the canary pool, runs preflight, loops canaries,
//              aggregates verdicts, and chooses the process exit code
//              (spec.md §2 "Driver", §6, §7).
// Purpose: The one place that wires every other crate together; everything
//          it calls is a pure function or a trait object, so this module's
//          own logic is just sequencing and I/O.
// Dependencies: canary-artifacts, canary-assert, canary-canon, canary-config,
//               canary-core, canary-preflight, canary-providers,
//               canary-runner, rand, serde_json, time
// ============================================================================

//! ## Overview
//! [`run`] is the whole program, minus argument parsing (that's [`crate::cli::Cli`])
//! and process-exit translation (that's `main`). It resolves config,
//! infers environment, runs preflight, validates and selects the canary
//! pool, runs each canary in sequence through `canary-runner`, and prints
//! the final JSON summary spec.md §7 requires.

use std::path::PathBuf;

use canary_artifacts::ArtifactEmitter;
use canary_artifacts::ArtifactError;
use canary_artifacts::ArtifactPaths;
use canary_artifacts::ReviewHeader;
use canary_assert::StrictMode;
use canary_canon::BuiltinDictionarySource;
use canary_canon::CanonicalDictionarySource;
use canary_canon::Domain;
use canary_canon::Resolver;
use canary_canon::normalize_canary;
use canary_canon::validate_canary_batch;
use canary_config::Environment;
use canary_config::GuardrailFlags;
use canary_config::SecretSpec;
use canary_config::Source;
use canary_config::resolve_required as resolve_secret;
use canary_core::RunMode;
use canary_core::RunNonce;
use canary_preflight::PreflightCollaborators;
use canary_preflight::PreflightError;
use canary_preflight::PreflightInputs;
use canary_preflight::run_preflight;
use canary_providers::HttpAdminClient;
use canary_providers::HttpAuthClient;
use canary_providers::HttpGenerationServiceClient;
use canary_providers::HttpParamStoreClient;
use canary_providers::HttpReadinessClient;
use canary_providers::HttpSnapshotClient;
use canary_providers::HttpStateStoreClient;
use canary_providers::HttpTraceStoreClient;
use canary_providers::TokenClassification;
use canary_runner::CanaryRunInputs;
use canary_runner::RunnerCollaborators;
use canary_runner::ThreadSleepClock;
use canary_runner::run_canary;
use rand::Rng;
use thiserror::Error;

use crate::cli::Cli;
use crate::pool::BuiltinCanaryPoolSource;
use crate::pool::CanaryPoolSource;
use crate::pool::FileCanaryPoolSource;
use crate::pool::apply_only_filter;
use crate::pool::resolve_selection;
use crate::report::StderrSink;
use crate::report::write_stdout_line;

const FIXTURES_PATH_ENV: &str = "CANARY_FIXTURES_PATH";

/// A fatal failure that ends the whole run before, or independent of, any
/// per-canary report (spec.md §7: config errors, preflight errors, and
/// authoring errors are all fatal at startup).
#[derive(Debug, Error)]
pub enum DriverError {
    /// `--mode` was not `e2e`/`end-to-end`/`component` (spec.md §6).
    #[error("unknown --mode value: {0}")]
    UnknownMode(String),
    /// `--env` was not `staging`/`production` (spec.md §4.3).
    #[error("unknown --env value: {0}")]
    UnknownEnv(String),
    /// `validate_canary_batch` rejected one or more authored canaries
    /// (spec.md §4.1, §7 "Authoring errors").
    #[error("canary authoring validation failed:\n{}", .0.join("\n"))]
    AuthoringInvalid(Vec<String>),
    /// A required config value could not be resolved, or a guardrail was
    /// violated (spec.md §7 "Config errors").
    #[error(transparent)]
    Config(#[from] canary_config::ConfigError),
    /// A preflight hard gate failed (spec.md §7 "Preflight errors").
    #[error(transparent)]
    Preflight(#[from] PreflightError),
    /// An artifact file could not be opened or written.
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
    /// The canary fixture pool could not be loaded.
    #[error(transparent)]
    Pool(#[from] crate::pool::PoolError),
    /// The HTTP client for one collaborator could not be constructed.
    #[error("failed to build HTTP client for {collaborator}: {message}")]
    ClientBuild {
        /// Which collaborator's client failed to build.
        collaborator: &'static str,
        /// The underlying construction error.
        message: String,
    },
}

/// Whether the driver finished cleanly, found a failing canary, or hit a
/// fatal error before any canary could run.
pub enum Outcome {
    /// Every selected canary passed.
    AllPassed,
    /// At least one selected canary failed.
    SomeFailed,
}

impl Outcome {
    /// The process exit code for this outcome (spec.md §6: 0 all pass, 1
    /// otherwise).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::AllPassed => 0,
            Self::SomeFailed => 1,
        }
    }
}

/// Runs the whole program: early-exit introspection flags, config
/// resolution, preflight, the canary loop, and the final summary.
///
/// # Errors
///
/// Returns [`DriverError`] for any fatal condition spec.md §7 lists as
/// fatal at startup. Per-canary failures are never an `Err` here; they are
/// captured in each canary's `RunReport` and reflected in [`Outcome`].
pub fn run(cli: &Cli) -> Result<Outcome, DriverError> {
    let dictionary = BuiltinDictionarySource.load().map_err(|err| DriverError::ClientBuild {
        collaborator: "canonical-dictionary",
        message: err.to_string(),
    })?;

    if cli.list_enums {
        print_enums(&dictionary);
        return Ok(Outcome::AllPassed);
    }
    if cli.list_traits {
        print_traits(&dictionary);
        return Ok(Outcome::AllPassed);
    }
    if let Some(value) = cli.resolve.as_ref() {
        print_resolution(&dictionary, value);
        return Ok(Outcome::AllPassed);
    }

    let mode = RunMode::parse(&cli.mode).ok_or_else(|| DriverError::UnknownMode(cli.mode.clone()))?;
    let explicit_env =
        cli.env.as_deref().map(|raw| Environment::parse(raw).ok_or_else(|| DriverError::UnknownEnv(raw.to_string()))).transpose()?;

    let selection = resolve_selection(cli.matrix, cli.targeted, cli.canonical);
    let pool_source: Box<dyn CanaryPoolSource> = match std::env::var(FIXTURES_PATH_ENV) {
        Ok(path) => Box::new(FileCanaryPoolSource::new(path)),
        Err(_) => Box::new(BuiltinCanaryPoolSource),
    };
    let full_pool = pool_source.load(selection)?;

    let authoring_errors = validate_canary_batch(&full_pool, &dictionary);
    if !authoring_errors.is_empty() {
        return Err(DriverError::AuthoringInvalid(authoring_errors));
    }

    let only_ids = cli.only_ids();
    let pool = apply_only_filter(full_pool, only_ids.as_deref());

    let sink = StderrSink;
    let run_nonce = RunNonce::new(random_nonce());

    let param_store_base_url = required_env("CANARY_PARAM_STORE_URL")?;
    let param_store_credential = required_env("CANARY_PARAM_STORE_CREDENTIAL")?;
    let param_store = HttpParamStoreClient::new(&param_store_base_url, &param_store_credential)
        .map_err(|message| DriverError::ClientBuild { collaborator: "parameter-store", message })?;

    let api_base_spec = SecretSpec::required("api_base_url", "CANARY_API_BASE_URL");
    let api_base_url = resolve_secret(&api_base_spec, &param_store, &sink)?.value;

    let param_store_prefix_spec = SecretSpec {
        name: "param_store_prefix".to_string(),
        env_var: "CANARY_PARAM_STORE_PREFIX".to_string(),
        param_paths: Vec::new(),
        fallback: Some("/canary".to_string()),
        required: true,
        secret: false,
    };
    let param_store_prefix = resolve_secret(&param_store_prefix_spec, &param_store, &sink)?.value;

    let environment = explicit_env.unwrap_or_else(|| canary_config::infer_env(&api_base_url));
    let environment_inferred = explicit_env.is_none();

    let invocation_target_spec = SecretSpec {
        name: "invocation_target".to_string(),
        env_var: "CANARY_INVOCATION_TARGET".to_string(),
        param_paths: vec![format!("{param_store_prefix}/invocation_target")],
        fallback: Some("canary-run".to_string()),
        required: true,
        secret: false,
    };
    let invocation_target_resolved = resolve_secret(&invocation_target_spec, &param_store, &sink)?;
    let invocation_target = invocation_target_resolved.value;
    let invocation_target_source = invocation_target_resolved.source.to_string();

    let state_store_url_spec = SecretSpec::required("state_store_url", "CANARY_STATE_STORE_URL");
    let state_store_url = resolve_secret(&state_store_url_spec, &param_store, &sink)?.value;
    let state_store_credential_spec = SecretSpec {
        name: "state_store_credential".to_string(),
        env_var: "CANARY_STATE_STORE_CREDENTIAL".to_string(),
        param_paths: vec![format!("{param_store_prefix}/state_store/service_credential")],
        fallback: None,
        required: true,
        secret: true,
    };
    let state_store_credential = resolve_secret(&state_store_credential_spec, &param_store, &sink)?.value;

    let snapshot_base_path_spec = SecretSpec {
        name: "snapshot_base_path".to_string(),
        env_var: "CANARY_SNAPSHOT_BASE_PATH".to_string(),
        param_paths: Vec::new(),
        fallback: Some("/public/v1".to_string()),
        required: true,
        secret: false,
    };
    let snapshot_base_path = resolve_secret(&snapshot_base_path_spec, &param_store, &sink)?.value;

    let allowed_hosts_spec = SecretSpec {
        name: "allowed_asset_hosts".to_string(),
        env_var: "CANARY_ALLOWED_ASSET_HOSTS".to_string(),
        param_paths: vec![format!("{param_store_prefix}/allowed_asset_hosts")],
        fallback: Some("*.example.com,s3.amazonaws.com".to_string()),
        required: true,
        secret: false,
    };
    let allowed_asset_hosts_raw = resolve_secret(&allowed_hosts_spec, &param_store, &sink)?.value;
    let allowed_asset_hosts: Vec<String> = if cli.force_bad_host {
        vec!["bad.example.com".to_string()]
    } else {
        allowed_asset_hosts_raw.split(',').map(str::trim).filter(|host| !host.is_empty()).map(str::to_string).collect()
    };

    let readiness = HttpReadinessClient::new(&api_base_url)
        .map_err(|err| DriverError::ClientBuild { collaborator: "readiness", message: err.to_string() })?;
    let auth = HttpAuthClient::new(&api_base_url)
        .map_err(|err| DriverError::ClientBuild { collaborator: "auth", message: err.to_string() })?;
    let admin_credential_spec = SecretSpec {
        name: "admin_credential".to_string(),
        env_var: "CANARY_ADMIN_CREDENTIAL".to_string(),
        param_paths: vec![format!("{param_store_prefix}/admin/service_credential")],
        fallback: None,
        required: true,
        secret: true,
    };
    let admin_credential = resolve_secret(&admin_credential_spec, &param_store, &sink)?.value;
    let admin = HttpAdminClient::new(&api_base_url, &admin_credential)
        .map_err(|err| DriverError::ClientBuild { collaborator: "admin", message: err.to_string() })?;
    let state_store = HttpStateStoreClient::new(&state_store_url, &state_store_credential)
        .map_err(|err| DriverError::ClientBuild { collaborator: "state-store", message: err.to_string() })?;

    let preflight_collaborators = PreflightCollaborators {
        readiness: &readiness,
        auth: &auth,
        admin: &admin,
        state_store: &state_store,
        secret_source: &param_store,
        sink: &sink,
    };
    let preflight_inputs = PreflightInputs {
        api_base_url: &api_base_url,
        param_store_prefix: &param_store_prefix,
        recovery_dir: &recovery_dir(),
        environment,
        invocation_target: &invocation_target,
        guardrail_flags: GuardrailFlags {
            confirm_production: cli.confirm_production,
            ensure_canary_user: cli.ensure_canary_user,
            allow_prod_ensure_user: cli.allow_prod_ensure_user,
        },
        canary_email_flag: cli.canary_email.as_deref(),
        canary_password_flag: cli.canary_password.as_deref(),
        skip_auth_preflight: cli.skip_auth_preflight,
        generated_password_seed: random_password_seed(),
    };

    let preflight = run_preflight(&preflight_collaborators, &preflight_inputs)?;

    canary_config::persist_if_requested(&invocation_target_spec, &invocation_target_resolved, &param_store, cli.persist_ssm)?;

    if cli.preflight_only {
        write_stdout_line(&serde_json::json!({ "preflightOnly": true, "status": "passed" }).to_string());
        return Ok(Outcome::AllPassed);
    }

    let Some(auth_preflight) = preflight.auth_preflight else {
        write_stdout_line(&serde_json::json!({ "status": "passed", "authPreflight": "skipped", "canaries": [] }).to_string());
        return Ok(Outcome::AllPassed);
    };

    let generation = HttpGenerationServiceClient::new(&api_base_url, &auth_preflight.access_token)
        .map_err(|err| DriverError::ClientBuild { collaborator: "generation", message: err.to_string() })?;
    let snapshot = HttpSnapshotClient::new(&api_base_url, &auth_preflight.access_token)
        .map_err(|err| DriverError::ClientBuild { collaborator: "snapshot", message: err.to_string() })?;
    let trace_store = HttpTraceStoreClient::new()
        .map_err(|message| DriverError::ClientBuild { collaborator: "trace-store", message })?;
    let clock = ThreadSleepClock;

    let paths = ArtifactPaths::resolve(&run_nonce);
    let header = ReviewHeader {
        run_nonce: run_nonce.as_str(),
        environment: environment_label(environment),
        environment_inferred,
        mode: mode_label(mode),
        api_base_url: &api_base_url,
        auth_base_path: &preflight.auth_base_path,
        snapshot_base_path: &snapshot_base_path,
        invocation_target: &invocation_target,
        invocation_target_source: &invocation_target_source,
    };
    let mut emitter = ArtifactEmitter::open(&paths, &header)?;

    let strict = if cli.strict { StrictMode::Strict } else { StrictMode::Lenient };
    let token = TokenClassification { kind: auth_preflight.token_kind.clone(), issuer: auth_preflight.issuer.clone() };

    let runner_collaborators =
        RunnerCollaborators { generation: &generation, state_store: &state_store, snapshot: &snapshot, trace_store: &trace_store, clock: &clock };

    let mut reports = Vec::with_capacity(pool.len());
    let mut any_failed = false;
    for canary in &pool {
        let normalized = normalize_canary(canary, &dictionary);
        let inputs = CanaryRunInputs {
            normalized: &normalized,
            mode,
            run_nonce: run_nonce.clone(),
            allowed_asset_hosts: allowed_asset_hosts.clone(),
            strict,
            snapshot_base_path: &snapshot_base_path,
            auth_base_path: &preflight.auth_base_path,
            token: token.clone(),
        };
        let outcome = run_canary(&runner_collaborators, &inputs, &mut emitter)?;
        if matches!(outcome.report.status, canary_core::VerdictStatus::Fail) {
            any_failed = true;
        }
        let stop = outcome.abort_run;
        reports.push(outcome.report);
        if stop {
            sink.log("stopping run: public snapshot receipt failure (spec.md §7)");
            break;
        }
    }

    write_stdout_line(&summary_json(&reports).to_string());

    Ok(if any_failed { Outcome::SomeFailed } else { Outcome::AllPassed })
}

fn summary_json(reports: &[canary_core::RunReport]) -> serde_json::Value {
    let canaries: Vec<serde_json::Value> = reports
        .iter()
        .map(|report| {
            serde_json::json!({
                "id": report.canary_id.as_str(),
                "status": report.status,
                "instrumentationErrors": report.instrumentation,
                "hardFailErrors": report.hard_fail,
                "softIssues": report.soft_issues,
            })
        })
        .collect();
    serde_json::json!({ "canaries": canaries })
}

fn print_enums(dictionary: &canary_canon::CanonicalDictionary) {
    let resolver = Resolver::new(dictionary);
    for domain in [
        Domain::Species,
        Domain::Gender,
        Domain::Ethnicity,
        Domain::Language,
        Domain::PersonalityTrait,
        Domain::AgeBucket,
        Domain::InclusivityTrait,
    ] {
        let keys = resolver.enumerate(domain).join(", ");
        write_stdout_line(&format!("{}: {keys}", domain.field_name()));
    }
}

fn print_traits(dictionary: &canary_canon::CanonicalDictionary) {
    let resolver = Resolver::new(dictionary);
    write_stdout_line(&format!("personalityTraits: {}", resolver.enumerate(Domain::PersonalityTrait).join(", ")));
    write_stdout_line(&format!("inclusivityTraits: {}", resolver.enumerate(Domain::InclusivityTrait).join(", ")));
}

fn print_resolution(dictionary: &canary_canon::CanonicalDictionary, value: &str) {
    let resolver = Resolver::new(dictionary);
    for domain in [
        Domain::Species,
        Domain::Gender,
        Domain::Ethnicity,
        Domain::Language,
        Domain::PersonalityTrait,
        Domain::AgeBucket,
        Domain::InclusivityTrait,
    ] {
        match resolver.resolve(domain, value) {
            Some(resolution) => write_stdout_line(&format!(
                "{}: {} (alias: {})",
                domain.field_name(),
                resolution.value,
                resolution.is_alias
            )),
            None => {
                let suggestions = resolver.closest(domain, value, 3).join(", ");
                write_stdout_line(&format!("{}: no match (closest: {suggestions})", domain.field_name()));
            }
        }
    }
}

fn required_env(var: &str) -> Result<String, DriverError> {
    std::env::var(var).map_err(|_| {
        DriverError::Config(canary_config::ConfigError::MissingRequired {
            name: var.to_string(),
            attempted: format!("env {var}"),
        })
    })
}

fn recovery_dir() -> PathBuf {
    std::env::var("CANARY_RECOVERY_DIR").map(PathBuf::from).unwrap_or_else(|_| std::env::temp_dir().join("canary-recovery"))
}

fn environment_label(environment: Environment) -> &'static str {
    match environment {
        Environment::Staging => "staging",
        Environment::Production => "production",
    }
}

fn mode_label(mode: RunMode) -> &'static str {
    match mode {
        RunMode::E2e => "e2e",
        RunMode::Component => "component",
    }
}

fn random_nonce() -> String {
    let suffix: String = rand::thread_rng().sample_iter(rand::distributions::Alphanumeric).take(12).map(char::from).collect();
    format!("run-{suffix}")
}

fn random_password_seed() -> [u8; 24] {
    let mut bytes = [0u8; 24];
    rand::thread_rng().fill(&mut bytes);
    bytes
}
