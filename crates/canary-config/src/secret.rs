// canary-config/src/secret.rs
// ============================================================================
// Module: Config Resolver
// Description: Layered env → parameter-store → fallback resolution with
//              provenance logging.
// Purpose: Implement spec.md §4.2's `resolve` algorithm exactly, against a
//          pluggable parameter-store collaborator.
// Dependencies: canary-core (none directly; kept free of provider deps)
// ============================================================================

//! ## Overview
//! [`SecretSource`] is the pluggable seam to the parameter store, which is
//! explicitly an external collaborator (spec.md §1); `canary-providers`
//! supplies an HTTP-backed implementation, and a [`StaticSecretSource`] test
//! double backs this crate's own unit tests. `resolve` never retries a
//! provider and logs every successful resolution's provenance through the
//! supplied `report` sink (spec.md §2.1's ambient logging convention),
//! masking values whose name matches `/(key|secret|password|token)/i`.

use std::fmt;

use thiserror::Error;

/// Where a resolved config value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Read from the named environment variable.
    Env(String),
    /// Read from the named parameter-store path.
    ParamStore(String),
    /// The caller-supplied fallback value was used.
    Fallback,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Env(var) => write!(f, "env {var}"),
            Self::ParamStore(path) => write!(f, "paramstore {path}"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

/// A resolved config value and its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// The resolved value.
    pub value: String,
    /// Where it came from.
    pub source: Source,
}

/// Describes one config key to resolve.
#[derive(Debug, Clone)]
pub struct SecretSpec {
    /// Human-readable name, used in logs and error messages.
    pub name: String,
    /// Environment variable checked first.
    pub env_var: String,
    /// Parameter-store paths checked in order, after the env var.
    pub param_paths: Vec<String>,
    /// Value used if neither the env var nor any parameter-store path
    /// yields a non-empty value.
    pub fallback: Option<String>,
    /// Whether resolution failure is fatal.
    pub required: bool,
    /// Whether the resolved value should be masked when logged.
    pub secret: bool,
}

impl SecretSpec {
    /// Builds a required, non-secret spec with no parameter-store paths or
    /// fallback. Use the struct literal directly for anything more specific.
    #[must_use]
    pub fn required(name: impl Into<String>, env_var: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            env_var: env_var.into(),
            param_paths: Vec::new(),
            fallback: None,
            required: true,
            secret: false,
        }
    }

    /// Returns whether this spec's name looks like a secret
    /// (`/(key|secret|password|token)/i`, spec.md §4.2 step 5).
    #[must_use]
    pub fn looks_secret(&self) -> bool {
        self.secret || {
            let lower = self.name.to_lowercase();
            ["key", "secret", "password", "token"].iter().any(|needle| lower.contains(needle))
        }
    }
}

/// Errors produced while resolving a config value.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Every configured source failed or was absent, and the spec was
    /// required (spec.md §4.2 step 4 / §7 "Config errors").
    #[error("missing required config \"{name}\": attempted {attempted}")]
    MissingRequired {
        /// The spec's name.
        name: String,
        /// Human-readable list of every source attempted and why it
        /// failed.
        attempted: String,
    },
    /// The parameter-store collaborator returned an error.
    #[error("parameter store error for path \"{path}\": {message}")]
    ParamStore {
        /// Path that failed.
        path: String,
        /// Collaborator-supplied message.
        message: String,
    },
}

/// Pluggable parameter-store collaborator (spec.md §1: out of scope as a
/// concrete implementation; `canary-providers` supplies the HTTP-backed
/// one).
pub trait SecretSource {
    /// Retrieves and decrypts one parameter-store value.
    ///
    /// # Errors
    ///
    /// Returns an error string describing why retrieval failed; `resolve`
    /// treats any error the same as an absent value and continues to the
    /// next source (spec.md §4.2 step 2).
    fn get_parameter(&self, path: &str) -> Result<Option<String>, String>;

    /// Writes a value back to the parameter store (`--persist-ssm`,
    /// spec.md §6).
    ///
    /// # Errors
    ///
    /// Returns an error string describing why the write failed.
    fn put_parameter(&self, path: &str, value: &str) -> Result<(), String>;
}

/// A sink for provenance log lines (spec.md §2.1's ambient logging
/// convention: an explicit writer, never a bare `println!`).
pub trait ProvenanceSink {
    /// Emits one provenance line.
    fn log(&self, line: &str);
}

/// Resolves one config value through the layered env → parameter-store →
/// fallback chain (spec.md §4.2).
///
/// # Errors
///
/// Returns [`ConfigError::MissingRequired`] when `spec.required` is true
/// and no source yields a value.
pub fn resolve(
    spec: &SecretSpec,
    source: &dyn SecretSource,
    sink: &dyn ProvenanceSink,
) -> Result<Option<Resolved>, ConfigError> {
    let mut attempted = Vec::new();

    if let Ok(value) = std::env::var(&spec.env_var) {
        if !value.is_empty() {
            let resolved = Resolved { value, source: Source::Env(spec.env_var.clone()) };
            log_resolution(spec, &resolved, sink);
            return Ok(Some(resolved));
        }
        attempted.push(format!("env {} (empty)", spec.env_var));
    } else {
        attempted.push(format!("env {} (unset)", spec.env_var));
    }

    for path in &spec.param_paths {
        match source.get_parameter(path) {
            Ok(Some(value)) if !value.is_empty() => {
                let resolved = Resolved { value, source: Source::ParamStore(path.clone()) };
                log_resolution(spec, &resolved, sink);
                return Ok(Some(resolved));
            }
            Ok(Some(_)) => attempted.push(format!("paramstore {path} (empty)")),
            Ok(None) => attempted.push(format!("paramstore {path} (absent)")),
            Err(message) => attempted.push(format!("paramstore {path} (error: {message})")),
        }
    }

    if let Some(fallback) = &spec.fallback {
        let resolved = Resolved { value: fallback.clone(), source: Source::Fallback };
        log_resolution(spec, &resolved, sink);
        return Ok(Some(resolved));
    }
    attempted.push("fallback (none configured)".to_string());

    if spec.required {
        return Err(ConfigError::MissingRequired {
            name: spec.name.clone(),
            attempted: attempted.join("; "),
        });
    }

    Ok(None)
}

/// Resolves a required config value, unwrapping the `Option` `resolve`
/// otherwise returns. Callers that only ever pass `spec.required == true`
/// use this instead of matching on `resolve`'s `Option` themselves; a
/// `required` spec that still comes back `None` is a defensive case
/// (`resolve` itself already errors out before reaching it) surfaced as
/// the same [`ConfigError::MissingRequired`] rather than panicking.
///
/// # Errors
///
/// Returns [`ConfigError::MissingRequired`] under the same conditions as
/// [`resolve`], plus the defensive case above.
pub fn resolve_required(
    spec: &SecretSpec,
    source: &dyn SecretSource,
    sink: &dyn ProvenanceSink,
) -> Result<Resolved, ConfigError> {
    resolve(spec, source, sink)?.ok_or_else(|| ConfigError::MissingRequired {
        name: spec.name.clone(),
        attempted: "required spec resolved to no value".to_string(),
    })
}

/// Writes a resolved value back to the parameter store when `--persist-ssm`
/// is set and the value wasn't already sourced from one (spec.md §6, an
/// additive behavior recorded as an Open Question resolution in
/// `DESIGN.md`).
///
/// # Errors
///
/// Returns [`ConfigError::ParamStore`] if the write fails.
pub fn persist_if_requested(
    spec: &SecretSpec,
    resolved: &Resolved,
    source: &dyn SecretSource,
    persist_ssm: bool,
) -> Result<(), ConfigError> {
    if !persist_ssm || matches!(resolved.source, Source::ParamStore(_)) {
        return Ok(());
    }
    let Some(path) = spec.param_paths.first() else {
        return Ok(());
    };
    source
        .put_parameter(path, &resolved.value)
        .map_err(|message| ConfigError::ParamStore { path: path.clone(), message })
}

fn log_resolution(spec: &SecretSpec, resolved: &Resolved, sink: &dyn ProvenanceSink) {
    let displayed = if spec.looks_secret() { "***" } else { resolved.value.as_str() };
    sink.log(&format!("config {} resolved from {} = {}", spec.name, resolved.source, displayed));
}

/// A [`SecretSource`] backed by an in-memory map, for tests and for
/// deployments with no live parameter store.
#[derive(Debug, Default, Clone)]
pub struct StaticSecretSource {
    values: std::collections::BTreeMap<String, String>,
}

impl StaticSecretSource {
    /// Builds a source from an iterator of `(path, value)` pairs.
    pub fn new(values: impl IntoIterator<Item = (String, String)>) -> Self {
        Self { values: values.into_iter().collect() }
    }
}

impl SecretSource for StaticSecretSource {
    fn get_parameter(&self, path: &str) -> Result<Option<String>, String> {
        Ok(self.values.get(path).cloned())
    }

    fn put_parameter(&self, _path: &str, _value: &str) -> Result<(), String> {
        Err("StaticSecretSource is read-only".to_string())
    }
}

/// A no-op provenance sink, for tests that don't assert on log output.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProvenanceSink for NullSink {
    fn log(&self, _line: &str) {}
}
