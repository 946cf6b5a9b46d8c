// canary-cli/src/pool.rs
// ============================================================================
// Module: Canary Pool Selection
// Description: Resolves the `--matrix` / `--targeted` / `--canonical` pool
//              selection (spec.md §2 Driver, §6) against a pluggable source
//              of authored canaries.
// Purpose: Keep "where do canary fixtures come from" behind one seam, since
//          the concrete fixture set is explicitly supplied input (spec.md
//          §1 lists it as an external collaborator), the same way
//          `canary-canon`'s `CanonicalDictionarySource` keeps dictionary
//          provenance pluggable (spec.md §9, "Dynamic dictionaries").
// Dependencies: canary-core, serde_json, std::fs
// ============================================================================

//! ## Overview
//! [`CanaryPoolSource`] has exactly one production-shaped implementation,
//! [`FileCanaryPoolSource`], which reads a JSON array of [`CanaryDefinition`]
//! from a file path; [`BuiltinCanaryPoolSource`] ships a small compiled-in
//! pool as an explicit stand-in, sized only to exercise `--matrix`,
//! `--targeted`, and `--canonical` selection and to seed tests (spec.md §1:
//! "the concrete set of canary fixtures" is treated as supplied input, not
//! built here).

use std::path::Path;

use canary_core::CanaryDefinition;
use canary_core::Expectations;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Which pool the driver should run (spec.md §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolSelection {
    /// The full combinatorial canary pool.
    Matrix,
    /// The smaller, curated canary pool.
    Targeted,
    /// The single baseline canary.
    Canonical,
}

/// Failure loading a canary pool.
#[derive(Debug, Error)]
pub enum PoolError {
    /// The backing file could not be read.
    #[error("failed to read canary fixtures at {path}: {message}")]
    Read {
        /// The path that was read.
        path: String,
        /// The underlying I/O error's message.
        message: String,
    },
    /// The file's contents did not parse as a JSON array of canaries.
    #[error("failed to parse canary fixtures at {path}: {message}")]
    Parse {
        /// The path that was parsed.
        path: String,
        /// The underlying decode error's message.
        message: String,
    },
}

/// Pluggable source of authored canaries, keyed by pool selection (spec.md
/// §1: the concrete fixture set is an external collaborator).
pub trait CanaryPoolSource {
    /// Loads the canaries for one pool selection.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError`] if the backing source cannot be read or
    /// parsed.
    fn load(&self, selection: PoolSelection) -> Result<Vec<CanaryDefinition>, PoolError>;
}

/// On-disk fixture layout: one array per pool selection, so a single file
/// can supply all three (spec.md §6's three pool flags).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureFile {
    /// Fixtures for `--matrix`.
    #[serde(default)]
    pub matrix: Vec<CanaryDefinition>,
    /// Fixtures for `--targeted`.
    #[serde(default)]
    pub targeted: Vec<CanaryDefinition>,
    /// Fixtures for `--canonical`.
    #[serde(default)]
    pub canonical: Vec<CanaryDefinition>,
}

/// Reads canary fixtures from a JSON file on disk (spec.md §1: the
/// concrete fixture set is supplied input; this is the production-shaped
/// loader for it).
pub struct FileCanaryPoolSource {
    path: std::path::PathBuf,
}

impl FileCanaryPoolSource {
    /// Builds a source that reads fixtures from `path` on every call to
    /// [`CanaryPoolSource::load`].
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }
}

impl CanaryPoolSource for FileCanaryPoolSource {
    fn load(&self, selection: PoolSelection) -> Result<Vec<CanaryDefinition>, PoolError> {
        let path = self.path.display().to_string();
        let raw = std::fs::read_to_string(&self.path).map_err(|err| PoolError::Read { path: path.clone(), message: err.to_string() })?;
        let file: FixtureFile = serde_json::from_str(&raw).map_err(|err| PoolError::Parse { path, message: err.to_string() })?;
        Ok(match selection {
            PoolSelection::Matrix => file.matrix,
            PoolSelection::Targeted => file.targeted,
            PoolSelection::Canonical => file.canonical,
        })
    }
}

/// A small compiled-in canary pool. Explicitly a stand-in: the concrete
/// fixture set is out of scope (spec.md §1); this exists to exercise pool
/// selection and seed tests, mirroring `canary-canon`'s
/// `BuiltinDictionarySource`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinCanaryPoolSource;

impl CanaryPoolSource for BuiltinCanaryPoolSource {
    fn load(&self, selection: PoolSelection) -> Result<Vec<CanaryDefinition>, PoolError> {
        Ok(match selection {
            PoolSelection::Canonical => vec![baseline_human()],
            PoolSelection::Targeted => vec![baseline_human(), nonhuman_dragon(), wheelchair_user()],
            PoolSelection::Matrix => {
                let mut canaries = vec![baseline_human(), nonhuman_dragon(), wheelchair_user()];
                for species in ["elemental", "alien", "robot", "animal", "fairy", "superhero"] {
                    canaries.push(species_probe(species));
                }
                canaries
            }
        })
    }
}

fn baseline_human() -> CanaryDefinition {
    CanaryDefinition {
        id: "baseline-human".into(),
        display_name: "Baseline Human".to_string(),
        age: 9,
        age_bucket: Some("child".to_string()),
        species: "human".to_string(),
        species_descriptor: None,
        appearance: "short brown hair, green eyes".to_string(),
        personality: "curious and kind".to_string(),
        about_them: None,
        personality_traits: vec!["curious".to_string(), "kind".to_string()],
        ethnicities: vec!["east_asian".to_string()],
        inclusivity_traits: Vec::new(),
        trait_user_descriptions: std::collections::BTreeMap::new(),
        character_spoken_language: Some("english".to_string()),
        reader_language: Some("english".to_string()),
        gender: Some("girl".to_string()),
        expectations: Expectations::default(),
    }
}

fn nonhuman_dragon() -> CanaryDefinition {
    CanaryDefinition {
        id: "nonhuman-dragon".into(),
        display_name: "Ember the Dragon".to_string(),
        age: 10,
        age_bucket: Some("tween".to_string()),
        species: "dragon".to_string(),
        species_descriptor: Some("scaled, with small wings".to_string()),
        appearance: "emerald scales, amber eyes".to_string(),
        personality: "brave and loyal".to_string(),
        about_them: None,
        personality_traits: vec!["brave".to_string(), "loyal".to_string()],
        ethnicities: Vec::new(),
        inclusivity_traits: Vec::new(),
        trait_user_descriptions: std::collections::BTreeMap::new(),
        character_spoken_language: Some("english".to_string()),
        reader_language: Some("english".to_string()),
        gender: Some("nonbinary".to_string()),
        expectations: Expectations { require_species_truthiness: true, ..Expectations::default() },
    }
}

fn wheelchair_user() -> CanaryDefinition {
    CanaryDefinition {
        id: "wheelchair-user".into(),
        display_name: "Wheelchair Canary".to_string(),
        age: 11,
        age_bucket: Some("tween".to_string()),
        species: "human".to_string(),
        species_descriptor: None,
        appearance: "curly red hair, freckles".to_string(),
        personality: "funny and loyal".to_string(),
        about_them: None,
        personality_traits: vec!["funny".to_string(), "loyal".to_string()],
        ethnicities: vec!["white".to_string()],
        inclusivity_traits: vec!["wheelchair_user".to_string()],
        trait_user_descriptions: std::collections::BTreeMap::new(),
        character_spoken_language: Some("english".to_string()),
        reader_language: Some("english".to_string()),
        gender: Some("boy".to_string()),
        expectations: Expectations { require_wheelchair_presence: true, ..Expectations::default() },
    }
}

fn species_probe(species: &str) -> CanaryDefinition {
    CanaryDefinition {
        id: format!("species-probe-{species}").into(),
        display_name: format!("{species} Probe"),
        age: 8,
        age_bucket: Some("child".to_string()),
        species: species.to_string(),
        species_descriptor: None,
        appearance: "a distinctive silhouette".to_string(),
        personality: "shy but curious".to_string(),
        about_them: None,
        personality_traits: vec!["shy".to_string(), "curious".to_string()],
        ethnicities: if matches!(species, "human" | "superhero") { vec!["black_african_american".to_string()] } else { Vec::new() },
        inclusivity_traits: Vec::new(),
        trait_user_descriptions: std::collections::BTreeMap::new(),
        character_spoken_language: Some("english".to_string()),
        reader_language: Some("english".to_string()),
        gender: Some("nonbinary".to_string()),
        expectations: Expectations::default(),
    }
}

/// Resolves `--matrix`/`--targeted`/`--canonical` to one [`PoolSelection`],
/// matrix taking precedence over targeted over canonical when more than
/// one is passed, defaulting to canonical when none are (spec.md §6 lists
/// the three flags without specifying precedence or a default; `DESIGN.md`
/// records this resolution).
#[must_use]
pub fn resolve_selection(matrix: bool, targeted: bool, canonical: bool) -> PoolSelection {
    if matrix {
        PoolSelection::Matrix
    } else if targeted {
        PoolSelection::Targeted
    } else if canonical {
        PoolSelection::Canonical
    } else {
        PoolSelection::Canonical
    }
}

/// Filters a loaded pool down to the ids named by `--only` (spec.md §6),
/// preserving pool order; unknown ids are silently dropped (they cannot
/// match anything, and the batch-validation step already ran against the
/// full pool before this filter applies).
#[must_use]
pub fn apply_only_filter(pool: Vec<CanaryDefinition>, only_ids: Option<&[String]>) -> Vec<CanaryDefinition> {
    let Some(ids) = only_ids else {
        return pool;
    };
    pool.into_iter().filter(|canary| ids.iter().any(|id| id == canary.id.as_str())).collect()
}
