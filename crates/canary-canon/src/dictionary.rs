// canary-canon/src/dictionary.rs
// ============================================================================
// Module: Canonical Dictionary
// Description: Ordered per-domain lists of canonical entries, plus the
//              pluggable loader abstraction spec.md §9 calls for.
// Purpose: Decouple `resolve`/`closest`/`enumerate` from where the
//          dictionary data actually comes from (compiled-in, file,
//          generated).
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! A [`CanonicalDictionary`] is a set of ordered lists keyed by domain. Each
//! entry carries a canonical key, a display label, and an optional alias
//! list (spec.md §3). [`CanonicalDictionarySource`] is the loader seam
//! (spec.md §9, "Dynamic dictionaries"): [`BuiltinDictionarySource`] ships a
//! compiled-in default sized to exercise every rule in
//! `validate_canary_batch` and to seed tests; production callers are
//! expected to supply their own loader backed by the compiled build
//! artifact (dictionary compilation from source data is explicitly out of
//! scope, spec.md §1).

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// The domains a token may be resolved against (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Domain {
    /// Character species.
    Species,
    /// Character gender.
    Gender,
    /// Character ethnicity (human/superhero only).
    Ethnicity,
    /// Spoken/reader language.
    Language,
    /// Personality trait.
    PersonalityTrait,
    /// Age bucket.
    AgeBucket,
    /// Inclusivity trait.
    InclusivityTrait,
}

impl Domain {
    /// Returns the domain's field name, used in authoring error messages.
    #[must_use]
    pub const fn field_name(self) -> &'static str {
        match self {
            Self::Species => "species",
            Self::Gender => "gender",
            Self::Ethnicity => "ethnicity",
            Self::Language => "language",
            Self::PersonalityTrait => "personalityTrait",
            Self::AgeBucket => "ageBucket",
            Self::InclusivityTrait => "inclusivityTrait",
        }
    }
}

/// One entry of a canonical domain list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    /// Canonical key, used as the machine-readable identifier.
    pub key: String,
    /// Human-readable display label.
    pub label: String,
    /// Alternate spellings that resolve to this entry, never canonical
    /// themselves.
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl DictionaryEntry {
    /// Builds an entry with no aliases.
    #[must_use]
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self { key: key.into(), label: label.into(), aliases: Vec::new() }
    }

    /// Builds an entry with the given aliases.
    #[must_use]
    pub fn with_aliases(
        key: impl Into<String>,
        label: impl Into<String>,
        aliases: Vec<String>,
    ) -> Self {
        Self { key: key.into(), label: label.into(), aliases }
    }
}

/// A set of ordered per-domain canonical entry lists (spec.md §3).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalDictionary {
    /// Species entries.
    pub species: Vec<DictionaryEntry>,
    /// Gender entries.
    pub genders: Vec<DictionaryEntry>,
    /// Ethnicity entries.
    pub ethnicities: Vec<DictionaryEntry>,
    /// Language entries (shared by character-spoken and reader languages).
    pub languages: Vec<DictionaryEntry>,
    /// Personality trait entries.
    pub personality_traits: Vec<DictionaryEntry>,
    /// Age bucket entries.
    pub age_buckets: Vec<DictionaryEntry>,
    /// Inclusivity trait entries.
    pub inclusivity_traits: Vec<DictionaryEntry>,
}

impl CanonicalDictionary {
    /// Returns the entry list for one domain.
    #[must_use]
    pub fn entries(&self, domain: Domain) -> &[DictionaryEntry] {
        match domain {
            Domain::Species => &self.species,
            Domain::Gender => &self.genders,
            Domain::Ethnicity => &self.ethnicities,
            Domain::Language => &self.languages,
            Domain::PersonalityTrait => &self.personality_traits,
            Domain::AgeBucket => &self.age_buckets,
            Domain::InclusivityTrait => &self.inclusivity_traits,
        }
    }

    /// Validates dictionary well-formedness (spec.md §8): no two entries in
    /// the same domain share a normalized key.
    ///
    /// # Errors
    ///
    /// Returns [`DictionaryError::DuplicateKey`] naming the first collision
    /// found.
    pub fn check_well_formed(&self) -> Result<(), DictionaryError> {
        for domain in [
            Domain::Species,
            Domain::Gender,
            Domain::Ethnicity,
            Domain::Language,
            Domain::PersonalityTrait,
            Domain::AgeBucket,
            Domain::InclusivityTrait,
        ] {
            let mut seen = std::collections::HashSet::new();
            for entry in self.entries(domain) {
                let normalized = crate::normalize::normalize(&entry.key);
                if !seen.insert(normalized.clone()) {
                    return Err(DictionaryError::DuplicateKey {
                        domain: domain.field_name(),
                        key: entry.key.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Error produced while loading or validating a dictionary.
#[derive(Debug, Error)]
pub enum DictionaryError {
    /// Two entries in the same domain normalize to the same comparison key.
    #[error("dictionary domain {domain} has duplicate normalized key \"{key}\"")]
    DuplicateKey {
        /// Domain field name.
        domain: &'static str,
        /// Offending key.
        key: String,
    },
    /// The loader's backing source could not be read.
    #[error("failed to load canonical dictionary: {0}")]
    Source(String),
}

/// Pluggable dictionary loader abstraction (spec.md §9, "Dynamic
/// dictionaries"). Compiled-in, file-based, and generated loaders all
/// satisfy this trait.
pub trait CanonicalDictionarySource {
    /// Loads the dictionary.
    ///
    /// # Errors
    ///
    /// Returns [`DictionaryError`] when the backing source cannot be read or
    /// the loaded dictionary is not well-formed.
    fn load(&self) -> Result<CanonicalDictionary, DictionaryError>;
}

/// A compiled-in default dictionary. Explicitly a stand-in: dictionary
/// compilation from source data is out of scope (spec.md §1). Production
/// deployments are expected to supply their own [`CanonicalDictionarySource`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinDictionarySource;

impl CanonicalDictionarySource for BuiltinDictionarySource {
    fn load(&self) -> Result<CanonicalDictionary, DictionaryError> {
        let dictionary = builtin_dictionary();
        dictionary.check_well_formed()?;
        Ok(dictionary)
    }
}

/// Builds the compiled-in default dictionary covering every domain named in
/// spec.md §3, enough to exercise every rule in `validate_canary_batch`.
#[must_use]
pub fn builtin_dictionary() -> CanonicalDictionary {
    CanonicalDictionary {
        species: vec![
            DictionaryEntry::with_aliases("human", "Human", vec!["person".to_string()]),
            DictionaryEntry::with_aliases(
                "superhero",
                "Superhero",
                vec!["super_hero".to_string()],
            ),
            DictionaryEntry::new("dragon", "Dragon"),
            DictionaryEntry::new("elemental", "Elemental"),
            DictionaryEntry::new("alien", "Alien"),
            DictionaryEntry::with_aliases("robot", "Robot", vec!["android".to_string()]),
            DictionaryEntry::new("animal", "Animal"),
            DictionaryEntry::new("fairy", "Fairy"),
        ],
        genders: vec![
            DictionaryEntry::new("girl", "Girl"),
            DictionaryEntry::new("boy", "Boy"),
            DictionaryEntry::with_aliases(
                "nonbinary",
                "Nonbinary",
                vec!["non_binary".to_string()],
            ),
        ],
        ethnicities: vec![
            DictionaryEntry::with_aliases(
                "hispanic_latino",
                "Hispanic/Latino",
                vec!["latino".to_string(), "latina".to_string()],
            ),
            DictionaryEntry::new("black_african_american", "Black/African American"),
            DictionaryEntry::new("east_asian", "East Asian"),
            DictionaryEntry::new("south_asian", "South Asian"),
            DictionaryEntry::new("white", "White"),
            DictionaryEntry::new("middle_eastern", "Middle Eastern"),
            DictionaryEntry::new("native_american", "Native American"),
            DictionaryEntry::new("pacific_islander", "Pacific Islander"),
        ],
        languages: vec![
            DictionaryEntry::new("english", "English"),
            DictionaryEntry::new("spanish", "Spanish"),
            DictionaryEntry::new("french", "French"),
            DictionaryEntry::new("mandarin", "Mandarin"),
            DictionaryEntry::new("arabic", "Arabic"),
            DictionaryEntry::new("hindi", "Hindi"),
        ],
        personality_traits: vec![
            DictionaryEntry::new("brave", "Brave"),
            DictionaryEntry::new("curious", "Curious"),
            DictionaryEntry::new("kind", "Kind"),
            DictionaryEntry::new("funny", "Funny"),
            DictionaryEntry::with_aliases("shy", "Shy", vec!["timid".to_string()]),
            DictionaryEntry::new("loyal", "Loyal"),
        ],
        age_buckets: vec![
            DictionaryEntry::new("toddler", "Toddler"),
            DictionaryEntry::new("child", "Child"),
            DictionaryEntry::new("tween", "Tween"),
            DictionaryEntry::new("teen", "Teen"),
        ],
        inclusivity_traits: vec![
            DictionaryEntry::with_aliases(
                "wheelchair_user",
                "Wheelchair User",
                vec!["uses_wheelchair".to_string()],
            ),
            DictionaryEntry::new("limb_difference", "Limb Difference"),
            DictionaryEntry::new("hearing_aid", "Hearing Aid"),
            DictionaryEntry::new("glasses", "Glasses"),
            DictionaryEntry::new("vitiligo", "Vitiligo"),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_dictionary_is_well_formed() {
        builtin_dictionary().check_well_formed().expect("builtin dictionary must be well-formed");
    }

    #[test]
    fn builtin_source_loads() {
        let dictionary = BuiltinDictionarySource.load().expect("builtin source loads");
        assert!(!dictionary.species.is_empty());
    }

    #[test]
    fn duplicate_key_is_rejected() {
        let mut dictionary = builtin_dictionary();
        dictionary.species.push(DictionaryEntry::new("Human", "Human Again"));
        let err = dictionary.check_well_formed().expect_err("duplicate key must be rejected");
        assert!(matches!(err, DictionaryError::DuplicateKey { .. }));
    }
}
