// canary-canon/src/validate.rs
// ============================================================================
// Module: Canary Batch Validation
// Description: Domain-aware authoring rules applied to a batch of
//              `CanaryDefinition`s before any invocation runs.
// Purpose: Implement `validateCanaryBatch` (spec.md §4.1) exactly, including
//          its two error message formats.
// Dependencies: canary-core, canary-canon::{dictionary, resolver}
// ============================================================================

//! ## Overview
//! `validate_canary_batch` never raises; it returns one human-readable
//! error string per violation (spec.md §4.1, "Failure mode: emits errors
//! only"). The caller (`canary-cli`'s driver) treats any non-empty result
//! as a fatal authoring error and exits before invoking anything
//! (spec.md §7).

use canary_core::CanaryDefinition;

use crate::dictionary::CanonicalDictionary;
use crate::dictionary::Domain;
use crate::resolver::Resolver;

const SPECIES_ALLOWING_ETHNICITY: [&str; 2] = ["human", "superhero"];
const SUGGESTION_COUNT: usize = 3;

/// Validates a batch of authored canaries against a loaded dictionary.
///
/// Returns one formatted error string per violation; an empty vector means
/// every canary in the batch is authoring-valid.
#[must_use]
pub fn validate_canary_batch(
    canaries: &[CanaryDefinition],
    dictionary: &CanonicalDictionary,
) -> Vec<String> {
    let resolver = Resolver::new(dictionary);
    let mut errors = Vec::new();
    for canary in canaries {
        validate_one(canary, &resolver, &mut errors);
    }
    errors
}

fn validate_one(canary: &CanaryDefinition, resolver: &Resolver<'_>, errors: &mut Vec<String>) {
    let id = canary.id.as_str();

    let species_resolution = check_canonical(resolver, Domain::Species, &canary.species, id, errors);

    if let Some(bucket) = &canary.age_bucket {
        check_canonical(resolver, Domain::AgeBucket, bucket, id, errors);
    }
    if let Some(gender) = &canary.gender {
        check_canonical(resolver, Domain::Gender, gender, id, errors);
    }
    if let Some(language) = &canary.character_spoken_language {
        check_canonical(resolver, Domain::Language, language, id, errors);
    }
    if let Some(language) = &canary.reader_language {
        check_canonical(resolver, Domain::Language, language, id, errors);
    }
    for trait_token in &canary.personality_traits {
        check_canonical(resolver, Domain::PersonalityTrait, trait_token, id, errors);
    }
    for trait_token in &canary.inclusivity_traits {
        check_canonical(resolver, Domain::InclusivityTrait, trait_token, id, errors);
    }

    check_ethnicity_permission(canary, species_resolution.as_deref(), id, errors);
    for ethnicity in &canary.ethnicities {
        check_canonical(resolver, Domain::Ethnicity, ethnicity, id, errors);
    }

    check_trait_user_descriptions(canary, resolver, id, errors);
}

/// Checks that `token` resolves canonically in `domain`, pushing a
/// formatted error otherwise. Returns the resolved canonical value, if any
/// (including alias matches, so callers needing the resolved species can
/// still use it even though it was itself flagged as non-canonical).
fn check_canonical(
    resolver: &Resolver<'_>,
    domain: Domain,
    token: &str,
    id: &str,
    errors: &mut Vec<String>,
) -> Option<String> {
    match resolver.resolve(domain, token) {
        None => {
            let suggestions = resolver.closest(domain, token, SUGGESTION_COUNT).join(", ");
            errors.push(format!(
                "[{id}] {field} is not canonical: \"{token}\" (closest: {suggestions})",
                field = domain.field_name(),
            ));
            None
        }
        Some(resolution) if resolution.is_alias => {
            errors.push(format!(
                "[{id}] {field} must use canonical value \"{value}\", not \"{token}\"",
                field = domain.field_name(),
                value = resolution.value,
            ));
            Some(resolution.value)
        }
        Some(resolution) => Some(resolution.value),
    }
}

/// Ethnicity is only permitted when species resolves to `human` or
/// `superhero` (spec.md §3, §4.1).
fn check_ethnicity_permission(
    canary: &CanaryDefinition,
    resolved_species: Option<&str>,
    id: &str,
    errors: &mut Vec<String>,
) {
    if canary.ethnicities.is_empty() {
        return;
    }
    let species = resolved_species.unwrap_or(&canary.species);
    if !SPECIES_ALLOWING_ETHNICITY.contains(&species) {
        errors.push(format!(
            "[{id}] ethnicity not allowed for species \"{species}\"",
            species = canary.species,
        ));
    }
}

/// Every key in `traitUserDescriptions` must resolve as an inclusivity
/// trait and must appear in `inclusivityTraits` (spec.md §3, §4.1).
fn check_trait_user_descriptions(
    canary: &CanaryDefinition,
    resolver: &Resolver<'_>,
    id: &str,
    errors: &mut Vec<String>,
) {
    for key in canary.trait_user_descriptions.keys() {
        let Some(resolved) = check_canonical(resolver, Domain::InclusivityTrait, key, id, errors)
        else {
            continue;
        };
        let present = canary
            .inclusivity_traits
            .iter()
            .any(|authored| resolver.resolve(Domain::InclusivityTrait, authored).map(|r| r.value) == Some(resolved.clone()));
        if !present {
            errors.push(format!(
                "[{id}] traitUserDescriptions key \"{key}\" must appear in inclusivityTraits",
            ));
        }
    }
}
