// canary-canon/src/normalize_canary.rs
// ============================================================================
// Module: Canary Normalization
// Description: Builds a `NormalizedCanaryInput` from an authored
//              `CanaryDefinition` (spec.md §4.5, "For each normalized canary
//              input...").
// Purpose: Resolve every canonical field once, immediately before
//          invocation, so the canary runner never has to re-resolve a token
//          it already validated at startup.
// Dependencies: canary-core, canary-canon::{dictionary, resolver}
// ============================================================================

//! ## Overview
//! `normalize_canary` assumes `validate_canary_batch` already ran and the
//! batch is authoring-valid; a token that still fails to resolve here falls
//! back to its authored (lowercased, trimmed) form rather than panicking,
//! since this function has no error channel of its own (spec.md §4.5 treats
//! normalization as a pure transform, not a second validation pass).

use canary_core::CanaryDefinition;
use canary_core::NormalizedCanaryInput;
use canary_core::merge_free_text;

use crate::dictionary::CanonicalDictionary;
use crate::dictionary::Domain;
use crate::normalize::normalize;
use crate::resolver::Resolver;

/// Builds the canonicalized, merged form of `canary` used for invocation
/// (spec.md §4.5, §3).
#[must_use]
pub fn normalize_canary(canary: &CanaryDefinition, dictionary: &CanonicalDictionary) -> NormalizedCanaryInput {
    let resolver = Resolver::new(dictionary);

    let species = resolve_or_fallback(&resolver, Domain::Species, &canary.species);
    let appearance = merge_free_text(&canary.appearance, canary.species_descriptor.as_deref());
    let personality = merge_free_text(&canary.personality, canary.about_them.as_deref());

    let personality_traits =
        canary.personality_traits.iter().map(|token| resolve_or_fallback(&resolver, Domain::PersonalityTrait, token)).collect();
    let ethnicities =
        canary.ethnicities.iter().map(|token| resolve_or_fallback(&resolver, Domain::Ethnicity, token)).collect();
    let inclusivity_traits = canary
        .inclusivity_traits
        .iter()
        .map(|token| resolve_or_fallback(&resolver, Domain::InclusivityTrait, token))
        .collect();

    let trait_user_descriptions = canary
        .trait_user_descriptions
        .iter()
        .map(|(key, description)| (resolve_or_fallback(&resolver, Domain::InclusivityTrait, key), description.clone()))
        .collect();

    NormalizedCanaryInput {
        id: canary.id.clone(),
        display_name: canary.display_name.clone(),
        age: canary.age,
        age_bucket: canary.age_bucket.as_deref().map(|bucket| resolve_or_fallback(&resolver, Domain::AgeBucket, bucket)),
        species,
        appearance,
        personality,
        personality_traits,
        ethnicities,
        inclusivity_traits,
        trait_user_descriptions,
        character_spoken_language: canary
            .character_spoken_language
            .as_deref()
            .map(|language| resolve_or_fallback(&resolver, Domain::Language, language)),
        reader_language: canary.reader_language.as_deref().map(|language| resolve_or_fallback(&resolver, Domain::Language, language)),
        gender: canary.gender.as_deref().map(|gender| resolve_or_fallback(&resolver, Domain::Gender, gender)),
        expectations: canary.expectations.clone(),
    }
}

/// Resolves `token` in `domain`, falling back to its normalized form when it
/// does not resolve (should not happen for a batch that already passed
/// `validate_canary_batch`).
fn resolve_or_fallback(resolver: &Resolver<'_>, domain: Domain, token: &str) -> String {
    resolver.resolve(domain, token).map_or_else(|| normalize(token), |resolution| resolution.value)
}
