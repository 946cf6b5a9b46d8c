// canary-assert/src/species.rs
// ============================================================================
// Module: Species Classification
// Description: The "explicit human" vs "nonhuman" split shared by the
//              remediation pass and the nonhuman drift chain check
//              (spec.md §4.5 step E, §4.6).
// Purpose: Implement the classification rule exactly once rather than in
//          both the runner's remediation pass and the assertion kernel.
// Dependencies: none
// ============================================================================

/// Whether a normalized species key, combined with its free-text
/// descriptor, counts as "explicit human" (spec.md §4.5 step E: species key
/// `human`, or `superhero` with a descriptor containing the whole word
/// `human`).
#[must_use]
pub fn is_explicit_human(species: &str, descriptor: Option<&str>) -> bool {
    if species == "human" {
        return true;
    }
    if species != "superhero" {
        return false;
    }
    let Some(descriptor) = descriptor else {
        return false;
    };
    descriptor
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| word.eq_ignore_ascii_case("human"))
}

/// The complement of [`is_explicit_human`].
#[must_use]
pub fn is_nonhuman(species: &str, descriptor: Option<&str>) -> bool {
    !is_explicit_human(species, descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_species_key_is_explicit_human() {
        assert!(is_explicit_human("human", None));
    }

    #[test]
    fn superhero_with_human_descriptor_is_explicit_human() {
        assert!(is_explicit_human("superhero", Some("a human hero with a cape")));
    }

    #[test]
    fn superhero_without_human_descriptor_is_nonhuman() {
        assert!(is_nonhuman("superhero", Some("an alien hero with a cape")));
    }

    #[test]
    fn superhero_descriptor_matches_whole_word_only() {
        assert!(is_nonhuman("superhero", Some("a humanoid hero")));
    }

    #[test]
    fn dragon_is_nonhuman() {
        assert!(is_nonhuman("dragon", None));
    }
}
