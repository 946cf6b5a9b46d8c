// canary-core/src/model/failure_code.rs
// ============================================================================
// Module: Failure Codes
// Description: Classification of attempt failure codes into MUST_HAVE and
//              SHOULD_HAVE severity classes.
// Purpose: Centralize the code set spec.md §3 partitions by hand, so the
//          assertion kernel and remediation logic dispatch on one enum
//          instead of string literals scattered across both crates.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! `FailureCode` is a closed enum for every code named in spec.md §3. Any
//! code not in that list still round-trips through `Other(String)` and is
//! classified `ShouldHave`, matching "any other code observed is treated as
//! SHOULD_HAVE".

use serde::Deserialize;
use serde::Serialize;

/// Severity class of a failure code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// A contractual requirement; violating it is grounds for hard failure.
    MustHave,
    /// A non-blocking divergence; violating it is a soft issue by default.
    ShouldHave,
}

/// A failure code recorded on an attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCode {
    /// `safety`
    Safety,
    /// `headshot_transparent_background`
    HeadshotTransparentBackground,
    /// `wheelchair_not_present`
    WheelchairNotPresent,
    /// `limb_difference_missing_not_present`
    LimbDifferenceMissingNotPresent,
    /// `missing_traits`
    MissingTraits,
    /// `nonhuman_drift_human_default`
    NonhumanDriftHumanDefault,
    /// `nonhuman_drift_human_default_terminal`
    NonhumanDriftHumanDefaultTerminal,
    /// `elemental_embodiment_missing`
    ElementalEmbodimentMissing,
    /// `elemental_embodiment_unconfirmed`
    ElementalEmbodimentUnconfirmed,
    /// `alien_nonhuman_cues_missing`
    AlienNonhumanCuesMissing,
    /// `alien_nonhuman_cues_unconfirmed`
    AlienNonhumanCuesUnconfirmed,
    /// `species_anatomy_unconfirmed`
    SpeciesAnatomyUnconfirmed,
    /// `traits_unconfirmed`
    TraitsUnconfirmed,
    /// `world_native_support_missing`
    WorldNativeSupportMissing,
    /// `wheelchair_unconfirmed`
    WheelchairUnconfirmed,
    /// `style_drift`
    StyleDrift,
    /// Any code not named in spec.md §3; always classified `ShouldHave`.
    #[serde(other)]
    Other,
}

impl FailureCode {
    /// Parses a raw failure-code string as persisted by the state store.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "safety" => Self::Safety,
            "headshot_transparent_background" => Self::HeadshotTransparentBackground,
            "wheelchair_not_present" => Self::WheelchairNotPresent,
            "limb_difference_missing_not_present" => Self::LimbDifferenceMissingNotPresent,
            "missing_traits" => Self::MissingTraits,
            "nonhuman_drift_human_default" => Self::NonhumanDriftHumanDefault,
            "nonhuman_drift_human_default_terminal" => Self::NonhumanDriftHumanDefaultTerminal,
            "elemental_embodiment_missing" => Self::ElementalEmbodimentMissing,
            "elemental_embodiment_unconfirmed" => Self::ElementalEmbodimentUnconfirmed,
            "alien_nonhuman_cues_missing" => Self::AlienNonhumanCuesMissing,
            "alien_nonhuman_cues_unconfirmed" => Self::AlienNonhumanCuesUnconfirmed,
            "species_anatomy_unconfirmed" => Self::SpeciesAnatomyUnconfirmed,
            "traits_unconfirmed" => Self::TraitsUnconfirmed,
            "world_native_support_missing" => Self::WorldNativeSupportMissing,
            "wheelchair_unconfirmed" => Self::WheelchairUnconfirmed,
            "style_drift" => Self::StyleDrift,
            _ => Self::Other,
        }
    }

    /// Returns this code's severity classification.
    #[must_use]
    pub const fn classification(&self) -> FailureClass {
        match self {
            Self::Safety
            | Self::HeadshotTransparentBackground
            | Self::WheelchairNotPresent
            | Self::LimbDifferenceMissingNotPresent
            | Self::MissingTraits => FailureClass::MustHave,
            _ => FailureClass::ShouldHave,
        }
    }
}

/// Returns whether any code in `codes` parses to the given failure code.
#[must_use]
pub fn contains(codes: &[String], target: &str) -> bool {
    codes.iter().any(|code| code == target)
}
