// canary-core/src/ids.rs
// ============================================================================
// Module: Canary Identifiers
// Description: Opaque string-backed identifiers used across the harness.
// Purpose: Avoid passing bare `String`s between subsystems with different
//          identity domains (a canary id is never a character id).
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Identifiers are opaque and serialize as plain strings. Validation (format,
//! non-emptiness) is left to the boundary that produces them; these wrappers
//! only prevent identifier domains from being mixed up at call sites.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Declares a transparent, string-backed identifier newtype.
macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::new(value)
            }
        }
    };
}

string_id!(
    /// Stable identifier of an authored canary definition.
    CanaryId
);
string_id!(
    /// State-store identifier of a generated character row.
    CharacterId
);
string_id!(
    /// State-store identifier of a single generation attempt.
    AttemptId
);
string_id!(
    /// Identifier of one run of the whole canary pool (the `canary_nonce`).
    RunNonce
);
