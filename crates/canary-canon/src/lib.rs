// canary-canon/src/lib.rs
// ============================================================================
// Module: Canary Canon
// Description: Canonical Resolver subsystem (spec.md §4.1).
// Purpose: Normalize free-form authoring tokens onto canonical dictionary
//          entries and validate authored canary batches against them.
// Dependencies: canary-core, serde, thiserror
// ============================================================================

//! ## Overview
//! `canary-canon` is a leaf crate: it has no network or filesystem
//! collaborators beyond the pluggable [`dictionary::CanonicalDictionarySource`]
//! a caller supplies. It is consumed by `canary-runner` (to build
//! [`canary_core::NormalizedCanaryInput`] per canary) and by `canary-cli`
//! (to run `validate_canary_batch` once at startup, before any invocation).

pub mod dictionary;
pub mod normalize;
pub mod normalize_canary;
pub mod resolver;
pub mod validate;

pub use dictionary::BuiltinDictionarySource;
pub use dictionary::CanonicalDictionary;
pub use dictionary::CanonicalDictionarySource;
pub use dictionary::DictionaryEntry;
pub use dictionary::DictionaryError;
pub use dictionary::Domain;
pub use dictionary::builtin_dictionary;
pub use normalize::normalize;
pub use normalize_canary::normalize_canary;
pub use resolver::Resolution;
pub use resolver::Resolver;
pub use resolver::levenshtein;
pub use validate::validate_canary_batch;
