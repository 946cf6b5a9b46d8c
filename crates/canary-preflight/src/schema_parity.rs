// canary-preflight/src/schema_parity.rs
// ============================================================================
// Step 6: Schema Parity
// Description: Probes the `characters` table for every column the canary
//              harness reads or writes, and builds an `ALTER TABLE`
//              remediation block for anything missing (spec.md §4.4 step 6).
// Purpose: Fail with a copy-pasteable fix instead of a confusing decode
//          error the first time a character row is fetched.
// Dependencies: canary-providers
// ============================================================================

use canary_providers::ColumnProbe;
use canary_providers::StateStoreClient;

use crate::error::PreflightError;

const CHARACTERS_TABLE: &str = "characters";

/// Every `characters` column the harness depends on, grounded in
/// [`canary_core::CharacterRecord`]'s camelCase field list.
const REQUIRED_COLUMNS: &[&str] = &[
    "id",
    "name",
    "species",
    "speciesDescriptor",
    "traits",
    "headshotUrl",
    "bodyshotUrl",
    "headshotTraceUrl",
    "bodyshotTraceUrl",
    "headshotPromptHash",
    "bodyshotPromptHash",
    "globalStyleHash",
    "headshotStatus",
    "bodyshotStatus",
    "characterState",
    "generationStartedAt",
    "generationCompletedAt",
    "appliedInclusivityTraits",
    "excludedInclusivityTraits",
    "imageModel",
    "currentHeadshotAttemptId",
    "lastGoodHeadshotAttemptId",
    "currentBodyshotAttemptId",
    "lastGoodBodyshotAttemptId",
    "failureCodes",
    "referenceImages",
];

/// Probes every required `characters` column and, if any are missing,
/// returns a [`PreflightError::SchemaParityFailed`] carrying a ready-to-run
/// `ALTER TABLE` remediation block (spec.md §4.4 step 6).
///
/// # Errors
///
/// Returns [`PreflightError::Provider`] on transport failure probing a
/// column, or [`PreflightError::SchemaParityFailed`] if any column is
/// missing.
pub fn check_schema_parity(client: &dyn StateStoreClient) -> Result<(), PreflightError> {
    let mut missing = Vec::new();
    for column in REQUIRED_COLUMNS {
        match client.probe_column(CHARACTERS_TABLE, column)? {
            ColumnProbe::Present => {}
            ColumnProbe::Missing => missing.push((*column).to_string()),
        }
    }
    if missing.is_empty() {
        return Ok(());
    }
    let remediation_sql = build_remediation_sql(&missing);
    Err(PreflightError::SchemaParityFailed { missing, remediation_sql })
}

fn build_remediation_sql(missing: &[String]) -> String {
    let mut sql = format!("ALTER TABLE {} \n", quote_identifier(CHARACTERS_TABLE));
    let clauses: Vec<String> =
        missing.iter().map(|column| format!("  ADD COLUMN IF NOT EXISTS {} text", quote_identifier(column))).collect();
    sql.push_str(&clauses.join(",\n"));
    sql.push(';');
    sql
}

const RESERVED_SQL_WORDS: &[&str] =
    &["user", "table", "order", "group", "select", "where", "column", "check", "references"];

/// Quotes an identifier with double quotes when it needs it: a reserved SQL
/// word, or an identifier containing any uppercase character (e.g. a
/// camelCase column name), which Postgres would otherwise fold to
/// lowercase (spec.md §4.4 step 6).
#[must_use]
pub fn quote_identifier(identifier: &str) -> String {
    let needs_quoting = RESERVED_SQL_WORDS.contains(&identifier.to_lowercase().as_str())
        || identifier.chars().any(char::is_uppercase);
    if needs_quoting {
        format!("\"{identifier}\"")
    } else {
        identifier.to_string()
    }
}
