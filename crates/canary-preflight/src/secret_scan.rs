// canary-preflight/src/secret_scan.rs
// ============================================================================
// Step 1: Secret Scan
// Description: Recursively scans a recovery directory's `.json` files for
//              secret-shaped patterns (spec.md §4.4 step 1).
// Purpose: Abort before any network call if a recovery dump was left lying
//          around with live credentials in it.
// Dependencies: std::fs
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use crate::error::PreflightError;

const SKIPPED_DIR_NAMES: &[&str] = &["extract", "node_modules"];
const SUSPICIOUS_PATTERNS: &[&str] = &["SUPABASE", "JWT", "OPENAI", "SECRET", "KEY"];

/// Walks `dir` recursively and flags every `.json` file (outside an
/// `extract` or `node_modules` directory) whose contents contain one of the
/// suspicious patterns, case-insensitively (spec.md §4.4 step 1).
///
/// # Errors
///
/// Returns [`PreflightError::SecretsFound`] naming every offending path.
pub fn scan_recovery_directory(dir: &Path) -> Result<(), PreflightError> {
    let mut offending = Vec::new();
    walk(dir, &mut offending);
    if offending.is_empty() {
        Ok(())
    } else {
        offending.sort();
        Err(PreflightError::SecretsFound { paths: offending })
    }
}

fn walk(dir: &Path, offending: &mut Vec<String>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if is_skipped_dir(&path) {
                continue;
            }
            walk(&path, offending);
        } else if is_json_file(&path) {
            if let Ok(contents) = std::fs::read_to_string(&path) {
                if contains_suspicious_pattern(&contents) {
                    offending.push(path.display().to_string());
                }
            }
        }
    }
}

fn is_skipped_dir(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| SKIPPED_DIR_NAMES.contains(&name))
}

fn is_json_file(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()).is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn contains_suspicious_pattern(contents: &str) -> bool {
    let upper = contents.to_uppercase();
    SUSPICIOUS_PATTERNS.iter().any(|pattern| upper.contains(pattern))
}
