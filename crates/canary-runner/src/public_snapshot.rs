// canary-runner/src/public_snapshot.rs
// ============================================================================
// Step B: Public Snapshot Receipt
// Description: Fetches the public snapshot receipt and classifies it into
//              either a clean pass-through or a run-terminating
//              instrumentation error (spec.md §4.5 step B, §7: "do not abort
//              the run unless the failure is the public-snapshot-receipt").
// Purpose: Keep the "this is the one failure mode that ends the whole run"
//          rule in exactly one place.
// Dependencies: canary-core, canary-providers
// ============================================================================

use canary_core::AssertionError;
use canary_core::PublicSnapshotReceipt;
use canary_providers::ProviderError;
use canary_providers::SnapshotClient;
use canary_providers::TokenClassification;

/// Outcome of step B: the recordable receipt plus whichever instrumentation
/// error, if any, it produced.
#[derive(Debug, Clone)]
pub struct PublicSnapshotOutcome {
    /// The recordable receipt (`{url, status, ok, prefix}`).
    pub receipt: PublicSnapshotReceipt,
    /// Set when the receipt was not ok, or was ok but carried a `tpose` key.
    /// Either case terminates the whole run after this canary (spec.md §7).
    pub instrumentation: Option<AssertionError>,
}

/// Runs step B for one canary (spec.md §4.5 step B).
///
/// # Errors
///
/// Returns [`ProviderError`] only on transport failure; non-2xx statuses are
/// represented in the returned [`PublicSnapshotOutcome`] instead.
pub fn fetch_public_snapshot(
    snapshot: &dyn SnapshotClient,
    snapshot_base_path: &str,
    auth_base_path: &str,
    character_id: &str,
    token: TokenClassification,
) -> Result<PublicSnapshotOutcome, ProviderError> {
    let fetch = snapshot.fetch_snapshot(snapshot_base_path, auth_base_path, character_id)?;
    let receipt = fetch.receipt.clone();

    if !receipt.ok {
        let instrumentation = AssertionError::new(
            "public_snapshot_not_ok",
            format!(
                "public snapshot receipt for {character_id} was not ok (status {}, token_kind={:?}, issuer={})",
                receipt.status,
                token.kind,
                token.issuer.as_deref().unwrap_or("unknown")
            ),
        );
        return Ok(PublicSnapshotOutcome { receipt, instrumentation: Some(instrumentation) });
    }

    if fetch.contains_tpose_key() {
        let instrumentation = AssertionError::new(
            "public_snapshot_tpose_key_present",
            format!("public snapshot receipt for {character_id} carried a tpose-prefixed key"),
        );
        return Ok(PublicSnapshotOutcome { receipt, instrumentation: Some(instrumentation) });
    }

    Ok(PublicSnapshotOutcome { receipt, instrumentation: None })
}

#[cfg(test)]
mod tests {
    use canary_core::PublicSnapshotReceipt;
    use canary_providers::SnapshotFetch;
    use serde_json::json;

    use super::*;

    struct StubSnapshot {
        fetch: SnapshotFetch,
    }

    impl SnapshotClient for StubSnapshot {
        fn fetch_snapshot(
            &self,
            _snapshot_base_path: &str,
            _auth_base_path: &str,
            _character_id: &str,
        ) -> Result<SnapshotFetch, ProviderError> {
            Ok(self.fetch.clone())
        }
    }

    fn token() -> TokenClassification {
        TokenClassification { kind: canary_config::TokenKind::CustomJwt, issuer: None }
    }

    #[test]
    fn not_ok_receipt_is_instrumentation() {
        let stub = StubSnapshot {
            fetch: SnapshotFetch {
                receipt: PublicSnapshotReceipt {
                    url: "https://api.example.com/characters/c1".to_string(),
                    status: 500,
                    ok: false,
                    prefix: "/snapshot".to_string(),
                },
                data: None,
            },
        };
        let outcome =
            fetch_public_snapshot(&stub, "/snapshot", "/auth", "c1", token()).expect("transport must succeed");
        assert!(outcome.instrumentation.is_some());
    }

    #[test]
    fn ok_receipt_with_tpose_key_is_instrumentation() {
        let stub = StubSnapshot {
            fetch: SnapshotFetch {
                receipt: PublicSnapshotReceipt {
                    url: "https://api.example.com/characters/c1".to_string(),
                    status: 200,
                    ok: true,
                    prefix: "/snapshot".to_string(),
                },
                data: Some(json!({ "tposeReference": "present" })),
            },
        };
        let outcome =
            fetch_public_snapshot(&stub, "/snapshot", "/auth", "c1", token()).expect("transport must succeed");
        assert!(outcome.instrumentation.is_some());
    }

    #[test]
    fn clean_receipt_has_no_instrumentation() {
        let stub = StubSnapshot {
            fetch: SnapshotFetch {
                receipt: PublicSnapshotReceipt {
                    url: "https://api.example.com/characters/c1".to_string(),
                    status: 200,
                    ok: true,
                    prefix: "/snapshot".to_string(),
                },
                data: Some(json!({ "species": "human" })),
            },
        };
        let outcome =
            fetch_public_snapshot(&stub, "/snapshot", "/auth", "c1", token()).expect("transport must succeed");
        assert!(outcome.instrumentation.is_none());
    }
}
