// canary-runner/src/trace.rs
// ============================================================================
// Step D: Trace Fetch
// Description: Best-effort GET of each present trace URL (spec.md §4.5
//              step D, §7: "Transient fetch failures... degrade to null
//              trace; downstream checks will produce instrumentation errors
//              for any required trace").
// Purpose: Turn a raw trace payload into both the raw value (kept for
//          hosts/consistency checks) and a parsed `ValidationSummary` (kept
//          for expectation/drift checks), without ever treating a fetch
//          failure as fatal.
// Dependencies: canary-core, canary-providers, serde_json
// ============================================================================

use canary_core::ValidationSummary;
use canary_providers::TraceStoreClient;
use serde_json::Value;

/// Result of fetching and parsing one trace URL.
#[derive(Debug, Clone, Default)]
pub struct TraceFetch {
    /// The raw trace payload, if the fetch succeeded.
    pub raw: Option<Value>,
    /// The payload parsed into a validation summary, if it fetched and
    /// decoded successfully.
    pub validation_summary: Option<ValidationSummary>,
}

/// Fetches and parses the trace at `trace_url`, if any (spec.md §4.5 step
/// D). Returns an empty [`TraceFetch`] for a missing URL or any failure.
#[must_use]
pub fn fetch_trace(trace_store: &dyn TraceStoreClient, trace_url: Option<&str>) -> TraceFetch {
    let Some(trace_url) = trace_url else {
        return TraceFetch::default();
    };
    let Some(raw) = trace_store.fetch_trace(trace_url) else {
        return TraceFetch::default();
    };
    let validation_summary = serde_json::from_value(raw.clone()).ok();
    TraceFetch { raw: Some(raw), validation_summary }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    struct StubTraceStore {
        payload: Option<Value>,
    }

    impl TraceStoreClient for StubTraceStore {
        fn fetch_trace(&self, _trace_url: &str) -> Option<Value> {
            self.payload.clone()
        }
    }

    #[test]
    fn missing_url_yields_empty_fetch() {
        let store = StubTraceStore { payload: None };
        let fetch = fetch_trace(&store, None);
        assert!(fetch.raw.is_none());
        assert!(fetch.validation_summary.is_none());
    }

    #[test]
    fn failed_fetch_yields_empty_fetch_not_error() {
        let store = StubTraceStore { payload: None };
        let fetch = fetch_trace(&store, Some("https://trace.example.com/missing.json"));
        assert!(fetch.raw.is_none());
    }

    #[test]
    fn successful_fetch_parses_validation_summary() {
        let store = StubTraceStore {
            payload: Some(json!({ "rating": "g", "is_child_safe": true })),
        };
        let fetch = fetch_trace(&store, Some("https://trace.example.com/trace.json"));
        assert!(fetch.raw.is_some());
        let summary = fetch.validation_summary.expect("must parse");
        assert_eq!(summary.rating.as_deref(), Some("g"));
        assert_eq!(summary.is_child_safe, Some(true));
    }

    #[test]
    fn malformed_payload_yields_no_validation_summary_but_keeps_raw() {
        let store = StubTraceStore { payload: Some(json!("not-an-object")) };
        let fetch = fetch_trace(&store, Some("https://trace.example.com/trace.json"));
        assert!(fetch.raw.is_some());
        assert!(fetch.validation_summary.is_none());
    }
}
