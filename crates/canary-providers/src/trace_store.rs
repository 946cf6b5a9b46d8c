// canary-providers/src/trace_store.rs
// ============================================================================
// Module: Trace Store Client
// Description: Best-effort trace fetch (spec.md §4.5 step D, §7).
// Purpose: A trace fetch failure is never fatal to a canary on its own; it is
//          recorded as an instrumentation gap instead. This client encodes
//          that by swallowing transport/decode errors into `None` rather
//          than propagating [`ProviderError`].
// Dependencies: reqwest, serde_json
// ============================================================================

use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;

/// Fetches the raw trace payload at a `traceUrl`, treating every failure
/// mode as "no trace available" (spec.md §7: a missing trace degrades an
/// assertion to an instrumentation gap, it does not fail the canary).
pub trait TraceStoreClient {
    /// Fetches and parses the trace at `trace_url`, returning `None` on any
    /// transport, status, or decode failure.
    fn fetch_trace(&self, trace_url: &str) -> Option<Value>;
}

/// HTTP-backed [`TraceStoreClient`].
pub struct HttpTraceStoreClient {
    client: Client,
}

impl HttpTraceStoreClient {
    /// Builds a client with a short timeout, since trace fetches are
    /// best-effort and must not stall the run.
    ///
    /// # Errors
    ///
    /// Returns an error message if the HTTP client cannot be constructed.
    pub fn new() -> Result<Self, String> {
        let client =
            Client::builder().timeout(Duration::from_secs(15)).build().map_err(|err| err.to_string())?;
        Ok(Self { client })
    }
}

impl TraceStoreClient for HttpTraceStoreClient {
    fn fetch_trace(&self, trace_url: &str) -> Option<Value> {
        let response = self.client.get(trace_url).send().ok()?;
        if !response.status().is_success() {
            return None;
        }
        response.json::<Value>().ok()
    }
}
