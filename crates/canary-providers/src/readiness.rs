// canary-providers/src/readiness.rs
// ============================================================================
// Module: Readiness Client
// Description: The connectivity probe against `<apiBase>/ready` (spec.md
//              §4.4 step 2).
// Purpose: Give the preflight runner a mockable seam for the single GET it
//          issues before anything else runs.
// Dependencies: reqwest
// ============================================================================

use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::ProviderError;

/// Outcome of probing `<apiBase>/ready` (spec.md §4.4 step 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyOutcome {
    /// 2xx/3xx/4xx other than 404: treated as reachable.
    Reachable,
    /// 404: the ready endpoint itself is missing.
    NotFound,
    /// 5xx: server error.
    ServerError,
}

/// The generation service's readiness-probe surface.
pub trait ReadinessClient {
    /// GETs `<api_base_url>/ready`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Transport`] on DNS failure or any other
    /// inability to send the request at all.
    fn check_ready(&self) -> Result<ReadyOutcome, ProviderError>;
}

/// HTTP-backed [`ReadinessClient`].
pub struct HttpReadinessClient {
    client: Client,
    api_base_url: String,
}

impl HttpReadinessClient {
    /// Builds a client against `api_base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if the HTTP client cannot be constructed.
    pub fn new(api_base_url: impl Into<String>) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build().map_err(|err| {
            ProviderError::Transport { url: "readiness-probe".to_string(), message: err.to_string() }
        })?;
        Ok(Self { client, api_base_url: api_base_url.into() })
    }
}

impl ReadinessClient for HttpReadinessClient {
    fn check_ready(&self) -> Result<ReadyOutcome, ProviderError> {
        let url = format!("{}/ready", self.api_base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|err| ProviderError::Transport { url, message: err.to_string() })?;
        let status = response.status();
        if status.as_u16() == 404 {
            Ok(ReadyOutcome::NotFound)
        } else if status.is_server_error() {
            Ok(ReadyOutcome::ServerError)
        } else {
            Ok(ReadyOutcome::Reachable)
        }
    }
}
