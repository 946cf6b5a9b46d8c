// canary-providers/src/snapshot.rs
// ============================================================================
// Module: Public Snapshot Client
// Description: Public snapshot receipt with the snapshotBasePath → authBasePath
//              404 fallback (spec.md §4.5 step B).
// Purpose: Isolate the two-prefix retry dance so the runner only ever sees
//          one resolved receipt.
// Dependencies: canary-core, reqwest, serde_json
// ============================================================================

use std::time::Duration;

use canary_core::PublicSnapshotReceipt;
use reqwest::blocking::Client;
use serde_json::Value;

use crate::error::ProviderError;

/// Outcome of the public snapshot receipt probe (spec.md §4.5 step B).
#[derive(Debug, Clone)]
pub struct SnapshotFetch {
    /// The recordable receipt (`{url, status, ok, prefix}`).
    pub receipt: PublicSnapshotReceipt,
    /// The parsed response body, when the response was JSON.
    pub data: Option<Value>,
}

impl SnapshotFetch {
    /// Returns whether any key at any depth of `data` begins (case
    /// insensitively) with `tpose` (spec.md §4.5 step B).
    #[must_use]
    pub fn contains_tpose_key(&self) -> bool {
        self.data.as_ref().is_some_and(contains_tpose_key)
    }
}

fn contains_tpose_key(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.iter().any(|(key, nested)| {
            key.to_lowercase().starts_with("tpose") || contains_tpose_key(nested)
        }),
        Value::Array(items) => items.iter().any(contains_tpose_key),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => false,
    }
}

/// The public snapshot endpoint's character receipt probe.
pub trait SnapshotClient {
    /// Fetches the public snapshot receipt for `character_id`, retrying once
    /// against `auth_base_path` on a 404 from `snapshot_base_path` (spec.md
    /// §4.5 step B, and Open Question resolution: non-404 errors from the
    /// first prefix are returned as-is, without a retry).
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] only on transport failure; non-2xx
    /// statuses are represented in the returned [`SnapshotFetch`] so the
    /// caller can build the instrumentation error with token context.
    fn fetch_snapshot(
        &self,
        snapshot_base_path: &str,
        auth_base_path: &str,
        character_id: &str,
    ) -> Result<SnapshotFetch, ProviderError>;
}

/// HTTP-backed [`SnapshotClient`].
pub struct HttpSnapshotClient {
    client: Client,
    api_base_url: String,
    access_token: String,
}

impl HttpSnapshotClient {
    /// Builds a client against `api_base_url`, authenticating with
    /// `access_token`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if the HTTP client cannot be constructed.
    pub fn new(api_base_url: impl Into<String>, access_token: impl Into<String>) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build().map_err(|err| {
            ProviderError::Transport { url: "public-snapshot".to_string(), message: err.to_string() }
        })?;
        Ok(Self { client, api_base_url: api_base_url.into(), access_token: access_token.into() })
    }

    fn probe(&self, prefix: &str, character_id: &str) -> Result<(String, u16, Option<Value>), ProviderError> {
        let url = format!("{}{prefix}/characters/{character_id}", self.api_base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .map_err(|err| ProviderError::Transport { url: url.clone(), message: err.to_string() })?;
        let status = response.status().as_u16();
        let data = response.json::<Value>().ok();
        Ok((url, status, data))
    }
}

impl SnapshotClient for HttpSnapshotClient {
    fn fetch_snapshot(
        &self,
        snapshot_base_path: &str,
        auth_base_path: &str,
        character_id: &str,
    ) -> Result<SnapshotFetch, ProviderError> {
        let (url, status, data) = self.probe(snapshot_base_path, character_id)?;
        if status != 404 {
            let ok = (200..300).contains(&status);
            return Ok(SnapshotFetch {
                receipt: PublicSnapshotReceipt { url, status, ok, prefix: snapshot_base_path.to_string() },
                data,
            });
        }
        let (url, status, data) = self.probe(auth_base_path, character_id)?;
        let ok = (200..300).contains(&status);
        Ok(SnapshotFetch {
            receipt: PublicSnapshotReceipt { url, status, ok, prefix: auth_base_path.to_string() },
            data,
        })
    }
}
