// canary-providers/src/param_store.rs
// ============================================================================
// Module: Parameter Store Client
// Description: HTTP-backed `canary_config::SecretSource` (spec.md §4.2).
// Purpose: Supply the concrete parameter-store collaborator the layered
//          config resolver is built against, without pulling HTTP concerns
//          into `canary-config` itself.
// Dependencies: canary-config, reqwest
// ============================================================================

use std::time::Duration;

use canary_config::SecretSource;
use reqwest::blocking::Client;
use serde_json::Value;

/// HTTP-backed [`SecretSource`] over a parameter-store-compatible GET/PUT
/// API.
pub struct HttpParamStoreClient {
    client: Client,
    base_url: String,
    service_credential: String,
}

impl HttpParamStoreClient {
    /// Builds a client against `base_url`, authenticating with the service
    /// credential used for administrative parameter-store access.
    ///
    /// # Errors
    ///
    /// Returns an error message if the HTTP client cannot be constructed.
    pub fn new(base_url: impl Into<String>, service_credential: impl Into<String>) -> Result<Self, String> {
        let client =
            Client::builder().timeout(Duration::from_secs(15)).build().map_err(|err| err.to_string())?;
        Ok(Self { client, base_url: base_url.into(), service_credential: service_credential.into() })
    }
}

impl SecretSource for HttpParamStoreClient {
    fn get_parameter(&self, path: &str) -> Result<Option<String>, String> {
        let url = format!("{}/parameters{path}", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.service_credential)
            .query(&[("withDecryption", "true")])
            .send()
            .map_err(|err| err.to_string())?;
        if response.status().as_u16() == 404 {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(format!("parameter store returned status {}", response.status()));
        }
        let value: Value = response.json().map_err(|err| err.to_string())?;
        Ok(value.get("value").and_then(Value::as_str).map(str::to_string))
    }

    fn put_parameter(&self, path: &str, value: &str) -> Result<(), String> {
        let url = format!("{}/parameters{path}", self.base_url);
        let body = serde_json::json!({ "value": value, "type": "SecureString", "overwrite": true });
        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.service_credential)
            .json(&body)
            .send()
            .map_err(|err| err.to_string())?;
        if !response.status().is_success() {
            return Err(format!("parameter store write returned status {}", response.status()));
        }
        Ok(())
    }
}
