// canary-providers/src/state_store.rs
// ============================================================================
// Module: State Store Client
// Description: Character/attempt persistence and schema-parity probing
//              (spec.md §4.4 step 6, §4.5 step C).
// Purpose: Give the preflight runner and canary runner a thin, mockable
//          seam over the state store, which is explicitly an external
//          collaborator (spec.md §1).
// Dependencies: canary-core, reqwest, serde_json
// ============================================================================

use std::time::Duration;

use canary_core::AttemptRecord;
use canary_core::AttemptSet;
use canary_core::CharacterId;
use canary_core::CharacterRecord;
use canary_core::NormalizedCanaryInput;
use canary_core::RunNonce;
use reqwest::blocking::Client;
use serde_json::Value;

use crate::error::ProviderError;

/// Outcome of probing one `characters` table column (spec.md §4.4 step 6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnProbe {
    /// `select <col> limit 1` succeeded.
    Present,
    /// The state store returned a "column does not exist" error.
    Missing,
}

/// The state store's character/attempt persistence and schema-probe
/// surface.
pub trait StateStoreClient {
    /// Inserts a new character row for component-mode execution (spec.md
    /// §4.5 step A), tagging it with the run's `canary_nonce`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on transport failure or a fatal status.
    fn insert_character(
        &self,
        normalized: &NormalizedCanaryInput,
        nonce: &RunNonce,
    ) -> Result<CharacterId, ProviderError>;

    /// Fetches one character row, if it exists.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on transport failure or a fatal status.
    fn fetch_character(&self, id: &CharacterId) -> Result<Option<CharacterRecord>, ProviderError>;

    /// Fetches a character's full attempt history, ordered by creation time
    /// descending (spec.md §4.5 step C).
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on transport failure or a fatal status.
    fn fetch_attempts(&self, id: &CharacterId) -> Result<AttemptSet, ProviderError>;

    /// Probes one `characters` table column for schema parity (spec.md
    /// §4.4 step 6).
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on transport failure or a fatal status
    /// that is not itself the "column does not exist" signal.
    fn probe_column(&self, table: &str, column: &str) -> Result<ColumnProbe, ProviderError>;
}

/// HTTP-backed [`StateStoreClient`].
pub struct HttpStateStoreClient {
    client: Client,
    base_url: String,
    service_credential: String,
}

impl HttpStateStoreClient {
    /// Builds a client against `base_url`, authenticating with the
    /// supplied service credential.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if the HTTP client cannot be constructed.
    pub fn new(
        base_url: impl Into<String>,
        service_credential: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build().map_err(|err| {
            ProviderError::Transport { url: "state-store".to_string(), message: err.to_string() }
        })?;
        Ok(Self { client, base_url: base_url.into(), service_credential: service_credential.into() })
    }

    fn request(&self, path: &str) -> reqwest::blocking::RequestBuilder {
        self.client.get(format!("{}{path}", self.base_url)).bearer_auth(&self.service_credential)
    }
}

impl StateStoreClient for HttpStateStoreClient {
    fn insert_character(
        &self,
        normalized: &NormalizedCanaryInput,
        nonce: &RunNonce,
    ) -> Result<CharacterId, ProviderError> {
        let url = format!("{}/rest/v1/characters", self.base_url);
        let body = serde_json::json!({
            "species": normalized.species,
            "name": normalized.display_name,
            "canary_nonce": nonce.as_str(),
        });
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.service_credential)
            .json(&body)
            .send()
            .map_err(|err| ProviderError::Transport { url: url.clone(), message: err.to_string() })?;
        if !response.status().is_success() {
            return Err(ProviderError::Status { url, status: response.status().as_u16() });
        }
        let value: Value = response
            .json()
            .map_err(|err| ProviderError::Decode { url: url.clone(), message: err.to_string() })?;
        let id = value
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| ProviderError::Decode { url, message: "missing id in insert response".to_string() })?;
        Ok(CharacterId::new(id))
    }

    fn fetch_character(&self, id: &CharacterId) -> Result<Option<CharacterRecord>, ProviderError> {
        let url = format!("{}/rest/v1/characters?id=eq.{}", self.base_url, id.as_str());
        let response = self
            .request(&format!("/rest/v1/characters?id=eq.{}", id.as_str()))
            .send()
            .map_err(|err| ProviderError::Transport { url: url.clone(), message: err.to_string() })?;
        if response.status().as_u16() == 404 {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(ProviderError::Status { url, status: response.status().as_u16() });
        }
        let mut records: Vec<CharacterRecord> = response
            .json()
            .map_err(|err| ProviderError::Decode { url, message: err.to_string() })?;
        Ok(records.pop())
    }

    fn fetch_attempts(&self, id: &CharacterId) -> Result<AttemptSet, ProviderError> {
        let path = format!("/rest/v1/attempts?character_id=eq.{}&order=created_at.desc", id.as_str());
        let url = format!("{}{path}", self.base_url);
        let response = self
            .request(&path)
            .send()
            .map_err(|err| ProviderError::Transport { url: url.clone(), message: err.to_string() })?;
        if !response.status().is_success() {
            return Err(ProviderError::Status { url, status: response.status().as_u16() });
        }
        let attempts: Vec<AttemptRecord> = response
            .json()
            .map_err(|err| ProviderError::Decode { url, message: err.to_string() })?;
        Ok(AttemptSet::new(attempts))
    }

    fn probe_column(&self, table: &str, column: &str) -> Result<ColumnProbe, ProviderError> {
        let path = format!("/rest/v1/{table}?select={column}&limit=1");
        let url = format!("{}{path}", self.base_url);
        let response = self
            .request(&path)
            .send()
            .map_err(|err| ProviderError::Transport { url: url.clone(), message: err.to_string() })?;
        if response.status().is_success() {
            return Ok(ColumnProbe::Present);
        }
        let status = response.status().as_u16();
        let body = response.text().unwrap_or_default();
        if body.to_lowercase().contains("column") && body.to_lowercase().contains("does not exist") {
            return Ok(ColumnProbe::Missing);
        }
        Err(ProviderError::Status { url, status })
    }
}
