// canary-providers/src/generation.rs
// ============================================================================
// Module: Generation Service Client
// Description: Invocation of the two generation actions plus fire-and-forget
//              edit-fix remediation (spec.md §4.5 step A, §4.5 step E, §9).
// Purpose: Give the canary runner a thin, mockable seam over the image
//          generation service, which is explicitly an external collaborator
//          (spec.md §1).
// Dependencies: canary-core, reqwest, serde_json
// ============================================================================

//! ## Overview
//! The remediation fire-and-forget dispatch is modeled as the
//! `{action, characterId, attemptId, assetType}` message spec.md §9
//! describes, sent through [`GenerationServiceClient::enqueue_edit`] — never
//! as a callback. `enqueue_edit` does not wait for the edit to complete;
//! the runner separately polls the state store for the resulting attempt.

use std::time::Duration;

use canary_core::AssetType;
use canary_core::AttemptId;
use canary_core::CharacterId;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ProviderError;

/// One `{type, url, traceUrl, promptHash, openaiRequestId}` entry returned by
/// an invocation (spec.md §4.5 step A).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageEntry {
    /// Asset this image entry belongs to.
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    /// Resulting asset URL.
    pub url: String,
    /// Trace URL for this asset.
    pub trace_url: Option<String>,
    /// Prompt hash for this asset.
    pub prompt_hash: Option<String>,
    /// Originating provider request id.
    pub openai_request_id: Option<String>,
}

/// Response shape shared by both invocation actions (spec.md §4.5 step A).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResponse {
    /// The resulting character id. Required for `e2e` invocations; its
    /// absence is fatal for that canary (spec.md §4.5 step A).
    pub character_id: Option<String>,
    /// Per-asset image entries, when the invocation returned them.
    #[serde(default)]
    pub images: Vec<ImageEntry>,
}

/// The fire-and-forget remediation message (spec.md §9, "Fire-and-forget
/// remediation").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemediationRequest {
    /// Always `edit_character_image` in this harness.
    pub action: String,
    /// Character the edit targets.
    pub character_id: CharacterId,
    /// Attempt being edited.
    pub attempt_id: AttemptId,
    /// Asset type being edited.
    pub asset_type: AssetType,
}

impl RemediationRequest {
    /// Builds an `edit_character_image` remediation request.
    #[must_use]
    pub fn edit(character_id: CharacterId, attempt_id: AttemptId, asset_type: AssetType) -> Self {
        Self { action: "edit_character_image".to_string(), character_id, attempt_id, asset_type }
    }
}

/// The generation service's two invocation actions plus remediation
/// dispatch.
pub trait GenerationServiceClient {
    /// Invokes `complete_character_creation_with_visuals` (e2e mode,
    /// spec.md §4.5 step A).
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on transport failure or a fatal status.
    fn complete_character_creation_with_visuals(
        &self,
        traits_payload: &Value,
    ) -> Result<InvocationResponse, ProviderError>;

    /// Invokes `generate_character_art` (component mode, spec.md §4.5 step
    /// A).
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on transport failure or a fatal status.
    fn generate_character_art(
        &self,
        character_id: &CharacterId,
    ) -> Result<InvocationResponse, ProviderError>;

    /// Dispatches an edit-fix remediation request, fire-and-forget
    /// (spec.md §4.5 step E).
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] only if the dispatch call itself could not
    /// be sent; the edit's eventual outcome is observed separately by
    /// polling the state store.
    fn enqueue_edit(&self, request: &RemediationRequest) -> Result<(), ProviderError>;
}

/// HTTP-backed [`GenerationServiceClient`].
pub struct HttpGenerationServiceClient {
    client: Client,
    base_url: String,
    access_token: String,
}

impl HttpGenerationServiceClient {
    /// Builds a client against `base_url`, authenticating with
    /// `access_token`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if the HTTP client cannot be constructed.
    pub fn new(base_url: impl Into<String>, access_token: impl Into<String>) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(Duration::from_secs(60)).build().map_err(|err| {
            ProviderError::Transport { url: "generation-service".to_string(), message: err.to_string() }
        })?;
        Ok(Self { client, base_url: base_url.into(), access_token: access_token.into() })
    }

    fn post_json(&self, path: &str, body: &Value) -> Result<InvocationResponse, ProviderError> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .map_err(|err| ProviderError::Transport { url: url.clone(), message: err.to_string() })?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status { url, status: status.as_u16() });
        }
        response
            .json::<InvocationResponse>()
            .map_err(|err| ProviderError::Decode { url, message: err.to_string() })
    }
}

impl GenerationServiceClient for HttpGenerationServiceClient {
    fn complete_character_creation_with_visuals(
        &self,
        traits_payload: &Value,
    ) -> Result<InvocationResponse, ProviderError> {
        self.post_json("/actions/complete_character_creation_with_visuals", traits_payload)
    }

    fn generate_character_art(
        &self,
        character_id: &CharacterId,
    ) -> Result<InvocationResponse, ProviderError> {
        let body = serde_json::json!({ "characterId": character_id.as_str() });
        self.post_json("/actions/generate_character_art", &body)
    }

    fn enqueue_edit(&self, request: &RemediationRequest) -> Result<(), ProviderError> {
        let url = format!("{}/actions/edit_character_image", self.base_url);
        let body = serde_json::json!({
            "action": request.action,
            "characterId": request.character_id.as_str(),
            "attemptId": request.attempt_id.as_str(),
            "assetType": request.asset_type.label(),
        });
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .map_err(|err| ProviderError::Transport { url: url.clone(), message: err.to_string() })?;
        if !response.status().is_success() {
            return Err(ProviderError::Status { url, status: response.status().as_u16() });
        }
        Ok(())
    }
}
