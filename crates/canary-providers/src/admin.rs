// canary-providers/src/admin.rs
// ============================================================================
// Module: Admin Client
// Description: The create-or-reset-canary-user administrative call (spec.md
//              §4.4 step 5).
// Purpose: Keep the ensure-user collaborator separate from `AuthClient`,
//          which only ever authenticates as the canary user, never
//          provisions it.
// Dependencies: reqwest, serde_json
// ============================================================================

use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::ProviderError;

/// The admin service's canary-user provisioning surface.
pub trait AdminClient {
    /// Creates the canary user if absent, or resets its password if
    /// present (spec.md §4.4 step 5).
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on transport failure or a non-2xx status.
    fn ensure_canary_user(&self, email: &str, password: &str) -> Result<(), ProviderError>;
}

/// HTTP-backed [`AdminClient`].
pub struct HttpAdminClient {
    client: Client,
    api_base_url: String,
    admin_credential: String,
}

impl HttpAdminClient {
    /// Builds a client against `api_base_url`, authenticating with the
    /// supplied admin service credential.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if the HTTP client cannot be constructed.
    pub fn new(api_base_url: impl Into<String>, admin_credential: impl Into<String>) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(Duration::from_secs(20)).build().map_err(|err| {
            ProviderError::Transport { url: "admin-service".to_string(), message: err.to_string() }
        })?;
        Ok(Self { client, api_base_url: api_base_url.into(), admin_credential: admin_credential.into() })
    }
}

impl AdminClient for HttpAdminClient {
    fn ensure_canary_user(&self, email: &str, password: &str) -> Result<(), ProviderError> {
        let url = format!("{}/admin/canary-user", self.api_base_url);
        let body = serde_json::json!({ "email": email, "password": password });
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.admin_credential)
            .json(&body)
            .send()
            .map_err(|err| ProviderError::Transport { url: url.clone(), message: err.to_string() })?;
        if !response.status().is_success() {
            return Err(ProviderError::Status { url, status: response.status().as_u16() });
        }
        Ok(())
    }
}
