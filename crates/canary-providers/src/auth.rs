// canary-providers/src/auth.rs
// ============================================================================
// Module: Auth Client
// Description: Auth-prefix detection, login, /auth/me, and token-issuer
//              classification (spec.md §4.4 steps 3 and 7).
// Purpose: Give the preflight runner one seam for every auth-service call,
//          and keep the JWT issuer parse (no signature verification — this
//          harness only classifies, never authenticates the token itself)
//          out of the preflight control flow.
// Dependencies: canary-config, reqwest, serde_json
// ============================================================================

use std::time::Duration;

use canary_config::TokenKind;
use reqwest::blocking::Client;
use serde_json::Value;

use crate::error::ProviderError;

/// Outcome of a successful login (spec.md §4.4 step 7).
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// The access token returned by the login call.
    pub access_token: String,
}

/// Outcome of classifying an access token via `/auth/me` (spec.md §4.4
/// step 7).
#[derive(Debug, Clone)]
pub struct TokenClassification {
    /// `supabase_jwt` if the issuer contains `supabase`, else `custom_jwt`.
    pub kind: TokenKind,
    /// Raw issuer string extracted from the token, if one could be parsed.
    pub issuer: Option<String>,
}

/// The auth service's login, identity, and prefix-detection surface.
pub trait AuthClient {
    /// Probes `<api_base_url>/api/v1/auth/login` then
    /// `<api_base_url>/v1/auth/login` with a dummy credential, returning
    /// the first prefix whose status is not 404. Returns `None` if both are
    /// 404 (spec.md §4.4 step 3: the caller then defaults to `/api/v1` and
    /// logs a warning).
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on transport failure of either probe.
    fn detect_auth_prefix(&self) -> Result<Option<String>, ProviderError>;

    /// Logs in with `email`/`password` against `<api_base_url><auth_base_path>/auth/login`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on transport failure or a non-2xx status.
    fn login(&self, auth_base_path: &str, email: &str, password: &str) -> Result<LoginOutcome, ProviderError>;

    /// GETs `<api_base_url><auth_base_path>/auth/me` with `access_token` and
    /// classifies the issuer.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on transport failure or a non-2xx status.
    fn fetch_identity(
        &self,
        auth_base_path: &str,
        access_token: &str,
    ) -> Result<TokenClassification, ProviderError>;
}

/// HTTP-backed [`AuthClient`].
pub struct HttpAuthClient {
    client: Client,
    api_base_url: String,
}

impl HttpAuthClient {
    /// Builds a client against `api_base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if the HTTP client cannot be constructed.
    pub fn new(api_base_url: impl Into<String>) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(Duration::from_secs(15)).build().map_err(|err| {
            ProviderError::Transport { url: "auth-service".to_string(), message: err.to_string() }
        })?;
        Ok(Self { client, api_base_url: api_base_url.into() })
    }

    fn probe_login(&self, prefix: &str) -> Result<u16, ProviderError> {
        let url = format!("{}{prefix}/auth/login", self.api_base_url);
        let body = serde_json::json!({ "email": "canary-prefix-probe@example.com", "password": "probe" });
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|err| ProviderError::Transport { url, message: err.to_string() })?;
        Ok(response.status().as_u16())
    }
}

impl AuthClient for HttpAuthClient {
    fn detect_auth_prefix(&self) -> Result<Option<String>, ProviderError> {
        for prefix in ["/api/v1", "/v1"] {
            if self.probe_login(prefix)? != 404 {
                return Ok(Some(prefix.to_string()));
            }
        }
        Ok(None)
    }

    fn login(&self, auth_base_path: &str, email: &str, password: &str) -> Result<LoginOutcome, ProviderError> {
        let url = format!("{}{auth_base_path}/auth/login", self.api_base_url);
        let body = serde_json::json!({ "email": email, "password": password });
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|err| ProviderError::Transport { url: url.clone(), message: err.to_string() })?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status { url, status: status.as_u16() });
        }
        let value: Value =
            response.json().map_err(|err| ProviderError::Decode { url: url.clone(), message: err.to_string() })?;
        let access_token = value
            .get("accessToken")
            .or_else(|| value.get("access_token"))
            .and_then(Value::as_str)
            .ok_or_else(|| ProviderError::Decode { url, message: "login response carried no access token".to_string() })?;
        Ok(LoginOutcome { access_token: access_token.to_string() })
    }

    fn fetch_identity(
        &self,
        auth_base_path: &str,
        access_token: &str,
    ) -> Result<TokenClassification, ProviderError> {
        let url = format!("{}{auth_base_path}/auth/me", self.api_base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .map_err(|err| ProviderError::Transport { url: url.clone(), message: err.to_string() })?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status { url, status: status.as_u16() });
        }
        Ok(classify_token(access_token))
    }
}

/// Classifies a JWT's issuer without verifying its signature: the issuer is
/// only used to route logging, never to authenticate the token itself
/// (spec.md §4.4 step 7).
#[must_use]
pub fn classify_token(access_token: &str) -> TokenClassification {
    let issuer = decode_jwt_issuer(access_token);
    let kind = match issuer.as_deref() {
        Some(issuer) if issuer.to_lowercase().contains("supabase") => TokenKind::SupabaseJwt,
        _ => TokenKind::CustomJwt,
    };
    TokenClassification { kind, issuer }
}

fn decode_jwt_issuer(token: &str) -> Option<String> {
    let payload_segment = token.split('.').nth(1)?;
    let payload = base64_url_decode(payload_segment)?;
    let value: Value = serde_json::from_slice(&payload).ok()?;
    value.get("iss").and_then(Value::as_str).map(str::to_string)
}

fn base64_url_decode(segment: &str) -> Option<Vec<u8>> {
    const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";
    let mut table = [255u8; 256];
    for (index, &byte) in ALPHABET.iter().enumerate() {
        table[byte as usize] = index as u8;
    }
    let mut bits: u32 = 0;
    let mut bit_count = 0u32;
    let mut out = Vec::with_capacity(segment.len() * 3 / 4 + 3);
    for byte in segment.bytes() {
        let value = table[byte as usize];
        if value == 255 {
            continue;
        }
        bits = (bits << 6) | u32::from(value);
        bit_count += 6;
        if bit_count >= 8 {
            bit_count -= 8;
            out.push((bits >> bit_count) as u8);
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_unpadded(bytes: &[u8]) -> String {
        const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";
        let mut out = String::new();
        for chunk in bytes.chunks(3) {
            let b0 = chunk[0];
            let b1 = chunk.get(1).copied().unwrap_or(0);
            let b2 = chunk.get(2).copied().unwrap_or(0);
            let triplet = (u32::from(b0) << 16) | (u32::from(b1) << 8) | u32::from(b2);
            let chars = [
                ALPHABET[((triplet >> 18) & 0x3f) as usize],
                ALPHABET[((triplet >> 12) & 0x3f) as usize],
                ALPHABET[((triplet >> 6) & 0x3f) as usize],
                ALPHABET[(triplet & 0x3f) as usize],
            ];
            let keep = match chunk.len() {
                1 => 2,
                2 => 3,
                _ => 4,
            };
            out.push_str(std::str::from_utf8(&chars[..keep]).unwrap_or(""));
        }
        out
    }

    fn fake_jwt(issuer: &str) -> String {
        let header = encode_unpadded(b"{\"alg\":\"none\"}");
        let payload = encode_unpadded(format!("{{\"iss\":\"{issuer}\"}}").as_bytes());
        format!("{header}.{payload}.sig")
    }

    #[test]
    fn classifies_supabase_issuer() {
        let classification = classify_token(&fake_jwt("https://abc.supabase.co/auth/v1"));
        assert_eq!(classification.kind, TokenKind::SupabaseJwt);
    }

    #[test]
    fn classifies_other_issuer_as_custom() {
        let classification = classify_token(&fake_jwt("https://auth.example.com"));
        assert_eq!(classification.kind, TokenKind::CustomJwt);
    }

    #[test]
    fn unparseable_token_defaults_to_custom() {
        let classification = classify_token("not-a-jwt");
        assert_eq!(classification.kind, TokenKind::CustomJwt);
        assert!(classification.issuer.is_none());
    }
}
