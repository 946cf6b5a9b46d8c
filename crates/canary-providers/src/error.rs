// canary-providers/src/error.rs
// ============================================================================
// Module: Provider Errors
// Description: The error type shared by every HTTP-backed collaborator.
// Purpose: Give `canary-preflight` and `canary-runner` one error shape to
//          match on regardless of which external collaborator failed.
// Dependencies: thiserror
// ============================================================================

use thiserror::Error;

/// Error produced by any HTTP-backed collaborator in this crate.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The underlying HTTP request could not be sent at all (DNS failure,
    /// connection refused, timeout).
    #[error("request to {url} failed: {message}")]
    Transport {
        /// The URL that was being requested.
        url: String,
        /// Transport-level failure description.
        message: String,
    },
    /// The response could not be parsed as the expected shape.
    #[error("response from {url} could not be parsed: {message}")]
    Decode {
        /// The URL that produced the unparseable response.
        url: String,
        /// Decode failure description.
        message: String,
    },
    /// The collaborator responded with a non-success status the caller
    /// treats as fatal.
    #[error("{url} returned status {status}")]
    Status {
        /// The URL that was requested.
        url: String,
        /// The HTTP status code returned.
        status: u16,
    },
}

impl ProviderError {
    /// Returns the HTTP status code, when this error carries one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport { .. } | Self::Decode { .. } => None,
        }
    }

    /// Returns whether this error looks like a DNS resolution failure.
    #[must_use]
    pub fn is_dns_failure(&self) -> bool {
        matches!(self, Self::Transport { message, .. } if message.to_lowercase().contains("dns") || message.to_lowercase().contains("resolve"))
    }
}
