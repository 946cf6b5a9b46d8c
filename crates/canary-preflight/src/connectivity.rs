// canary-preflight/src/connectivity.rs
// ============================================================================
// Step 2: Connectivity Probe
// Description: GET `<apiBase>/ready` and classify the outcome (spec.md §4.4
//              step 2).
// Purpose: Fail fast, with an actionable message, before any credential or
//          schema work runs.
// Dependencies: canary-providers
// ============================================================================

use canary_providers::ProviderError;
use canary_providers::ReadinessClient;
use canary_providers::ReadyOutcome;

use crate::error::PreflightError;

/// Probes `<apiBase>/ready` and classifies the result (spec.md §4.4 step 2).
///
/// # Errors
///
/// Returns [`PreflightError::ReadyEndpointNotFound`] on 404,
/// [`PreflightError::ReadyEndpointServerError`] on 5xx,
/// [`PreflightError::DnsResolutionFailed`] on DNS failure, or
/// [`PreflightError::Provider`] for any other transport failure.
pub fn probe_connectivity(client: &dyn ReadinessClient, api_base_url: &str) -> Result<(), PreflightError> {
    let ready_url = format!("{api_base_url}/ready");
    match client.check_ready() {
        Ok(ReadyOutcome::Reachable) => Ok(()),
        Ok(ReadyOutcome::NotFound) => Err(PreflightError::ReadyEndpointNotFound {
            url: ready_url,
            actions: vec![
                "confirm the API base URL points at the intended deployment".to_string(),
                "verify the generation service exposes a /ready route".to_string(),
            ],
        }),
        Ok(ReadyOutcome::ServerError) => Err(PreflightError::ReadyEndpointServerError { url: ready_url }),
        Err(err) if is_dns_failure(&err) => Err(PreflightError::DnsResolutionFailed {
            url: ready_url,
            actions: vec![
                "confirm the API base URL's hostname is spelled correctly".to_string(),
                "check network/DNS connectivity from this host".to_string(),
            ],
        }),
        Err(err) => Err(PreflightError::Provider(err)),
    }
}

fn is_dns_failure(err: &ProviderError) -> bool {
    err.is_dns_failure()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubReadiness(Result<ReadyOutcome, ProviderError>);

    impl ReadinessClient for StubReadiness {
        fn check_ready(&self) -> Result<ReadyOutcome, ProviderError> {
            match &self.0 {
                Ok(outcome) => Ok(*outcome),
                Err(ProviderError::Transport { url, message }) => {
                    Err(ProviderError::Transport { url: url.clone(), message: message.clone() })
                }
                Err(ProviderError::Status { url, status }) => {
                    Err(ProviderError::Status { url: url.clone(), status: *status })
                }
                Err(ProviderError::Decode { url, message }) => {
                    Err(ProviderError::Decode { url: url.clone(), message: message.clone() })
                }
            }
        }
    }

    #[test]
    fn reachable_passes() {
        let client = StubReadiness(Ok(ReadyOutcome::Reachable));
        assert!(probe_connectivity(&client, "https://api.example.com").is_ok());
    }

    #[test]
    fn not_found_aborts_with_actions() {
        let client = StubReadiness(Ok(ReadyOutcome::NotFound));
        let err = probe_connectivity(&client, "https://api.example.com").expect_err("must abort");
        assert!(matches!(err, PreflightError::ReadyEndpointNotFound { .. }));
    }

    #[test]
    fn server_error_aborts() {
        let client = StubReadiness(Ok(ReadyOutcome::ServerError));
        let err = probe_connectivity(&client, "https://api.example.com").expect_err("must abort");
        assert!(matches!(err, PreflightError::ReadyEndpointServerError { .. }));
    }

    #[test]
    fn dns_failure_is_classified() {
        let client = StubReadiness(Err(ProviderError::Transport {
            url: "https://api.example.com/ready".to_string(),
            message: "dns error: failed to lookup address information".to_string(),
        }));
        let err = probe_connectivity(&client, "https://api.example.com").expect_err("must abort");
        assert!(matches!(err, PreflightError::DnsResolutionFailed { .. }));
    }

    #[test]
    fn other_transport_failure_propagates_as_provider_error() {
        let client = StubReadiness(Err(ProviderError::Transport {
            url: "https://api.example.com/ready".to_string(),
            message: "connection reset".to_string(),
        }));
        let err = probe_connectivity(&client, "https://api.example.com").expect_err("must abort");
        assert!(matches!(err, PreflightError::Provider(_)));
    }
}
