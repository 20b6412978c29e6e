//! Active readiness probing of the model server.
//!
//! # Responsibilities
//! - Send a single GET to the configured model server URL
//! - Bound the probe by the upstream timeout

use std::time::Duration;

use url::Url;

/// Result of one probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The server answered; any HTTP status counts.
    Reachable { status: u16 },
    Timeout,
    Unreachable { error: String },
}

impl ProbeOutcome {
    pub fn is_reachable(&self) -> bool {
        matches!(self, ProbeOutcome::Reachable { .. })
    }
}

pub async fn probe_model_server(
    client: &reqwest::Client,
    url: &Url,
    timeout: Duration,
) -> ProbeOutcome {
    let result = client
        .get(url.clone())
        .header("user-agent", "nanocode-gateway-readiness")
        .timeout(timeout)
        .send()
        .await;

    match result {
        Ok(response) => ProbeOutcome::Reachable {
            status: response.status().as_u16(),
        },
        Err(e) if e.is_timeout() => {
            tracing::warn!(url = %url, "Readiness probe failed: timeout");
            ProbeOutcome::Timeout
        }
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "Readiness probe failed: connection error");
            ProbeOutcome::Unreachable {
                error: e.to_string(),
            }
        }
    }
}
