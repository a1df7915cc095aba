// Shared transport configuration for building reqwest::Client instances.
//
// Authentication headers are attached per request by the controller, so the
// client itself only carries timeouts and the user agent.

use std::time::Duration;

const USER_AGENT: &str = concat!("aircon/", env!("CARGO_PKG_VERSION"));

/// Transport settings for the HTTP client.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Total time allowed for a single request, response body included.
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl TransportConfig {
    /// Config with the given request timeout and the default connect timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }

    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout.min(self.timeout))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| crate::error::Error::ClientBuild(e.to_string()))
    }
}
