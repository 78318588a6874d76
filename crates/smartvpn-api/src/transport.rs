// Shared transport configuration for building reqwest::Client instances.

use std::time::Duration;

/// Base URL the original mobile client was pointed at.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3001/api";

/// Transport settings for the backend HTTP client.
///
/// No timeout unless one is configured; requests otherwise rely on the
/// platform's own connect/read behavior.
#[derive(Debug, Clone, Default)]
pub struct TransportConfig {
    pub timeout: Option<Duration>,
}

impl TransportConfig {
    /// Set an explicit per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("smartvpn/", env!("CARGO_PKG_VERSION")));

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        builder.build().map_err(crate::error::Error::Transport)
    }
}
