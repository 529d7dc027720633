use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default timeout for storing a blob on the DA server.
const DEFAULT_STORE_TIMEOUT_MS: u64 = 120_000;

/// Default timeout for fetching a blob from the DA server.
const DEFAULT_FETCH_TIMEOUT_MS: u64 = 60_000;

/// HTTP DA server client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaServerConfig {
    /// Base URL of the DA server, e.g. `http://localhost:26659`.
    pub endpoint: String,

    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,

    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
}

fn default_store_timeout_ms() -> u64 {
    DEFAULT_STORE_TIMEOUT_MS
}

fn default_fetch_timeout_ms() -> u64 {
    DEFAULT_FETCH_TIMEOUT_MS
}

impl DaServerConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            store_timeout_ms: DEFAULT_STORE_TIMEOUT_MS,
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
        }
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}
