use std::time::Duration;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// Default number of DA-chain confirmations required before a payload is used.
const DEFAULT_NUM_CONFIRMATIONS_DA: u64 = 30;

/// Default per-request timeout for chain reader calls.
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;

/// Configuration of the calldata data source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivationConfig {
    /// L1 address receiving pointer transactions from the batch submitter.
    pub batch_inbox_address: Address,

    #[serde(default = "default_num_confirmations_da")]
    pub num_confirmations_da: u64,
}

fn default_num_confirmations_da() -> u64 {
    DEFAULT_NUM_CONFIRMATIONS_DA
}

impl DerivationConfig {
    pub fn new(batch_inbox_address: Address) -> Self {
        Self {
            batch_inbox_address,
            num_confirmations_da: DEFAULT_NUM_CONFIRMATIONS_DA,
        }
    }

    pub fn with_num_confirmations_da(mut self, num_confirmations_da: u64) -> Self {
        self.num_confirmations_da = num_confirmations_da;
        self
    }
}

/// Chain reader client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderConfig {
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl ReaderConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
