use alloy_primitives::Bytes;
use async_trait::async_trait;

use crate::errors::DaTransportError;

/// Blob transport towards a DA server. Implementations do not retry.
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
#[async_trait]
pub trait DaTransport: Send + Sync {
    /// Stores `blob` on the server at `endpoint`, returning the locator.
    async fn store(&self, endpoint: &str, blob: &[u8]) -> Result<String, DaTransportError>;

    /// Fetches raw bytes from `url`.
    async fn fetch(&self, url: &str) -> Result<Bytes, DaTransportError>;
}
