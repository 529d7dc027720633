use alloy_primitives::B256;
use async_trait::async_trait;
use dalink_primitives::{ChainReaderError, Receipt, TxCandidate};

use crate::errors::TxManagerError;

/// Signs, publishes and waits for inclusion of transactions on one chain.
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
#[async_trait]
pub trait TxManager: Send + Sync {
    /// Sends `candidate` and resolves once it is included.
    async fn send(&self, candidate: &TxCandidate) -> Result<Receipt, TxManagerError>;
}

/// Head and header queries against the DA chain.
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
#[async_trait]
pub trait ChainHeadReader: Send + Sync {
    /// Current head block number.
    async fn block_number(&self) -> Result<u64, ChainReaderError>;

    /// Hash of the canonical block at `number`.
    async fn block_hash_by_number(&self, number: u64) -> Result<B256, ChainReaderError>;
}
