use alloy_consensus::TxEnvelope;
use alloy_primitives::{Bytes, B256};
use async_trait::async_trait;
use dalink_primitives::{BlockId, BlockInfo, ChainReaderError};

use crate::errors::DataSourceError;

/// Read access to L1 blocks and to data committed on the DA chain.
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Returns the header summary and transactions of `block`.
    async fn block_transactions(
        &self,
        block: &BlockId,
    ) -> Result<(BlockInfo, Vec<TxEnvelope>), ChainReaderError>;

    /// Returns the payload carried by DA transaction `tx_hash` and its
    /// current number of confirmations.
    async fn data_by_tx_hash(&self, tx_hash: B256) -> Result<(Bytes, u64), ChainReaderError>;
}

/// Pull-based sequence of payloads.
#[async_trait]
pub trait DataIter {
    /// Returns the next payload, or `Ok(None)` once the sequence is exhausted.
    async fn next(&mut self) -> Result<Option<Bytes>, DataSourceError>;
}
