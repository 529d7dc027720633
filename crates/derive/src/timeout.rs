use std::time::Duration;

use alloy_consensus::TxEnvelope;
use alloy_primitives::{Bytes, B256};
use async_trait::async_trait;
use dalink_config::ReaderConfig;
use dalink_primitives::{BlockId, BlockInfo, ChainReaderError};
use tokio::time;

use crate::traits::ChainReader;

/// [`ChainReader`] that bounds every call by a fixed timeout.
#[derive(Debug, Clone)]
pub struct TimeoutChainReader<R> {
    inner: R,
    timeout: Duration,
}

impl<R> TimeoutChainReader<R> {
    pub fn new(inner: R, config: &ReaderConfig) -> Self {
        Self {
            inner,
            timeout: config.request_timeout(),
        }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }
}

#[async_trait]
impl<R: ChainReader> ChainReader for TimeoutChainReader<R> {
    async fn block_transactions(
        &self,
        block: &BlockId,
    ) -> Result<(BlockInfo, Vec<TxEnvelope>), ChainReaderError> {
        time::timeout(self.timeout, self.inner.block_transactions(block))
            .await
            .map_err(|_| ChainReaderError::Timeout(self.timeout))?
    }

    async fn data_by_tx_hash(&self, tx_hash: B256) -> Result<(Bytes, u64), ChainReaderError> {
        time::timeout(self.timeout, self.inner.data_by_tx_hash(tx_hash))
            .await
            .map_err(|_| ChainReaderError::Timeout(self.timeout))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reader that takes a fixed time to answer.
    struct SlowReader {
        delay: Duration,
    }

    #[async_trait]
    impl ChainReader for SlowReader {
        async fn block_transactions(
            &self,
            block: &BlockId,
        ) -> Result<(BlockInfo, Vec<TxEnvelope>), ChainReaderError> {
            time::sleep(self.delay).await;
            Ok((
                BlockInfo {
                    hash: block.hash,
                    number: block.number,
                    ..Default::default()
                },
                Vec::new(),
            ))
        }

        async fn data_by_tx_hash(&self, _: B256) -> Result<(Bytes, u64), ChainReaderError> {
            time::sleep(self.delay).await;
            Ok((Bytes::from_static(b"data"), 1))
        }
    }

    fn reader(delay_secs: u64) -> TimeoutChainReader<SlowReader> {
        TimeoutChainReader::new(
            SlowReader {
                delay: Duration::from_secs(delay_secs),
            },
            &ReaderConfig::default(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_calls_pass_through() {
        let reader = reader(1);
        let block = BlockId::new(B256::repeat_byte(1), 7);

        let (info, txs) = reader.block_transactions(&block).await.unwrap();
        assert_eq!(info.number, 7);
        assert!(txs.is_empty());

        let (data, confirmations) = reader.data_by_tx_hash(B256::ZERO).await.unwrap();
        assert_eq!(data.as_ref(), b"data");
        assert_eq!(confirmations, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_calls_time_out() {
        let reader = reader(10);
        let block = BlockId::new(B256::repeat_byte(1), 7);

        let err = reader.block_transactions(&block).await.unwrap_err();
        assert!(matches!(err, ChainReaderError::Timeout(d) if d == Duration::from_secs(5)));

        let err = reader.data_by_tx_hash(B256::ZERO).await.unwrap_err();
        assert!(matches!(err, ChainReaderError::Timeout(_)));
    }
}
