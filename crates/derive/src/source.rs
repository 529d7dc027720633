//! Per-block data source and its factory.

use std::{collections::VecDeque, mem, sync::Arc};

use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;
use dalink_config::DerivationConfig;
use dalink_primitives::BlockId;
use tracing::*;

use crate::{
    errors::{DataSourceError, TemporaryError},
    inbox::inbox_pointers,
    traits::{ChainReader, DataIter},
};

#[derive(Debug)]
enum SourceState {
    /// Nothing fetched yet, or the last attempt failed.
    Unresolved,
    Resolved(VecDeque<Bytes>),
    Exhausted,
}

/// Opens data sources for L1 blocks.
#[derive(Debug)]
pub struct DataSourceFactory<R> {
    config: DerivationConfig,
    reader: Arc<R>,
}

impl<R: ChainReader> DataSourceFactory<R> {
    pub fn new(config: DerivationConfig, reader: Arc<R>) -> Self {
        Self { config, reader }
    }

    /// Opens the data source of `block`, accepting pointers signed by
    /// `batcher_addr`.
    ///
    /// Resolution is attempted right away. A failure is not reported here;
    /// the next call to [`DataIter::next`] retries it.
    pub async fn open_data(&self, block: BlockId, batcher_addr: Address) -> DataSource<R> {
        let mut source = DataSource {
            state: SourceState::Unresolved,
            block,
            batcher_addr,
            inbox: self.config.batch_inbox_address,
            num_confirmations: self.config.num_confirmations_da,
            reader: self.reader.clone(),
        };

        match source.resolve().await {
            Ok(payloads) => source.state = SourceState::Resolved(payloads),
            Err(err) => debug!(%block, %err, "initial data source resolution failed, will retry"),
        }

        source
    }
}

/// Payloads of one L1 block, in block transaction order.
#[derive(Debug)]
pub struct DataSource<R> {
    state: SourceState,
    block: BlockId,
    batcher_addr: Address,
    inbox: Address,
    num_confirmations: u64,
    reader: Arc<R>,
}

impl<R: ChainReader> DataSource<R> {
    pub fn block(&self) -> &BlockId {
        &self.block
    }

    /// Fetches the block and every referenced DA payload. Nothing is returned
    /// unless all of them were obtained.
    async fn resolve(&self) -> Result<VecDeque<Bytes>, DataSourceError> {
        let (info, txs) = self.reader.block_transactions(&self.block).await?;

        let pointers = inbox_pointers(self.inbox, self.batcher_addr, &txs)?;

        let mut payloads = VecDeque::with_capacity(pointers.len());
        for da_tx in pointers {
            let (payload, confirmations) = self
                .reader
                .data_by_tx_hash(da_tx)
                .await
                .map_err(|source| TemporaryError::DataLookup { da_tx, source })?;

            if confirmations < self.num_confirmations {
                return Err(TemporaryError::InsufficientConfirmations {
                    da_tx,
                    confirmations,
                    required: self.num_confirmations,
                }
                .into());
            }

            payloads.push_back(payload);
        }

        debug!(
            block = %self.block,
            timestamp = info.timestamp,
            payloads = payloads.len(),
            "data source resolved"
        );
        Ok(payloads)
    }
}

#[async_trait]
impl<R: ChainReader> DataIter for DataSource<R> {
    async fn next(&mut self) -> Result<Option<Bytes>, DataSourceError> {
        // a cancelled or failed resolution leaves the source unresolved
        let mut payloads = match mem::replace(&mut self.state, SourceState::Unresolved) {
            SourceState::Exhausted => {
                self.state = SourceState::Exhausted;
                return Ok(None);
            }
            SourceState::Resolved(payloads) => payloads,
            SourceState::Unresolved => self.resolve().await?,
        };

        match payloads.pop_front() {
            Some(payload) => {
                self.state = SourceState::Resolved(payloads);
                Ok(Some(payload))
            }
            None => {
                self.state = SourceState::Exhausted;
                Ok(None)
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        sync::atomic::{AtomicU64, Ordering},
    };

    use alloy_consensus::TxEnvelope;
    use alloy_primitives::B256;
    use dalink_primitives::{BlockInfo, ChainReaderError, DaPointer};

    use super::{test_utils::*, *};
    use crate::traits::MockChainReader;

    fn block_id() -> BlockId {
        BlockId::new(B256::repeat_byte(0xb1), 500)
    }

    fn block_info() -> BlockInfo {
        BlockInfo {
            hash: B256::repeat_byte(0xb1),
            number: 500,
            parent_hash: B256::repeat_byte(0xb0),
            timestamp: 1_700_000_000,
        }
    }

    fn factory(reader: MockChainReader) -> DataSourceFactory<MockChainReader> {
        DataSourceFactory::new(DerivationConfig::new(INBOX), Arc::new(reader))
    }

    fn serving_block(reader: &mut MockChainReader, txs: Vec<TxEnvelope>) {
        reader
            .expect_block_transactions()
            .returning(move |_| Ok((block_info(), txs.clone())));
    }

    fn serving_data(reader: &mut MockChainReader, data: HashMap<B256, (Bytes, u64)>) {
        reader
            .expect_data_by_tx_hash()
            .returning(move |hash| Ok(data[&hash].clone()));
    }

    #[tokio::test]
    async fn test_yields_payloads_in_order_then_ends() {
        let batcher = batcher_signer();
        let mut reader = MockChainReader::new();
        reader
            .expect_block_transactions()
            .times(1)
            .withf(|block: &BlockId| *block == block_id())
            .returning(move |_| {
                Ok((
                    block_info(),
                    vec![
                        pointer_tx(&batcher, INBOX, 0, da_hash(1)),
                        pointer_tx(&batcher, INBOX, 1, da_hash(2)),
                        pointer_tx(&batcher, INBOX, 2, da_hash(3)),
                    ],
                ))
            });
        serving_data(
            &mut reader,
            HashMap::from([
                (da_hash(1), (Bytes::from_static(b"one"), 30)),
                (da_hash(2), (Bytes::from_static(b"two"), 31)),
                (da_hash(3), (Bytes::from_static(b"three"), 100)),
            ]),
        );

        let mut source = factory(reader)
            .open_data(block_id(), batcher_signer().address())
            .await;

        assert_eq!(source.next().await.unwrap().unwrap().as_ref(), b"one");
        assert_eq!(source.next().await.unwrap().unwrap().as_ref(), b"two");
        assert_eq!(source.next().await.unwrap().unwrap().as_ref(), b"three");
        assert!(source.next().await.unwrap().is_none());
        assert!(source.next().await.unwrap().is_none());
        assert!(matches!(source.state, SourceState::Exhausted));
    }

    #[tokio::test]
    async fn test_insufficient_confirmations_retries_whole_block() {
        let batcher = batcher_signer();
        let mut reader = MockChainReader::new();
        let block_fetches = Arc::new(AtomicU64::new(0));
        let fetches = block_fetches.clone();
        reader.expect_block_transactions().returning(move |_| {
            fetches.fetch_add(1, Ordering::SeqCst);
            Ok((
                block_info(),
                vec![
                    pointer_tx(&batcher, INBOX, 0, da_hash(1)),
                    pointer_tx(&batcher, INBOX, 1, da_hash(2)),
                ],
            ))
        });

        // da tx 2 gains one confirmation per lookup, starting at 28
        let confirmations = AtomicU64::new(28);
        reader.expect_data_by_tx_hash().returning(move |hash| {
            if hash == da_hash(1) {
                Ok((Bytes::from_static(b"first"), 50))
            } else {
                Ok((
                    Bytes::from_static(b"second"),
                    confirmations.fetch_add(1, Ordering::SeqCst),
                ))
            }
        });

        let mut source = factory(reader)
            .open_data(block_id(), batcher_signer().address())
            .await;
        assert_eq!(block_fetches.load(Ordering::SeqCst), 1);

        let err = source.next().await.unwrap_err();
        assert!(matches!(
            err,
            DataSourceError::Temporary(TemporaryError::InsufficientConfirmations {
                confirmations: 29,
                required: 30,
                ..
            })
        ));
        assert_eq!(block_fetches.load(Ordering::SeqCst), 2);

        assert_eq!(source.next().await.unwrap().unwrap().as_ref(), b"first");
        assert_eq!(block_fetches.load(Ordering::SeqCst), 3);
        assert_eq!(source.next().await.unwrap().unwrap().as_ref(), b"second");
        assert!(source.next().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_block_not_found_is_reset() {
        let mut reader = MockChainReader::new();
        reader
            .expect_block_transactions()
            .returning(|block| Err(ChainReaderError::not_found(block.to_string())));

        let mut source = factory(reader)
            .open_data(block_id(), batcher_signer().address())
            .await;

        assert!(source.next().await.unwrap_err().is_reset());
        assert!(source.next().await.unwrap_err().is_reset());
    }

    #[tokio::test]
    async fn test_fetch_error_is_temporary() {
        let mut reader = MockChainReader::new();
        reader
            .expect_block_transactions()
            .returning(|_| Err(ChainReaderError::rpc("connection refused")));

        let mut source = factory(reader)
            .open_data(block_id(), batcher_signer().address())
            .await;

        let err = source.next().await.unwrap_err();
        assert!(matches!(
            err,
            DataSourceError::Temporary(TemporaryError::FetchBlock(_))
        ));
    }

    #[tokio::test]
    async fn test_da_lookup_error_is_temporary() {
        let batcher = batcher_signer();
        let mut reader = MockChainReader::new();
        serving_block(&mut reader, vec![pointer_tx(&batcher, INBOX, 0, da_hash(9))]);
        reader
            .expect_data_by_tx_hash()
            .returning(|hash| Err(ChainReaderError::not_found(hash.to_string())));

        let mut source = factory(reader).open_data(block_id(), batcher.address()).await;

        // a missing da tx is not a reason to reset the l1 pipeline
        let err = source.next().await.unwrap_err();
        assert!(matches!(
            err,
            DataSourceError::Temporary(TemporaryError::DataLookup { .. })
        ));
    }

    #[tokio::test]
    async fn test_skips_unauthorized_and_invalid_signatures() {
        let batcher = batcher_signer();
        let stranger = stranger_signer();
        let mut reader = MockChainReader::new();
        serving_block(
            &mut reader,
            vec![
                pointer_tx(&stranger, INBOX, 0, da_hash(1)),
                unsigned_tx(INBOX, DaPointer::TxHash(da_hash(2)).encode()),
                pointer_tx(&batcher, INBOX, 0, da_hash(3)),
            ],
        );
        reader
            .expect_data_by_tx_hash()
            .times(1)
            .withf(|hash: &B256| *hash == da_hash(3))
            .returning(|_| Ok((Bytes::from_static(b"legit"), 30)));

        let mut source = factory(reader).open_data(block_id(), batcher.address()).await;

        assert_eq!(source.next().await.unwrap().unwrap().as_ref(), b"legit");
        assert!(source.next().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_blob_key_pointer_is_temporary() {
        let batcher = batcher_signer();
        let mut reader = MockChainReader::new();
        serving_block(
            &mut reader,
            vec![raw_tx(
                &batcher,
                INBOX,
                0,
                DaPointer::BlobKey("ns/42/0".to_owned()).encode(),
            )],
        );
        reader.expect_data_by_tx_hash().never();

        let mut source = factory(reader).open_data(block_id(), batcher.address()).await;

        let err = source.next().await.unwrap_err();
        assert!(matches!(
            err,
            DataSourceError::Temporary(TemporaryError::UnsupportedPointer { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_block_ends_immediately() {
        let mut reader = MockChainReader::new();
        serving_block(&mut reader, Vec::new());

        let mut source = factory(reader)
            .open_data(block_id(), batcher_signer().address())
            .await;

        assert!(source.next().await.unwrap().is_none());
        assert!(matches!(source.state, SourceState::Exhausted));
    }

    #[tokio::test]
    async fn test_failed_next_stays_unresolved() {
        let batcher = batcher_signer();
        let mut reader = MockChainReader::new();
        let calls = AtomicU64::new(0);
        reader.expect_block_transactions().returning(move |_| {
            match calls.fetch_add(1, Ordering::SeqCst) {
                0 | 1 => Err(ChainReaderError::rpc("connection refused")),
                _ => Ok((
                    block_info(),
                    vec![pointer_tx(&batcher_signer(), INBOX, 0, da_hash(4))],
                )),
            }
        });
        serving_data(
            &mut reader,
            HashMap::from([(da_hash(4), (Bytes::from_static(b"late"), 30))]),
        );

        let mut source = factory(reader).open_data(block_id(), batcher.address()).await;
        assert!(matches!(source.state, SourceState::Unresolved));

        assert!(source.next().await.unwrap_err().is_temporary());
        assert!(matches!(source.state, SourceState::Unresolved));

        assert_eq!(source.next().await.unwrap().unwrap().as_ref(), b"late");
        assert!(matches!(source.state, SourceState::Resolved(ref p) if p.is_empty()));
        assert!(source.next().await.unwrap().is_none());
        assert!(matches!(source.state, SourceState::Exhausted));
    }
}
