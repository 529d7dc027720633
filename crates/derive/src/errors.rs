use alloy_primitives::B256;
use dalink_primitives::{ChainReaderError, PointerError};
use thiserror::Error;

/// Error returned by a data source.
#[derive(Debug, Error)]
pub enum DataSourceError {
    /// The L1 block is unknown, the pipeline must reset.
    #[error("block not found, reset required: {0}")]
    Reset(#[source] ChainReaderError),

    /// Retrying the same call later may succeed.
    #[error(transparent)]
    Temporary(#[from] TemporaryError),
}

impl DataSourceError {
    pub fn is_reset(&self) -> bool {
        matches!(self, Self::Reset(_))
    }

    pub fn is_temporary(&self) -> bool {
        matches!(self, Self::Temporary(_))
    }
}

#[derive(Debug, Error)]
pub enum TemporaryError {
    #[error("failed to fetch block transactions: {0}")]
    FetchBlock(#[source] ChainReaderError),

    #[error("malformed pointer in tx {tx_hash}: {source}")]
    MalformedPointer {
        tx_hash: B256,
        #[source]
        source: PointerError,
    },

    #[error("blob key pointer in tx {tx_hash} cannot be resolved on the da chain")]
    UnsupportedPointer { tx_hash: B256, key: String },

    #[error("failed to fetch da data of {da_tx}: {source}")]
    DataLookup {
        da_tx: B256,
        #[source]
        source: ChainReaderError,
    },

    #[error("da tx {da_tx} has {confirmations} confirmations, need {required}")]
    InsufficientConfirmations {
        da_tx: B256,
        confirmations: u64,
        required: u64,
    },
}

impl From<ChainReaderError> for DataSourceError {
    fn from(err: ChainReaderError) -> Self {
        if err.is_not_found() {
            Self::Reset(err)
        } else {
            Self::Temporary(TemporaryError::FetchBlock(err))
        }
    }
}
