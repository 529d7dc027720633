use std::time::Duration;

use alloy_primitives::B256;
use dalink_da_client::DaTransportError;
use dalink_primitives::LocatorError;
use thiserror::Error;

/// Error returned by a [`TxManager`](crate::TxManager).
#[derive(Debug, Error)]
pub enum TxManagerError {
    #[error("transaction rejected: {0}")]
    Rejected(String),

    #[error("rpc error: {0}")]
    Rpc(String),

    #[error(transparent)]
    Other(#[from] eyre::Error),
}

impl TxManagerError {
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    pub fn rpc(msg: impl Into<String>) -> Self {
        Self::Rpc(msg.into())
    }
}

/// Per-request failure delivered in a [`TxReceipt`](crate::TxReceipt).
#[derive(Debug, Error)]
pub enum QueueError {
    /// Every DA admission slot was taken.
    #[error("too many pending txs")]
    TooManyPending,

    #[error("send failed: {0}")]
    TxManager(#[from] TxManagerError),

    #[error("store blob on da server failed: {0}")]
    DaStore(#[from] DaTransportError),

    #[error("da server returned an invalid locator: {0}")]
    InvalidLocator(#[from] LocatorError),

    /// Another send in the same group failed first.
    #[error("send cancelled after a sibling send failed")]
    Cancelled,

    #[error("queue is shutting down")]
    ShuttingDown,

    /// The batcher stopped on a fatal condition; nothing more is committed.
    #[error("queue halted after a fatal error")]
    Halted,
}

impl QueueError {
    pub fn is_saturation(&self) -> bool {
        matches!(self, Self::TooManyPending)
    }
}

/// Condition that stops the batcher and requires operator attention.
#[derive(Debug, Error)]
pub enum FatalError {
    #[error("da tx is forked at block {block_number}: expected {expected}, found {found}")]
    DaReorg {
        block_number: u64,
        expected: B256,
        found: B256,
    },

    #[error("send pointer tx to l1 failed: {0}")]
    L1SendFailed(#[source] TxManagerError),

    #[error("da tx at block {block_number} not fork-safe after {timeout:?}")]
    ConfirmationTimeout { block_number: u64, timeout: Duration },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_saturation() {
        assert!(QueueError::TooManyPending.is_saturation());
        assert!(!QueueError::Cancelled.is_saturation());
        assert!(!QueueError::TxManager(TxManagerError::rpc("boom")).is_saturation());
    }

    #[test]
    fn test_fatal_display() {
        let err = FatalError::DaReorg {
            block_number: 7,
            expected: B256::repeat_byte(1),
            found: B256::repeat_byte(2),
        };
        assert!(err.to_string().starts_with("da tx is forked at block 7"));
    }
}
