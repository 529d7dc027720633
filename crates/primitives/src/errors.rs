//! Errors surfaced by chain reader implementations.

use std::time::Duration;

use thiserror::Error;

/// Error returned by chain reader queries.
#[derive(Debug, Error)]
pub enum ChainReaderError {
    /// The requested block or transaction is unknown to the node.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request did not complete within the configured timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// RPC call failed.
    #[error("rpc error: {0}")]
    Rpc(String),

    #[error(transparent)]
    Other(#[from] eyre::Error),
}

impl ChainReaderError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn rpc(msg: impl Into<String>) -> Self {
        Self::Rpc(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
