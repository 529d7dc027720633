//! Data types shared by the submission queue and the derivation data source.

pub mod block;
pub mod candidate;
pub mod errors;
pub mod locator;
pub mod pointer;

pub use block::{BlockId, BlockInfo};
pub use candidate::{Receipt, TxCandidate};
pub use errors::ChainReaderError;
pub use locator::{BlobLocator, LocatorError};
pub use pointer::{DaPointer, PointerError, PointerTag, DA_TX_HASH_LEN};
