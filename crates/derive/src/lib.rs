//! Calldata data source for the derivation pipeline.
//!
//! Scans an L1 block for pointer transactions sent by the authorized batch
//! submitter to the batch inbox, resolves each pointer to its payload on the
//! DA chain and yields the payloads one by one.

mod errors;
mod inbox;
mod source;
mod timeout;
mod traits;

pub use errors::{DataSourceError, TemporaryError};
pub use inbox::inbox_pointers;
pub use source::{DataSource, DataSourceFactory};
pub use timeout::TimeoutChainReader;
#[cfg(any(test, feature = "test-utils"))]
pub use traits::MockChainReader;
pub use traits::{ChainReader, DataIter};
