//! Transaction submission queue.
//!
//! Payloads are either sent straight to L1 or first committed to a DA layer,
//! in which case only a short pointer to the data is later anchored on L1 by
//! a batching task.

mod errors;
mod queue;
mod traits;

pub use errors::{FatalError, QueueError, TxManagerError};
pub use queue::{create_tx_queue, TxQueue, TxReceipt, DA_ADMISSION_WEIGHT};
#[cfg(any(test, feature = "test-utils"))]
pub use traits::{MockChainHeadReader, MockTxManager};
pub use traits::{ChainHeadReader, TxManager};
