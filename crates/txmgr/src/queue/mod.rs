//! Submission queue: direct sends, DA legs and the pointer batcher.

mod batcher;
mod ctx;
mod da_leg;
mod handle;
mod send_group;


pub use handle::{create_tx_queue, TxQueue, TxReceipt};

/// Number of DA-bound operations (stores and two-step sends) that may be
/// outstanding at once. A slot is held until the resulting pointer is
/// committed on L1.
pub const DA_ADMISSION_WEIGHT: usize = 10;

/// Capacity of the channel feeding the batcher.
const BATCHER_CHANNEL_CAPACITY: usize = 64;
