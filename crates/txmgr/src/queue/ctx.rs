use std::{fmt, sync::Arc};

use dalink_config::QueueConfig;
use dalink_da_client::DaTransport;
use tokio::sync::Semaphore;
use tokio_util::{sync::CancellationToken, task::TaskTracker};

use crate::{
    errors::QueueError,
    traits::{ChainHeadReader, TxManager},
};

/// State shared by the queue handle, DA legs and the batcher.
pub(crate) struct QueueCtx {
    pub(crate) config: QueueConfig,
    pub(crate) l1_txmgr: Arc<dyn TxManager>,
    pub(crate) da_txmgr: Arc<dyn TxManager>,
    pub(crate) da_chain: Arc<dyn ChainHeadReader>,
    pub(crate) da_transport: Arc<dyn DaTransport>,
    /// DA admission slots.
    pub(crate) da_admission: Arc<Semaphore>,
    /// Tracks store and two-step legs, including their confirmation waits.
    pub(crate) da_tracker: TaskTracker,
    pub(crate) shutdown: CancellationToken,
    /// Child of `shutdown`, also cancelled once the batcher stops. All queue
    /// work stops on it.
    pub(crate) halt: CancellationToken,
}

impl QueueCtx {
    /// Error for work refused or abandoned because the queue stopped.
    pub(crate) fn stopped_error(&self) -> QueueError {
        if self.shutdown.is_cancelled() {
            QueueError::ShuttingDown
        } else {
            QueueError::Halted
        }
    }
}

impl fmt::Debug for QueueCtx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueCtx")
            .field("config", &self.config)
            .field("da_permits", &self.da_admission.available_permits())
            .field("da_legs", &self.da_tracker.len())
            .field("shutdown", &self.shutdown.is_cancelled())
            .field("halted", &self.halt.is_cancelled())
            .finish_non_exhaustive()
    }
}
