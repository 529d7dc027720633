use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore, TryAcquireError};
use tokio_util::{sync::CancellationToken, task::TaskTracker};

/// Group of direct L1 sends that is cancelled as a whole once any member
/// fails.
///
/// A cancelled group keeps running until its members observe the
/// cancellation. The queue replaces it with a fresh group only after it has
/// drained.
#[derive(Debug, Clone)]
pub(crate) struct SendGroup {
    tracker: TaskTracker,
    cancel: CancellationToken,
    limit: Option<Arc<Semaphore>>,
}

impl SendGroup {
    pub(crate) fn new(parent: &CancellationToken, max_pending: Option<usize>) -> Self {
        Self {
            tracker: TaskTracker::new(),
            cancel: parent.child_token(),
            limit: max_pending.map(|n| Arc::new(Semaphore::new(n))),
        }
    }

    pub(crate) fn tracker(&self) -> &TaskTracker {
        &self.tracker
    }

    pub(crate) fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Waits for a free slot. Returns `None` if the group gets cancelled
    /// first. An unbounded group always yields `Some(None)`.
    pub(crate) async fn acquire(&self) -> Option<Option<OwnedSemaphorePermit>> {
        let Some(limit) = &self.limit else {
            return Some(None);
        };

        tokio::select! {
            permit = limit.clone().acquire_owned() => permit.ok().map(Some),
            _ = self.cancel.cancelled() => None,
        }
    }

    /// Takes a free slot without waiting.
    pub(crate) fn try_acquire(&self) -> Result<Option<OwnedSemaphorePermit>, TryAcquireError> {
        match &self.limit {
            Some(limit) => limit.clone().try_acquire_owned().map(Some),
            None => Ok(None),
        }
    }

    /// Waits until every task spawned so far has finished. The group stays
    /// usable afterwards.
    pub(crate) async fn wait(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }
}
