//! Queue handle and factory.

use std::{fmt, future::Future, marker::PhantomData, sync::Arc};

use dalink_config::QueueConfig;
use dalink_da_client::DaTransport;
use dalink_primitives::{Receipt, TxCandidate};
use tokio::{
    sync::{mpsc, Mutex, OwnedSemaphorePermit, Semaphore},
    time,
};
use tokio_util::{sync::CancellationToken, task::TaskTracker};
use tracing::*;

use super::{
    batcher::{batcher_task, BatcherMsg},
    ctx::QueueCtx,
    da_leg::{store_leg, two_step_leg},
    send_group::SendGroup,
    BATCHER_CHANNEL_CAPACITY, DA_ADMISSION_WEIGHT,
};
use crate::{
    errors::{FatalError, QueueError},
    traits::{ChainHeadReader, TxManager},
};

/// Outcome of one submitted candidate, tagged with the caller's identifier.
#[derive(Debug)]
pub struct TxReceipt<Id> {
    pub id: Id,
    pub result: Result<Receipt, QueueError>,
}

pub(crate) async fn deliver<Id: fmt::Debug>(
    receipt_tx: &mpsc::Sender<TxReceipt<Id>>,
    id: Id,
    result: Result<Receipt, QueueError>,
) {
    if let Err(e) = receipt_tx.send(TxReceipt { id, result }).await {
        warn!(id = ?e.0.id, "receipt receiver dropped");
    }
}

/// Error for a direct send whose group was cancelled.
fn cancelled_error(ctx: &QueueCtx) -> QueueError {
    if ctx.halt.is_cancelled() {
        ctx.stopped_error()
    } else {
        QueueError::Cancelled
    }
}

/// Handle used by producers to submit candidates.
pub struct TxQueue<Id> {
    ctx: Arc<QueueCtx>,
    group: Arc<Mutex<SendGroup>>,
    batcher_tx: mpsc::Sender<BatcherMsg>,
    _id: PhantomData<fn() -> Id>,
}

impl<Id> Clone for TxQueue<Id> {
    fn clone(&self) -> Self {
        Self {
            ctx: self.ctx.clone(),
            group: self.group.clone(),
            batcher_tx: self.batcher_tx.clone(),
            _id: PhantomData,
        }
    }
}

impl<Id> fmt::Debug for TxQueue<Id> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TxQueue").field("ctx", &self.ctx).finish()
    }
}

/// Creates the submission queue.
///
/// Returns the producer handle and the batcher future. The caller spawns the
/// future; it resolves with `Ok(())` on shutdown and with the fatal condition
/// otherwise. Once it has resolved the queue is halted and refuses new work
/// with [`QueueError::Halted`].
pub fn create_tx_queue<Id>(
    config: QueueConfig,
    l1_txmgr: Arc<dyn TxManager>,
    da_txmgr: Arc<dyn TxManager>,
    da_chain: Arc<dyn ChainHeadReader>,
    da_transport: Arc<dyn DaTransport>,
    shutdown: CancellationToken,
) -> (TxQueue<Id>, impl Future<Output = Result<(), FatalError>>)
where
    Id: fmt::Debug + Send + 'static,
{
    if let Err(err) = config.validate() {
        warn!(%err, "queue config out of range, clamping timer periods");
    }

    let halt = shutdown.child_token();
    let group = SendGroup::new(&halt, config.max_pending());
    let ctx = Arc::new(QueueCtx {
        config,
        l1_txmgr,
        da_txmgr,
        da_chain,
        da_transport,
        da_admission: Arc::new(Semaphore::new(DA_ADMISSION_WEIGHT)),
        da_tracker: TaskTracker::new(),
        shutdown,
        halt,
    });

    let (batcher_tx, batcher_rx) = mpsc::channel(BATCHER_CHANNEL_CAPACITY);

    let queue = TxQueue {
        ctx: ctx.clone(),
        group: Arc::new(Mutex::new(group)),
        batcher_tx,
        _id: PhantomData,
    };
    let task = batcher_task(ctx, batcher_rx);

    (queue, task)
}

impl<Id> TxQueue<Id>
where
    Id: fmt::Debug + Send + 'static,
{
    /// Sends `candidate` to L1 once the current send group has room.
    ///
    /// Only waits for admission. The receipt arrives on `receipt_tx`.
    pub async fn send(
        &self,
        id: Id,
        candidate: TxCandidate,
        receipt_tx: mpsc::Sender<TxReceipt<Id>>,
    ) {
        if self.ctx.halt.is_cancelled() {
            deliver(&receipt_tx, id, Err(self.ctx.stopped_error())).await;
            return;
        }

        let group = self.current_group().await;
        let Some(permit) = group.acquire().await else {
            deliver(&receipt_tx, id, Err(cancelled_error(&self.ctx))).await;
            return;
        };

        self.spawn_send(&group, permit, id, candidate, receipt_tx);
    }

    /// Like [`send`](Self::send) but never waits.
    ///
    /// Returns `false` without queueing anything when the group is full, when
    /// a cancelled group is still draining, or when the queue has stopped.
    pub async fn try_send(
        &self,
        id: Id,
        candidate: TxCandidate,
        receipt_tx: mpsc::Sender<TxReceipt<Id>>,
    ) -> bool {
        if self.ctx.halt.is_cancelled() {
            return false;
        }

        let Some(group) = self.try_current_group() else {
            return false;
        };
        let Ok(permit) = group.try_acquire() else {
            return false;
        };

        self.spawn_send(&group, permit, id, candidate, receipt_tx);
        true
    }

    /// Commits `candidate` on the DA chain, then anchors a pointer to it on
    /// L1 once the DA inclusion is fork-safe.
    ///
    /// The DA receipt is delivered as soon as the DA tx is included.
    pub async fn send_2step(
        &self,
        id: Id,
        candidate: TxCandidate,
        receipt_tx: mpsc::Sender<TxReceipt<Id>>,
    ) {
        if self.ctx.halt.is_cancelled() {
            deliver(&receipt_tx, id, Err(self.ctx.stopped_error())).await;
            return;
        }

        let Some(permit) = self.try_admit_da() else {
            self.reject_saturated(id, &receipt_tx).await;
            return;
        };

        self.ctx.da_tracker.spawn(two_step_leg(
            self.ctx.clone(),
            self.batcher_tx.clone(),
            id,
            candidate,
            permit,
            receipt_tx,
        ));
    }

    /// Stores the payload of `candidate` on the DA server at `endpoint`, then
    /// anchors a pointer to the returned locator on L1.
    ///
    /// The delivered receipt carries the DA inclusion height.
    pub async fn store_on_da_server(
        &self,
        endpoint: &str,
        id: Id,
        candidate: TxCandidate,
        receipt_tx: mpsc::Sender<TxReceipt<Id>>,
    ) {
        if self.ctx.halt.is_cancelled() {
            deliver(&receipt_tx, id, Err(self.ctx.stopped_error())).await;
            return;
        }

        let Some(permit) = self.try_admit_da() else {
            self.reject_saturated(id, &receipt_tx).await;
            return;
        };

        self.ctx.da_tracker.spawn(store_leg(
            self.ctx.clone(),
            self.batcher_tx.clone(),
            endpoint.to_owned(),
            id,
            candidate,
            permit,
            receipt_tx,
        ));
    }

    /// Waits until all direct sends spawned so far have completed.
    pub async fn wait(&self) {
        let group = self.group.lock().await.clone();
        group.wait().await;
    }

    /// Waits for direct sends and every DA leg, including confirmation waits.
    pub async fn wait_all(&self) {
        self.wait().await;
        self.ctx.da_tracker.close();
        self.ctx.da_tracker.wait().await;
        self.ctx.da_tracker.reopen();
    }

    /// Stops the queue. In-flight work ends at its next suspension point and
    /// the batcher future resolves with `Ok(())`, abandoning a running flush.
    pub fn shutdown(&self) {
        info!("shutting down tx queue");
        self.ctx.shutdown.cancel();
    }

    /// Number of free DA admission slots.
    pub fn available_da_slots(&self) -> usize {
        self.ctx.da_admission.available_permits()
    }

    /// Returns the live send group, replacing it first if it was cancelled.
    async fn current_group(&self) -> SendGroup {
        let mut group = self.group.lock().await;
        if group.is_cancelled() && !self.ctx.halt.is_cancelled() {
            debug!("send group cancelled, waiting for it to drain");
            group.wait().await;
            *group = SendGroup::new(&self.ctx.halt, self.ctx.config.max_pending());
        }
        group.clone()
    }

    /// Non-blocking [`current_group`](Self::current_group). Gives up while
    /// another caller holds the group or a cancelled group has not drained.
    fn try_current_group(&self) -> Option<SendGroup> {
        let mut group = self.group.try_lock().ok()?;
        if group.is_cancelled() && !self.ctx.halt.is_cancelled() {
            if !group.tracker().is_empty() {
                return None;
            }
            *group = SendGroup::new(&self.ctx.halt, self.ctx.config.max_pending());
        }
        Some(group.clone())
    }

    fn spawn_send(
        &self,
        group: &SendGroup,
        permit: Option<OwnedSemaphorePermit>,
        id: Id,
        candidate: TxCandidate,
        receipt_tx: mpsc::Sender<TxReceipt<Id>>,
    ) {
        let ctx = self.ctx.clone();
        let cancel = group.cancel_token().clone();

        group.tracker().spawn(async move {
            let _permit = permit;
            let result = tokio::select! {
                res = ctx.l1_txmgr.send(&candidate) => res.map_err(QueueError::from),
                _ = cancel.cancelled() => Err(cancelled_error(&ctx)),
            };

            match &result {
                Ok(receipt) => debug!(?id, block = receipt.block_number, "l1 tx included"),
                Err(QueueError::TxManager(err)) => {
                    warn!(?id, %err, "l1 send failed, cancelling send group");
                    cancel.cancel();
                }
                Err(err) => debug!(?id, %err, "l1 send aborted"),
            }

            deliver(&receipt_tx, id, result).await;
        });
    }

    fn try_admit_da(&self) -> Option<OwnedSemaphorePermit> {
        self.ctx.da_admission.clone().try_acquire_owned().ok()
    }

    /// Waits out the saturation backoff, then reports the rejection.
    async fn reject_saturated(&self, id: Id, receipt_tx: &mpsc::Sender<TxReceipt<Id>>) {
        warn!(?id, "da admission saturated, rejecting after backoff");
        let result = tokio::select! {
            _ = time::sleep(self.ctx.config.saturation_backoff()) => QueueError::TooManyPending,
            _ = self.ctx.halt.cancelled() => self.ctx.stopped_error(),
        };
        deliver(receipt_tx, id, Err(result)).await;
    }
}
