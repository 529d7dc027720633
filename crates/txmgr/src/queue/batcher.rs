//! Pointer batcher task.
//!
//! Collects pointer candidates produced by DA legs and commits them to L1 in
//! batches. The buffer is owned by this task alone.

use std::{future, future::Future, mem, pin::Pin, sync::Arc, time::Duration};

use dalink_primitives::TxCandidate;
use tokio::{
    sync::{mpsc, OwnedSemaphorePermit},
    task::JoinSet,
    time::{self, Instant, MissedTickBehavior},
};
use tracing::*;

use super::ctx::QueueCtx;
use crate::errors::{FatalError, TxManagerError};

/// Pointer candidate waiting to be committed on L1, together with the DA
/// admission slot it keeps occupied.
#[derive(Debug)]
pub(crate) struct PendingPointer {
    candidate: TxCandidate,
    permit: OwnedSemaphorePermit,
    queued_at: Instant,
}

impl PendingPointer {
    pub(crate) fn new(candidate: TxCandidate, permit: OwnedSemaphorePermit) -> Self {
        Self {
            candidate,
            permit,
            queued_at: Instant::now(),
        }
    }
}

#[derive(Debug)]
pub(crate) enum BatcherMsg {
    Pointer(PendingPointer),
    Fatal(FatalError),
}

/// Whether the buffer is due for a flush at `now`.
fn should_flush(
    buffer: &[PendingPointer],
    min_batch_size: usize,
    max_batch_wait: Duration,
    now: Instant,
) -> bool {
    let Some(oldest) = buffer.first() else {
        return false;
    };
    buffer.len() >= min_batch_size || now.duration_since(oldest.queued_at) >= max_batch_wait
}

type FlushFuture = Pin<Box<dyn Future<Output = Result<(), FatalError>> + Send>>;

/// Drives the in-flight flush, if any.
async fn drive(in_flight: &mut Option<FlushFuture>) -> Result<(), FatalError> {
    match in_flight {
        Some(running) => running.await,
        None => future::pending().await,
    }
}

/// Runs until shutdown or a fatal condition. The queue halts as soon as this
/// returns or is dropped.
pub(crate) async fn batcher_task(
    ctx: Arc<QueueCtx>,
    mut rx: mpsc::Receiver<BatcherMsg>,
) -> Result<(), FatalError> {
    let _halt = ctx.halt.clone().drop_guard();

    let period = ctx.config.batch_interval();
    let mut tick = time::interval_at(Instant::now() + period, period);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut buffer: Vec<PendingPointer> = Vec::new();
    let mut in_flight: Option<FlushFuture> = None;

    loop {
        tokio::select! {
            _ = ctx.shutdown.cancelled() => {
                // dropping an in-flight flush aborts its sends
                info!(
                    buffered = buffer.len(),
                    flushing = in_flight.is_some(),
                    "batcher shutting down"
                );
                return Ok(());
            }

            msg = rx.recv() => match msg {
                Some(BatcherMsg::Pointer(pending)) => {
                    debug!(buffered = buffer.len() + 1, "pointer candidate queued for l1");
                    buffer.push(pending);
                }
                Some(BatcherMsg::Fatal(err)) => {
                    error!(%err, "fatal condition reported, stopping batcher");
                    return Err(err);
                }
                None => {
                    warn!(buffered = buffer.len(), "all queue handles dropped, stopping batcher");
                    return Ok(());
                }
            },

            res = drive(&mut in_flight) => {
                in_flight = None;
                res?;
            }

            _ = tick.tick(), if in_flight.is_none() => {
                if should_flush(
                    &buffer,
                    ctx.config.min_batch_size,
                    ctx.config.max_batch_wait(),
                    Instant::now(),
                ) {
                    in_flight = Some(Box::pin(flush(ctx.clone(), mem::take(&mut buffer))));
                } else if !buffer.is_empty() {
                    debug!(
                        buffered = buffer.len(),
                        min = ctx.config.min_batch_size,
                        "not enough pointer candidates, skipping cycle"
                    );
                }
            }
        }
    }
}

/// Sends every buffered pointer to L1, spaced by the flush stagger, and waits
/// for all of them. Each DA admission slot is released as soon as its own
/// send completes.
async fn flush(ctx: Arc<QueueCtx>, batch: Vec<PendingPointer>) -> Result<(), FatalError> {
    info!(count = batch.len(), "flushing pointer batch to l1");

    let stagger = ctx.config.flush_stagger();
    let mut sends = JoinSet::new();

    for (i, pending) in batch.into_iter().enumerate() {
        if i > 0 {
            time::sleep(stagger).await;
        }
        let l1_txmgr = ctx.l1_txmgr.clone();
        sends.spawn(async move {
            let PendingPointer {
                candidate, permit, ..
            } = pending;
            let res = l1_txmgr.send(&candidate).await;
            drop(permit);
            res
        });
    }

    let mut failure = None;
    while let Some(joined) = sends.join_next().await {
        let res = joined.map_err(|e| TxManagerError::Other(e.into())).and_then(|r| r);
        match res {
            Ok(receipt) => {
                info!(
                    block = receipt.block_number,
                    tx = %receipt.tx_hash,
                    "pointer tx committed to l1"
                );
            }
            Err(err) => {
                error!(%err, "send pointer tx to l1 failed");
                failure.get_or_insert(FatalError::L1SendFailed(err));
            }
        }
    }

    match failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::Semaphore;

    use super::*;

    fn pending(sem: &Arc<Semaphore>) -> PendingPointer {
        PendingPointer::new(
            TxCandidate::default(),
            sem.clone().try_acquire_owned().unwrap(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_should_flush_thresholds() {
        let sem = Arc::new(Semaphore::new(10));
        let max_wait = Duration::from_secs(600);

        assert!(!should_flush(&[], 3, max_wait, Instant::now()));

        let buffer = vec![pending(&sem), pending(&sem)];
        assert!(!should_flush(&buffer, 3, max_wait, Instant::now()));

        let buffer = vec![pending(&sem), pending(&sem), pending(&sem)];
        assert!(should_flush(&buffer, 3, max_wait, Instant::now()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_should_flush_after_max_wait() {
        let sem = Arc::new(Semaphore::new(10));
        let max_wait = Duration::from_secs(600);
        let buffer = vec![pending(&sem)];

        time::advance(Duration::from_secs(599)).await;
        assert!(!should_flush(&buffer, 3, max_wait, Instant::now()));

        time::advance(Duration::from_secs(1)).await;
        assert!(should_flush(&buffer, 3, max_wait, Instant::now()));
    }
}
