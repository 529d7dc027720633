//! DA-bound legs of the queue: DA server stores and two-step DA sends.
//!
//! A leg owns one DA admission permit. On success the permit travels with the
//! derived pointer candidate into the batcher; on every other path the leg
//! drops it.

use std::{fmt, sync::Arc};

use dalink_primitives::{BlobLocator, DaPointer, Receipt, TxCandidate};
use tokio::{
    sync::{mpsc, OwnedSemaphorePermit},
    time,
};
use tracing::*;

use super::{
    batcher::{BatcherMsg, PendingPointer},
    ctx::QueueCtx,
    handle::{deliver, TxReceipt},
};
use crate::errors::{FatalError, QueueError};

/// Why a confirmation wait ended without a fork-safe anchor.
#[derive(Debug)]
pub(crate) enum WaitAbort {
    Stopped,
    Fatal(FatalError),
}

/// Whether a DA tx included at `block_number` is buried deep enough under
/// `head`.
pub(crate) fn is_fork_safe(block_number: u64, fork_safe_depth: u64, head: u64) -> bool {
    block_number
        .checked_add(fork_safe_depth)
        .is_some_and(|safe_at| safe_at < head)
}

/// Polls the DA chain until `receipt` is fork-safe and checks that its block
/// is still canonical.
pub(crate) async fn wait_for_fork_safety(ctx: &QueueCtx, receipt: &Receipt) -> Result<(), WaitAbort> {
    let depth = ctx.config.fork_safe_depth;
    let timeout = ctx.config.confirmation_timeout();
    let deadline = time::sleep(timeout);
    tokio::pin!(deadline);

    let mut poll = time::interval(ctx.config.confirmation_poll_interval());

    loop {
        tokio::select! {
            _ = ctx.halt.cancelled() => return Err(WaitAbort::Stopped),
            _ = &mut deadline => {
                return Err(WaitAbort::Fatal(FatalError::ConfirmationTimeout {
                    block_number: receipt.block_number,
                    timeout,
                }));
            }
            _ = poll.tick() => {}
        }

        let head = match ctx.da_chain.block_number().await {
            Ok(head) => head,
            Err(err) => {
                warn!(%err, "failed to fetch da chain head, retrying");
                continue;
            }
        };

        if !is_fork_safe(receipt.block_number, depth, head) {
            trace!(block = receipt.block_number, %head, %depth, "da tx not yet fork-safe");
            continue;
        }

        let found = match ctx.da_chain.block_hash_by_number(receipt.block_number).await {
            Ok(hash) => hash,
            Err(err) => {
                warn!(block = receipt.block_number, %err, "failed to fetch da block hash, retrying");
                continue;
            }
        };

        if found != receipt.block_hash {
            return Err(WaitAbort::Fatal(FatalError::DaReorg {
                block_number: receipt.block_number,
                expected: receipt.block_hash,
                found,
            }));
        }

        return Ok(());
    }
}

/// Hands `pointer` to the batcher. Fails once the batcher has stopped.
async fn forward(
    ctx: &QueueCtx,
    batcher_tx: &mpsc::Sender<BatcherMsg>,
    pointer: PendingPointer,
) -> Result<(), QueueError> {
    if ctx.halt.is_cancelled() {
        return Err(ctx.stopped_error());
    }
    batcher_tx
        .send(BatcherMsg::Pointer(pointer))
        .await
        .map_err(|_| ctx.stopped_error())
}

/// Sends `candidate` on the DA chain, reports the DA receipt and, once the
/// inclusion is fork-safe, hands a tx-hash pointer to the batcher.
pub(crate) async fn two_step_leg<Id>(
    ctx: Arc<QueueCtx>,
    batcher_tx: mpsc::Sender<BatcherMsg>,
    id: Id,
    candidate: TxCandidate,
    permit: OwnedSemaphorePermit,
    receipt_tx: mpsc::Sender<TxReceipt<Id>>,
) where
    Id: fmt::Debug + Send + 'static,
{
    let sent = tokio::select! {
        res = ctx.da_txmgr.send(&candidate) => res,
        _ = ctx.halt.cancelled() => {
            deliver(&receipt_tx, id, Err(ctx.stopped_error())).await;
            return;
        }
    };

    let receipt = match sent {
        Ok(receipt) => receipt,
        Err(err) => {
            warn!(?id, %err, "da send failed");
            deliver(&receipt_tx, id, Err(err.into())).await;
            return;
        }
    };

    info!(?id, block = receipt.block_number, tx = %receipt.tx_hash, "da tx included");
    let id_dbg = format!("{id:?}");
    deliver(&receipt_tx, id, Ok(receipt)).await;

    match wait_for_fork_safety(&ctx, &receipt).await {
        Ok(()) => {}
        Err(WaitAbort::Stopped) => {
            debug!(tx = %receipt.tx_hash, "queue stopped during confirmation wait");
            return;
        }
        Err(WaitAbort::Fatal(err)) => {
            error!(%err, "da confirmation failed");
            drop(permit);
            if batcher_tx.send(BatcherMsg::Fatal(err)).await.is_err() {
                warn!("batcher stopped before fatal error could be reported");
            }
            return;
        }
    }

    debug!(tx = %receipt.tx_hash, "da tx fork-safe, forwarding pointer");
    let pointer = candidate.with_pointer(&DaPointer::TxHash(receipt.tx_hash));
    if let Err(err) = forward(&ctx, &batcher_tx, PendingPointer::new(pointer, permit)).await {
        // the da receipt is already out; the batcher future carries the cause
        error!(id = %id_dbg, tx = %receipt.tx_hash, %err, "pointer to da tx not anchored");
    }
}

/// Stores the payload on the DA server, reports the inclusion height and
/// hands a blob-key pointer to the batcher.
pub(crate) async fn store_leg<Id>(
    ctx: Arc<QueueCtx>,
    batcher_tx: mpsc::Sender<BatcherMsg>,
    endpoint: String,
    id: Id,
    candidate: TxCandidate,
    permit: OwnedSemaphorePermit,
    receipt_tx: mpsc::Sender<TxReceipt<Id>>,
) where
    Id: fmt::Debug + Send + 'static,
{
    let stored = tokio::select! {
        res = ctx.da_transport.store(&endpoint, &candidate.tx_data) => res,
        _ = ctx.halt.cancelled() => {
            deliver(&receipt_tx, id, Err(ctx.stopped_error())).await;
            return;
        }
    };

    let locator = match stored {
        Ok(locator) => locator,
        Err(err) => {
            warn!(?id, %endpoint, %err, "store blob on da server failed");
            drop(permit);
            tokio::select! {
                _ = time::sleep(ctx.config.store_failure_backoff()) => {}
                _ = ctx.halt.cancelled() => {}
            }
            deliver(&receipt_tx, id, Err(err.into())).await;
            return;
        }
    };

    let parsed = match locator.parse::<BlobLocator>() {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!(?id, %locator, %err, "da server returned an unusable locator");
            deliver(&receipt_tx, id, Err(err.into())).await;
            return;
        }
    };

    info!(?id, %locator, height = parsed.height(), "blob stored on da server");

    // the receipt only reports success once the pointer is in the batcher
    let pointer = candidate.with_pointer(&DaPointer::BlobKey(locator.clone()));
    let result = match forward(&ctx, &batcher_tx, PendingPointer::new(pointer, permit)).await {
        Ok(()) => Ok(Receipt::at_height(parsed.height())),
        Err(err) => {
            error!(?id, %locator, %err, "pointer to stored blob not anchored");
            Err(err)
        }
    };
    deliver(&receipt_tx, id, result).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_fork_safe() {
        assert!(!is_fork_safe(100, 375, 475));
        assert!(is_fork_safe(100, 375, 476));
        assert!(!is_fork_safe(100, 375, 0));
        assert!(!is_fork_safe(u64::MAX, 1, u64::MAX));
        assert!(is_fork_safe(0, 0, 1));
    }
}
