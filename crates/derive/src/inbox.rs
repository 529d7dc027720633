//! Selection and decoding of batch inbox pointer transactions.

use alloy_consensus::{transaction::SignerRecoverable, Transaction, TxEnvelope};
use alloy_primitives::{Address, B256};
use dalink_primitives::DaPointer;
use tracing::*;

use crate::errors::TemporaryError;

/// Extracts the DA tx hashes referenced by the pointer transactions in `txs`.
///
/// Only transactions sent to `inbox` are considered. Those that fail signer
/// recovery or were not signed by `batcher` are skipped. A malformed pointer
/// or a blob-key pointer aborts the whole scan.
pub fn inbox_pointers(
    inbox: Address,
    batcher: Address,
    txs: &[TxEnvelope],
) -> Result<Vec<B256>, TemporaryError> {
    let mut pointers = Vec::new();

    for tx in txs {
        if tx.to() != Some(inbox) {
            continue;
        }

        let tx_hash = *tx.tx_hash();
        let sender = match tx.recover_signer() {
            Ok(sender) => sender,
            Err(err) => {
                warn!(%tx_hash, %err, "tx in inbox has invalid signature");
                continue;
            }
        };
        if sender != batcher {
            warn!(%tx_hash, %sender, "tx in inbox with unauthorized submitter");
            continue;
        }

        let pointer = DaPointer::decode(tx.input())
            .map_err(|source| TemporaryError::MalformedPointer { tx_hash, source })?;

        match pointer {
            DaPointer::TxHash(da_tx) => pointers.push(da_tx),
            DaPointer::BlobKey(key) => {
                return Err(TemporaryError::UnsupportedPointer { tx_hash, key });
            }
        }
    }

    Ok(pointers)
}
