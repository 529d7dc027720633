use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

use crate::pointer::DaPointer;

/// A transaction to be sent by a chain transaction manager.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct TxCandidate {
    /// Destination address, `None` for contract creation.
    pub to: Option<Address>,
    /// Calldata payload.
    pub tx_data: Bytes,
    /// Gas budget for the transaction.
    pub gas_limit: u64,
    /// Value transferred with the transaction.
    pub value: U256,
}

impl TxCandidate {
    pub fn new(to: Address, tx_data: impl Into<Bytes>) -> Self {
        Self {
            to: Some(to),
            tx_data: tx_data.into(),
            ..Default::default()
        }
    }

    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    /// Returns a copy of this candidate whose payload is the encoded `pointer`.
    ///
    /// The original candidate is left untouched.
    pub fn with_pointer(&self, pointer: &DaPointer) -> Self {
        Self {
            tx_data: pointer.encode(),
            ..self.clone()
        }
    }
}

/// Inclusion result of a mined transaction.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Receipt {
    pub block_number: u64,
    pub block_hash: B256,
    pub tx_hash: B256,
}

impl Receipt {
    pub fn new(block_number: u64, block_hash: B256, tx_hash: B256) -> Self {
        Self {
            block_number,
            block_hash,
            tx_hash,
        }
    }

    /// Receipt carrying only a height, used when the DA server reports where
    /// it stored a blob. Hashes are zero.
    pub fn at_height(block_number: u64) -> Self {
        Self {
            block_number,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_pointer_leaves_original_untouched() {
        let original = TxCandidate::new(Address::repeat_byte(0x42), b"hello".to_vec())
            .with_gas_limit(100_000)
            .with_value(U256::from(5));
        let derived = original.with_pointer(&DaPointer::BlobKey("ns/1/0".to_owned()));

        assert_eq!(original.tx_data.as_ref(), b"hello");
        assert_eq!(derived.tx_data.as_ref(), b"\x02ns/1/0");
        assert_eq!(derived.to, original.to);
        assert_eq!(derived.gas_limit, 100_000);
        assert_eq!(derived.value, U256::from(5));
    }

    #[test]
    fn test_receipt_at_height() {
        let r = Receipt::at_height(42);
        assert_eq!(r.block_number, 42);
        assert_eq!(r.block_hash, B256::ZERO);
        assert_eq!(r.tx_hash, B256::ZERO);
    }
}
