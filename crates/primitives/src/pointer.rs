//! Pointer payloads anchored on L1 in place of the data they reference.
//!
//! An encoded pointer is exactly one [`PointerTag`] byte followed by the
//! pointer body. No other layout is accepted.

use std::str;

use alloy_primitives::{Bytes, B256};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use thiserror::Error;

/// Length of a DA transaction hash pointer body.
pub const DA_TX_HASH_LEN: usize = 32;

/// Discriminator byte prefixed to an L1 pointer payload.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum PointerTag {
    /// Body is a 32-byte DA-chain transaction hash.
    DaTxHash = 0x01,
    /// Body is an opaque blob key returned by a DA server.
    BlobKey = 0x02,
}

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum PointerError {
    #[error("empty pointer payload")]
    Empty,

    #[error("unknown pointer tag {0:#04x}")]
    UnknownTag(u8),

    #[error("invalid tx hash pointer length {0}, expected {DA_TX_HASH_LEN}")]
    InvalidHashLength(usize),

    #[error("empty blob key pointer")]
    EmptyBlobKey,

    #[error("blob key pointer is not valid utf-8")]
    InvalidBlobKey,
}

/// Decoded reference to data stored on the DA layer.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum DaPointer {
    /// Hash of the DA-chain transaction carrying the data.
    TxHash(B256),
    /// Locator string returned by a DA server.
    BlobKey(String),
}

impl DaPointer {
    pub fn tag(&self) -> PointerTag {
        match self {
            DaPointer::TxHash(_) => PointerTag::DaTxHash,
            DaPointer::BlobKey(_) => PointerTag::BlobKey,
        }
    }

    /// Encodes as `tag || body`.
    pub fn encode(&self) -> Bytes {
        let body: &[u8] = match self {
            DaPointer::TxHash(hash) => hash.as_slice(),
            DaPointer::BlobKey(key) => key.as_bytes(),
        };
        let mut buf = Vec::with_capacity(1 + body.len());
        buf.push(self.tag().into());
        buf.extend_from_slice(body);
        buf.into()
    }

    pub fn decode(payload: &[u8]) -> Result<Self, PointerError> {
        let (&tag, body) = payload.split_first().ok_or(PointerError::Empty)?;
        let tag = PointerTag::try_from(tag).map_err(|e| PointerError::UnknownTag(e.number))?;

        match tag {
            PointerTag::DaTxHash => {
                if body.len() != DA_TX_HASH_LEN {
                    return Err(PointerError::InvalidHashLength(body.len()));
                }
                Ok(DaPointer::TxHash(B256::from_slice(body)))
            }
            PointerTag::BlobKey => {
                if body.is_empty() {
                    return Err(PointerError::EmptyBlobKey);
                }
                let key = str::from_utf8(body).map_err(|_| PointerError::InvalidBlobKey)?;
                Ok(DaPointer::BlobKey(key.to_owned()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tx_hash_pointer_layout() {
        let hash = B256::repeat_byte(0xab);
        let encoded = DaPointer::TxHash(hash).encode();

        assert_eq!(encoded.len(), 33);
        assert_eq!(encoded[0], 0x01);
        assert_eq!(&encoded[1..], hash.as_slice());
        assert_eq!(DaPointer::decode(&encoded), Ok(DaPointer::TxHash(hash)));
    }

    #[test]
    fn test_blob_key_pointer_layout() {
        let encoded = DaPointer::BlobKey("ns/42/0".to_owned()).encode();
        assert_eq!(encoded.as_ref(), b"\x02ns/42/0");
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert_eq!(DaPointer::decode(&[]), Err(PointerError::Empty));
        assert_eq!(
            DaPointer::decode(&[0x07, 1, 2]),
            Err(PointerError::UnknownTag(0x07))
        );
        assert_eq!(
            DaPointer::decode(&[0x01; 20]),
            Err(PointerError::InvalidHashLength(19))
        );
        assert_eq!(DaPointer::decode(&[0x02]), Err(PointerError::EmptyBlobKey));
        assert_eq!(
            DaPointer::decode(&[0x02, 0xff, 0xfe]),
            Err(PointerError::InvalidBlobKey)
        );
    }
}
