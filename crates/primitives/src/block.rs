use std::fmt;

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

/// Names an L1 block by hash and number.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct BlockId {
    /// Block hash.
    pub hash: B256,
    /// Block number.
    pub number: u64,
}

impl BlockId {
    pub fn new(hash: B256, number: u64) -> Self {
        Self { hash, number }
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Show first 2 and last 2 bytes of the hash.
        let bytes = self.hash.as_slice();
        write!(
            f,
            "{}@{:02x}{:02x}..{:02x}{:02x}",
            self.number, bytes[0], bytes[1], bytes[30], bytes[31]
        )
    }
}

/// Header-level information about a fetched L1 block.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct BlockInfo {
    pub hash: B256,
    pub number: u64,
    pub parent_hash: B256,
    pub timestamp: u64,
}

impl BlockInfo {
    /// Returns the [`BlockId`] of this block.
    pub fn id(&self) -> BlockId {
        BlockId::new(self.hash, self.number)
    }
}
