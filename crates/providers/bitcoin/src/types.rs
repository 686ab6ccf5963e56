//! Source-chain primitives.

use alloy_primitives::{B256, hex};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A source-chain block height.
pub type Height = u64;

/// A source-chain block hash, in the byte order the RPC renders it.
///
/// The mirror contract stores hashes in the same order, so two hashes compare equal iff the
/// underlying blocks are identical.
pub type BlockHash = B256;

/// The serialized size of a Bitcoin block header.
pub const HEADER_SIZE: usize = 80;

/// A serialized 80-byte Bitcoin block header.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display("{}", hex::encode(_0))]
pub struct BlockHeader([u8; HEADER_SIZE]);

impl BlockHeader {
    /// Wraps raw header bytes.
    pub const fn new(bytes: [u8; HEADER_SIZE]) -> Self {
        Self(bytes)
    }

    /// Parses a header from its 160-character hex encoding.
    pub fn from_hex(s: &str) -> Result<Self, HeaderParseError> {
        let bytes = hex::decode(s.trim()).map_err(|e| HeaderParseError::Hex(e.to_string()))?;
        let bytes: [u8; HEADER_SIZE] =
            bytes.try_into().map_err(|b: Vec<u8>| HeaderParseError::Length(b.len()))?;
        Ok(Self(bytes))
    }

    /// Returns the raw header bytes.
    pub const fn as_bytes(&self) -> &[u8; HEADER_SIZE] {
        &self.0
    }

    /// Returns the previous block hash committed to by this header, in RPC byte order.
    pub fn prev_block_hash(&self) -> BlockHash {
        let mut prev = [0u8; 32];
        prev.copy_from_slice(&self.0[4..36]);
        prev.reverse();
        B256::from(prev)
    }

    /// Returns the hash of this header, in RPC byte order.
    pub fn block_hash(&self) -> BlockHash {
        let digest = Sha256::digest(Sha256::digest(self.0));
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&digest);
        hash.reverse();
        B256::from(hash)
    }
}

impl std::fmt::Debug for BlockHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("BlockHeader").field(&hex::encode(self.0)).finish()
    }
}

impl AsRef<[u8]> for BlockHeader {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Errors raised while parsing a [`BlockHeader`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HeaderParseError {
    /// The input is not valid hex.
    #[error("invalid header hex: {0}")]
    Hex(String),
    /// The decoded header has the wrong size.
    #[error("expected {HEADER_SIZE} header bytes, got {0}")]
    Length(usize),
}

/// The verbose (`verbosity = 1`) block representation returned by `getblock`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockJson {
    /// The block hash.
    pub hash: BlockHash,
    /// The block height.
    pub height: Height,
    /// The merkle root of the block's transactions.
    #[serde(rename = "merkleroot")]
    pub merkle_root: B256,
    /// The number of transactions in the block.
    pub n_tx: u64,
    /// The transaction ids, in block order.
    pub tx: Vec<B256>,
}
