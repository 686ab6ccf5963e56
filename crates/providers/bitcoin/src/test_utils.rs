//! An in-memory Bitcoin node for testing.
//!
//! [`InMemoryBitcoinNode`] implements [`RpcTransport`] and answers the Bitcoin Core methods the
//! adapter uses from a synthetic, linked chain of headers. Wrapping it in a
//! [`BitcoinRpcClient`](crate::BitcoinRpcClient) yields a fully in-memory source chain.

use crate::{BlockHash, BlockHeader, HEADER_SIZE, Height, RpcError, RpcTransport};
use alloy_primitives::{B256, hex};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::collections::HashMap;

/// Returns the hash of a synthetic header. Same as [`BlockHeader::block_hash`].
pub fn header_hash(header: &BlockHeader) -> BlockHash {
    header.block_hash()
}

/// Builds a synthetic header at `height` linking to `prev`.
///
/// `salt` distinguishes competing forks at the same height.
pub fn synthetic_header(prev: BlockHash, height: Height, salt: u8) -> BlockHeader {
    let mut raw = [0u8; HEADER_SIZE];
    raw[0..4].copy_from_slice(&0x2000_0000u32.to_le_bytes());
    let mut prev_le = prev.0;
    prev_le.reverse();
    raw[4..36].copy_from_slice(&prev_le);
    raw[36] = salt;
    raw[37..45].copy_from_slice(&height.to_le_bytes());
    raw[68..72].copy_from_slice(&(height as u32).to_le_bytes());
    raw[72..76].copy_from_slice(&0x1703_4219u32.to_le_bytes());
    raw[76..80].copy_from_slice(&u32::from(salt).to_le_bytes());
    BlockHeader::new(raw)
}

#[derive(Debug, Default)]
struct NodeState {
    /// Canonical chain, indexed by height.
    blocks: Vec<(BlockHash, BlockHeader)>,
    /// Every header ever produced, including orphaned forks.
    headers: HashMap<BlockHash, BlockHeader>,
    /// Received requests, in order.
    requests: Vec<(String, Vec<Value>)>,
    /// Methods that fail with a remote error.
    failing: HashMap<String, (i64, String)>,
}

impl NodeState {
    fn push(&mut self, header: BlockHeader) {
        let hash = header_hash(&header);
        self.headers.insert(hash, header);
        self.blocks.push((hash, header));
    }

    fn tip_hash(&self) -> BlockHash {
        self.blocks.last().map(|(hash, _)| *hash).unwrap_or(B256::ZERO)
    }
}

/// An in-memory Bitcoin node serving a synthetic chain over [`RpcTransport`].
#[derive(Debug, Default)]
pub struct InMemoryBitcoinNode {
    state: Mutex<NodeState>,
}

impl InMemoryBitcoinNode {
    /// Creates a node with a linked chain covering heights `0..=tip`.
    pub fn with_tip(tip: Height) -> Self {
        let node = Self::default();
        node.extend(tip + 1, 0);
        node
    }

    /// Appends `count` blocks to the canonical chain.
    pub fn extend(&self, count: u64, salt: u8) {
        let mut state = self.state.lock();
        for _ in 0..count {
            let height = state.blocks.len() as Height;
            let header = synthetic_header(state.tip_hash(), height, salt);
            state.push(header);
        }
    }

    /// Replaces every block from `height` upward with a competing fork of the same length.
    pub fn reorg_from(&self, height: Height, salt: u8) {
        let mut state = self.state.lock();
        let len = state.blocks.len() as Height;
        state.blocks.truncate(height as usize);
        for h in height..len {
            let header = synthetic_header(state.tip_hash(), h, salt);
            state.push(header);
        }
    }

    /// Returns the current tip height.
    pub fn tip(&self) -> Height {
        (self.state.lock().blocks.len() as Height).saturating_sub(1)
    }

    /// Returns the canonical hash at `height`.
    pub fn hash(&self, height: Height) -> BlockHash {
        self.state.lock().blocks[height as usize].0
    }

    /// Returns the canonical header at `height`.
    pub fn header(&self, height: Height) -> BlockHeader {
        self.state.lock().blocks[height as usize].1
    }

    /// Returns the canonical `(hash, header)` pairs for `from..=to`.
    pub fn range(&self, from: Height, to: Height) -> Vec<(BlockHash, BlockHeader)> {
        self.state.lock().blocks[from as usize..=to as usize].to_vec()
    }

    /// Makes every call to `method` fail with the given remote error.
    pub fn fail_method(&self, method: &str, code: i64, message: &str) {
        self.state.lock().failing.insert(method.to_string(), (code, message.to_string()));
    }

    /// Returns every request received so far.
    pub fn requests(&self) -> Vec<(String, Vec<Value>)> {
        self.state.lock().requests.clone()
    }

    /// Returns how many times `method` was called.
    pub fn request_count(&self, method: &str) -> usize {
        self.state.lock().requests.iter().filter(|(m, _)| m == method).count()
    }

    /// Clears the request log.
    pub fn clear_requests(&self) {
        self.state.lock().requests.clear();
    }
}

fn invalid_params(message: impl Into<String>) -> RpcError {
    RpcError::Remote { code: -8, message: message.into() }
}

fn parse_hash(value: Option<&Value>) -> Result<BlockHash, RpcError> {
    value
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<BlockHash>().ok())
        .ok_or_else(|| invalid_params("blockhash must be a hex string"))
}

#[async_trait]
impl RpcTransport for InMemoryBitcoinNode {
    async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        let mut state = self.state.lock();
        state.requests.push((method.to_string(), params.clone()));

        if let Some((code, message)) = state.failing.get(method) {
            return Err(RpcError::Remote { code: *code, message: message.clone() });
        }

        match method {
            "getblockcount" => Ok(json!(state.blocks.len().saturating_sub(1))),
            "getblockhash" => {
                let height = params
                    .first()
                    .and_then(Value::as_u64)
                    .ok_or_else(|| invalid_params("height must be a number"))?;
                state
                    .blocks
                    .get(height as usize)
                    .map(|(hash, _)| json!(hex::encode(hash)))
                    .ok_or_else(|| invalid_params("Block height out of range"))
            }
            "getblockheader" => {
                let hash = parse_hash(params.first())?;
                state
                    .headers
                    .get(&hash)
                    .map(|header| json!(header.to_string()))
                    .ok_or_else(|| RpcError::Remote {
                        code: -5,
                        message: "Block not found".to_string(),
                    })
            }
            other => Err(RpcError::Remote { code: -32601, message: format!("{other} not found") }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BitcoinRpcClient, SourceChainProvider};

    #[tokio::test]
    async fn test_in_memory_chain_is_linked() {
        let node = InMemoryBitcoinNode::with_tip(10);
        for height in 1..=10 {
            assert_eq!(node.header(height).prev_block_hash(), node.hash(height - 1));
        }

        let client = BitcoinRpcClient::with_transport(node);
        assert_eq!(client.tip_height().await.unwrap(), 10);
        let hash = client.hash_at(7).await.unwrap();
        assert_eq!(client.header_at(hash).await.unwrap(), client.transport().header(7));
    }

    #[test]
    fn test_reorg_keeps_prefix_and_length() {
        let node = InMemoryBitcoinNode::with_tip(10);
        let before: Vec<_> = (0..=10).map(|h| node.hash(h)).collect();

        node.reorg_from(8, 1);

        assert_eq!(node.tip(), 10);
        assert_eq!(node.hash(7), before[7]);
        assert_ne!(node.hash(8), before[8]);
        assert_eq!(node.header(8).prev_block_hash(), before[7]);
    }
}
