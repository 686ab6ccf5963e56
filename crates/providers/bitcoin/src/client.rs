//! The typed Bitcoin source-chain adapter.

use crate::{
    BitcoinRpcConfig, BlockHash, BlockHeader, BlockJson, Height, HttpTransport, RpcError,
    RpcTransport, SourceError, SourceResult,
};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::{fmt::Debug, sync::Arc};
use tracing::debug;

/// Read access to the live source chain.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SourceChainProvider: Debug + Send + Sync {
    /// Returns the height of the current chain tip.
    async fn tip_height(&self) -> SourceResult<Height>;

    /// Returns the hash of the canonical block at `height`.
    async fn hash_at(&self, height: Height) -> SourceResult<BlockHash>;

    /// Returns the serialized header of the block with the given hash.
    async fn header_at(&self, hash: BlockHash) -> SourceResult<BlockHeader>;
}

#[async_trait]
impl<T: SourceChainProvider + ?Sized> SourceChainProvider for Arc<T> {
    async fn tip_height(&self) -> SourceResult<Height> {
        (**self).tip_height().await
    }

    async fn hash_at(&self, height: Height) -> SourceResult<BlockHash> {
        (**self).hash_at(height).await
    }

    async fn header_at(&self, hash: BlockHash) -> SourceResult<BlockHeader> {
        (**self).header_at(hash).await
    }
}

/// The Bitcoin Core JSON-RPC methods used by the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitcoinMethod {
    /// `getblockcount`
    GetBlockCount,
    /// `getblockhash`
    GetBlockHash,
    /// `getblockheader`
    GetBlockHeader,
    /// `getblock`
    GetBlock,
    /// `getrawtransaction`
    GetRawTransaction,
}

impl BitcoinMethod {
    /// Returns the wire name of the method.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::GetBlockCount => "getblockcount",
            Self::GetBlockHash => "getblockhash",
            Self::GetBlockHeader => "getblockheader",
            Self::GetBlock => "getblock",
            Self::GetRawTransaction => "getrawtransaction",
        }
    }
}

/// A [`SourceChainProvider`] speaking Bitcoin Core JSON-RPC over an [`RpcTransport`].
#[derive(Debug)]
pub struct BitcoinRpcClient<T = HttpTransport> {
    transport: Arc<T>,
}

impl<T> Clone for BitcoinRpcClient<T> {
    fn clone(&self) -> Self {
        Self { transport: Arc::clone(&self.transport) }
    }
}

impl BitcoinRpcClient<HttpTransport> {
    /// Builds a client from the given config.
    ///
    /// Fails before any network call if the credential is missing or the endpoint is unusable.
    pub fn new(config: &BitcoinRpcConfig) -> SourceResult<Self> {
        config.validate()?;
        let transport = HttpTransport::with_api_key(config.endpoint.clone(), &config.api_key)
            .map_err(|e| SourceError::ClientBuild(e.to_string()))?;
        Ok(Self::with_transport(transport))
    }
}

impl<T: RpcTransport> BitcoinRpcClient<T> {
    /// Wraps an existing transport.
    pub fn with_transport(transport: T) -> Self {
        Self { transport: Arc::new(transport) }
    }

    /// Returns a reference to the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends a request, folding remote-reported failures into [`SourceError::BadResponse`].
    async fn call(&self, method: BitcoinMethod, params: Vec<Value>) -> SourceResult<Value> {
        let name = method.as_str();
        match self.transport.request(name, params).await {
            Ok(value) => Ok(value),
            Err(RpcError::Remote { code, message }) => {
                Err(SourceError::bad_response(name, format!("remote error {code}: {message}")))
            }
            Err(RpcError::MissingResult(_)) => {
                Err(SourceError::bad_response(name, "missing result field"))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn call_str(&self, method: BitcoinMethod, params: Vec<Value>) -> SourceResult<String> {
        match self.call(method, params).await? {
            Value::String(s) => Ok(s),
            other => Err(SourceError::bad_response(
                method.as_str(),
                format!("expected a string, got {other}"),
            )),
        }
    }

    /// Returns the verbose JSON representation of the block with the given hash.
    pub async fn block_at(&self, hash: BlockHash) -> SourceResult<BlockJson> {
        let params = vec![json!(hex_hash(hash)), json!(1)];
        let value = self.call(BitcoinMethod::GetBlock, params).await?;
        serde_json::from_value(value)
            .map_err(|e| SourceError::bad_response(BitcoinMethod::GetBlock.as_str(), e))
    }

    /// Returns the hex-encoded raw transaction `txid` contained in block `block_hash`.
    pub async fn raw_transaction(
        &self,
        txid: BlockHash,
        block_hash: BlockHash,
    ) -> SourceResult<String> {
        self.call_str(
            BitcoinMethod::GetRawTransaction,
            vec![json!(hex_hash(txid)), json!(false), json!(hex_hash(block_hash))],
        )
        .await
    }
}

#[async_trait]
impl<T: RpcTransport> SourceChainProvider for BitcoinRpcClient<T> {
    async fn tip_height(&self) -> SourceResult<Height> {
        let method = BitcoinMethod::GetBlockCount;
        let value = self.call(method, vec![]).await?;
        let height = value.as_u64().ok_or_else(|| {
            SourceError::bad_response(method.as_str(), format!("expected a height, got {value}"))
        })?;
        debug!(target: "bitcoin_rpc", height, "Fetched source chain tip");
        Ok(height)
    }

    async fn hash_at(&self, height: Height) -> SourceResult<BlockHash> {
        let method = BitcoinMethod::GetBlockHash;
        let raw = self.call_str(method, vec![json!(height)]).await?;
        raw.parse::<BlockHash>().map_err(|e| SourceError::bad_response(method.as_str(), e))
    }

    async fn header_at(&self, hash: BlockHash) -> SourceResult<BlockHeader> {
        let method = BitcoinMethod::GetBlockHeader;
        let raw = self.call_str(method, vec![json!(hex_hash(hash)), json!(false)]).await?;
        BlockHeader::from_hex(&raw).map_err(|e| SourceError::bad_response(method.as_str(), e))
    }
}

/// Renders a hash the way Bitcoin Core expects it: bare hex, no `0x` prefix.
fn hex_hash(hash: BlockHash) -> String {
    alloy_primitives::hex::encode(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HEADER_SIZE, transport::MockRpcTransport};
    use alloy_primitives::b256;

    const HASH: BlockHash =
        b256!("0x00000000000000000002a7c4c1e48d76c5a37902165a270156b7a8d72728a054");

    fn client(transport: MockRpcTransport) -> BitcoinRpcClient<MockRpcTransport> {
        BitcoinRpcClient::with_transport(transport)
    }

    #[test]
    fn test_new_requires_api_key() {
        let cfg = BitcoinRpcConfig::getblock(crate::BitcoinNetwork::Mainnet, "").unwrap();
        let err = BitcoinRpcClient::new(&cfg).unwrap_err();
        assert!(matches!(err, SourceError::MissingApiKey));
    }

    #[tokio::test]
    async fn test_tip_height() {
        let mut transport = MockRpcTransport::new();
        transport
            .expect_request()
            .withf(|method, params| method == "getblockcount" && params.is_empty())
            .times(1)
            .returning(|_, _| Ok(json!(840_000)));

        assert_eq!(client(transport).tip_height().await.unwrap(), 840_000);
    }

    #[tokio::test]
    async fn test_tip_height_bad_shape() {
        let mut transport = MockRpcTransport::new();
        transport.expect_request().returning(|_, _| Ok(json!("tall")));

        let err = client(transport).tip_height().await.unwrap_err();
        assert!(matches!(err, SourceError::BadResponse { method: "getblockcount", .. }));
    }

    #[tokio::test]
    async fn test_hash_at() {
        let mut transport = MockRpcTransport::new();
        transport
            .expect_request()
            .withf(|method, params| method == "getblockhash" && params == &vec![json!(840_000)])
            .returning(|_, _| Ok(json!(hex_hash(HASH))));

        assert_eq!(client(transport).hash_at(840_000).await.unwrap(), HASH);
    }

    #[tokio::test]
    async fn test_header_at_sends_bare_hex_hash() {
        let mut transport = MockRpcTransport::new();
        let header_hex = "11".repeat(HEADER_SIZE);
        let expected = vec![json!(hex_hash(HASH)), json!(false)];
        transport
            .expect_request()
            .withf(move |method, params| method == "getblockheader" && params == &expected)
            .returning(move |_, _| Ok(Value::String(header_hex.clone())));

        let header = client(transport).header_at(HASH).await.unwrap();
        assert_eq!(header.as_bytes(), &[0x11; HEADER_SIZE]);
    }

    #[tokio::test]
    async fn test_header_at_rejects_short_header() {
        let mut transport = MockRpcTransport::new();
        transport.expect_request().returning(|_, _| Ok(json!("00ff")));

        let err = client(transport).header_at(HASH).await.unwrap_err();
        assert!(matches!(err, SourceError::BadResponse { method: "getblockheader", .. }));
    }

    #[tokio::test]
    async fn test_remote_error_becomes_bad_response() {
        let mut transport = MockRpcTransport::new();
        transport.expect_request().returning(|_, _| {
            Err(RpcError::Remote { code: -8, message: "Block height out of range".to_string() })
        });

        let err = client(transport).hash_at(9_999_999).await.unwrap_err();
        match err {
            SourceError::BadResponse { method, reason } => {
                assert_eq!(method, "getblockhash");
                assert!(reason.contains("Block height out of range"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_transport_error_is_preserved() {
        let mut transport = MockRpcTransport::new();
        transport
            .expect_request()
            .returning(|_, _| Err(RpcError::IdMismatch { expected: 1, got: "2".to_string() }));

        let err = client(transport).tip_height().await.unwrap_err();
        assert!(matches!(err, SourceError::Rpc(RpcError::IdMismatch { .. })));
    }

    #[tokio::test]
    async fn test_block_at() {
        let mut transport = MockRpcTransport::new();
        transport.expect_request().withf(|method, _| method == "getblock").returning(|_, _| {
            Ok(json!({
                "hash": hex_hash(HASH),
                "height": 840_000,
                "merkleroot": hex_hash(HASH),
                "nTx": 1,
                "tx": [hex_hash(HASH)],
            }))
        });

        let block = client(transport).block_at(HASH).await.unwrap();
        assert_eq!(block.hash, HASH);
        assert_eq!(block.tx.len(), 1);
    }

    #[tokio::test]
    async fn test_raw_transaction() {
        let mut transport = MockRpcTransport::new();
        transport
            .expect_request()
            .withf(|method, params| method == "getrawtransaction" && params.len() == 3)
            .returning(|_, _| Ok(json!("0100000001")));

        let raw = client(transport).raw_transaction(HASH, HASH).await.unwrap();
        assert_eq!(raw, "0100000001");
    }
}
