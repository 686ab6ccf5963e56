//! The mirror-contract client.

use crate::{
    MirrorError, MirrorResult,
    bindings::IBtcMirror::{getBlockHashCall, getLatestBlockHeightCall, submitCall},
};
use alloy_network::{EthereumWallet, ReceiptResponse, TransactionBuilder};
use alloy_primitives::{Address, Bytes, TxHash, U256};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_rpc_types_eth::TransactionRequest;
use alloy_signer_local::PrivateKeySigner;
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use btc_mirror_bitcoin::{BlockHash, HEADER_SIZE, Height};
use std::{fmt::Debug, sync::Arc};
use tracing::{debug, info};
use url::Url;

/// A submission that has been broadcast but not necessarily mined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionHandle {
    /// The transaction hash.
    pub tx_hash: TxHash,
}

/// The outcome recorded in a mined receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum ReceiptStatus {
    /// The call executed without reverting.
    #[display("succeeded")]
    Succeeded,
    /// The call reverted.
    #[display("failed")]
    Failed,
}

impl ReceiptStatus {
    /// Maps the receipt status flag.
    pub const fn from_success(success: bool) -> Self {
        if success { Self::Succeeded } else { Self::Failed }
    }
}

/// Access to the on-chain header mirror.
///
/// Reads go through `eth_call`. [`MirrorProvider::submit`] broadcasts a signed transaction; the
/// contract validates it, this trait does not.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MirrorProvider: Debug + Send + Sync {
    /// Returns the latest height the mirror has accepted.
    async fn latest_height(&self) -> MirrorResult<Height>;

    /// Returns the hash the mirror recorded at `height`.
    async fn hash_at(&self, height: Height) -> MirrorResult<BlockHash>;

    /// Submits concatenated headers starting at `from_height`.
    async fn submit(
        &self,
        from_height: Height,
        headers: Bytes,
        gas_limit: u64,
    ) -> MirrorResult<TransactionHandle>;

    /// Returns the receipt status of `tx_hash`, or `None` while it is still pending.
    async fn receipt_status(&self, tx_hash: TxHash) -> MirrorResult<Option<ReceiptStatus>>;
}

#[async_trait]
impl<T: MirrorProvider + ?Sized> MirrorProvider for Arc<T> {
    async fn latest_height(&self) -> MirrorResult<Height> {
        (**self).latest_height().await
    }

    async fn hash_at(&self, height: Height) -> MirrorResult<BlockHash> {
        (**self).hash_at(height).await
    }

    async fn submit(
        &self,
        from_height: Height,
        headers: Bytes,
        gas_limit: u64,
    ) -> MirrorResult<TransactionHandle> {
        (**self).submit(from_height, headers, gas_limit).await
    }

    async fn receipt_status(&self, tx_hash: TxHash) -> MirrorResult<Option<ReceiptStatus>> {
        (**self).receipt_status(tx_hash).await
    }
}

/// Where the mirror lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MirrorClientConfig {
    /// The mirror contract address.
    pub contract: Address,
}

/// Builds a provider over `rpc_url` that signs every transaction with `signer`.
pub fn signing_provider(rpc_url: Url, signer: PrivateKeySigner) -> DynProvider {
    ProviderBuilder::new().wallet(EthereumWallet::from(signer)).connect_http(rpc_url).erased()
}

/// Builds a provider over `rpc_url` that can only read.
pub fn read_only_provider(rpc_url: Url) -> DynProvider {
    ProviderBuilder::new().connect_http(rpc_url).erased()
}

/// A [`MirrorProvider`] backed by an alloy [`Provider`].
#[derive(Clone)]
pub struct AlloyMirrorClient<P = DynProvider> {
    provider: P,
    config: MirrorClientConfig,
}

impl<P> Debug for AlloyMirrorClient<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlloyMirrorClient").field("contract", &self.config.contract).finish()
    }
}

impl<P: Provider> AlloyMirrorClient<P> {
    /// Creates a new client.
    pub const fn new(provider: P, config: MirrorClientConfig) -> Self {
        Self { provider, config }
    }

    /// Returns the underlying provider.
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// Returns the mirror contract address.
    pub const fn contract(&self) -> Address {
        self.config.contract
    }

    /// Returns the chain id of the destination chain.
    pub async fn chain_id(&self) -> MirrorResult<u64> {
        Ok(self.provider.get_chain_id().await?)
    }

    async fn read<C: SolCall + Send>(&self, call: C) -> MirrorResult<C::Return> {
        let tx = TransactionRequest::default()
            .with_to(self.config.contract)
            .with_input(call.abi_encode());
        let data = self.provider.call(tx).await?;
        Ok(C::abi_decode_returns(&data)?)
    }
}

#[async_trait]
impl<P: Provider> MirrorProvider for AlloyMirrorClient<P> {
    async fn latest_height(&self) -> MirrorResult<Height> {
        let raw = self.read(getLatestBlockHeightCall {}).await?;
        let height = u64::try_from(raw).map_err(|_| MirrorError::HeightOverflow(raw))?;
        debug!(target: "mirror", height, "Fetched mirror height");
        Ok(height)
    }

    async fn hash_at(&self, height: Height) -> MirrorResult<BlockHash> {
        self.read(getBlockHashCall { number: U256::from(height) }).await
    }

    async fn submit(
        &self,
        from_height: Height,
        headers: Bytes,
        gas_limit: u64,
    ) -> MirrorResult<TransactionHandle> {
        let header_count = headers.len() / HEADER_SIZE;
        let call = submitCall { blockHeight: U256::from(from_height), blockHeaders: headers };
        let tx = TransactionRequest::default()
            .with_to(self.config.contract)
            .with_input(call.abi_encode())
            .with_gas_limit(gas_limit);

        let pending = self.provider.send_transaction(tx).await.map_err(MirrorError::Send)?;
        let tx_hash = *pending.tx_hash();
        info!(
            target: "mirror",
            %tx_hash,
            from_height,
            header_count,
            gas_limit,
            "Submitted headers"
        );
        Ok(TransactionHandle { tx_hash })
    }

    async fn receipt_status(&self, tx_hash: TxHash) -> MirrorResult<Option<ReceiptStatus>> {
        let receipt = self.provider.get_transaction_receipt(tx_hash).await?;
        Ok(receipt.map(|r| ReceiptStatus::from_success(ReceiptResponse::status(&r))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, b256};
    use alloy_provider::RootProvider;
    use alloy_rpc_client::RpcClient;
    use alloy_transport::mock::{Asserter, MockTransport};
    use serde_json::json;

    const CONTRACT: Address = address!("0x69f2a3e2bc4f7ad5ab8b0b0d4c2d7e6d2b3f0a11");
    const HASH: BlockHash =
        b256!("0x00000000000000000002a7c4c1e48d76c5a37902165a270156b7a8d72728a054");

    fn mocked(asserter: &Asserter) -> AlloyMirrorClient<RootProvider> {
        let client = RpcClient::new(MockTransport::new(asserter.clone()), false);
        AlloyMirrorClient::new(RootProvider::new(client), MirrorClientConfig { contract: CONTRACT })
    }

    fn word(value: U256) -> Bytes {
        Bytes::from(value.to_be_bytes::<32>().to_vec())
    }

    #[tokio::test]
    async fn test_latest_height() {
        let asserter = Asserter::new();
        asserter.push_success(&word(U256::from(840_000u64)));

        assert_eq!(mocked(&asserter).latest_height().await.unwrap(), 840_000);
    }

    #[tokio::test]
    async fn test_latest_height_overflow() {
        let asserter = Asserter::new();
        asserter.push_success(&word(U256::MAX));

        let err = mocked(&asserter).latest_height().await.unwrap_err();
        assert!(matches!(err, MirrorError::HeightOverflow(h) if h == U256::MAX));
    }

    #[tokio::test]
    async fn test_hash_at() {
        let asserter = Asserter::new();
        asserter.push_success(&Bytes::from(HASH.to_vec()));

        assert_eq!(mocked(&asserter).hash_at(100).await.unwrap(), HASH);
    }

    #[tokio::test]
    async fn test_short_return_data_is_decode_error() {
        let asserter = Asserter::new();
        asserter.push_success(&Bytes::from_static(&[0x01, 0x02]));

        let err = mocked(&asserter).hash_at(100).await.unwrap_err();
        assert!(matches!(err, MirrorError::Decode(_)));
    }

    #[tokio::test]
    async fn test_read_transport_error() {
        let asserter = Asserter::new();
        asserter.push_failure_msg("execution reverted");

        let err = mocked(&asserter).latest_height().await.unwrap_err();
        assert!(matches!(err, MirrorError::Transport(_)));
    }

    #[tokio::test]
    async fn test_submit_returns_handle() {
        let asserter = Asserter::new();
        asserter.push_success(&HASH);

        let headers = Bytes::from(vec![0u8; HEADER_SIZE * 4]);
        let handle = mocked(&asserter).submit(100, headers, 220_000).await.unwrap();
        assert_eq!(handle, TransactionHandle { tx_hash: HASH });
    }

    #[tokio::test]
    async fn test_submit_send_failure() {
        let asserter = Asserter::new();
        asserter.push_failure_msg("insufficient funds");

        let headers = Bytes::from(vec![0u8; HEADER_SIZE]);
        let err = mocked(&asserter).submit(100, headers, 130_000).await.unwrap_err();
        assert!(matches!(err, MirrorError::Send(_)));
    }

    #[tokio::test]
    async fn test_receipt_pending() {
        let asserter = Asserter::new();
        asserter.push_success(&serde_json::Value::Null);

        assert_eq!(mocked(&asserter).receipt_status(HASH).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_receipt_status() {
        let cases = [("0x1", ReceiptStatus::Succeeded), ("0x0", ReceiptStatus::Failed)];
        for (status, expected) in cases {
            let asserter = Asserter::new();
            asserter.push_success(&json!({
                "type": "0x2",
                "status": status,
                "cumulativeGasUsed": "0x1d4c0",
                "logs": [],
                "logsBloom": format!("0x{}", "00".repeat(256)),
                "transactionHash": HASH,
                "transactionIndex": "0x0",
                "blockHash": HASH,
                "blockNumber": "0x10",
                "gasUsed": "0x1d4c0",
                "effectiveGasPrice": "0x3b9aca00",
                "from": CONTRACT,
                "to": CONTRACT,
                "contractAddress": null,
            }));

            assert_eq!(mocked(&asserter).receipt_status(HASH).await.unwrap(), Some(expected));
        }
    }

    #[test]
    fn test_receipt_status_flags() {
        assert_eq!(ReceiptStatus::from_success(true), ReceiptStatus::Succeeded);
        assert_eq!(ReceiptStatus::from_success(false), ReceiptStatus::Failed);
        assert_eq!(ReceiptStatus::Failed.to_string(), "failed");
    }
}
