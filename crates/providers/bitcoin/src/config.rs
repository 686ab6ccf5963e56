//! Configuration for the Bitcoin source-chain adapter.

use crate::SourceError;
use derive_more::Display;
use std::str::FromStr;
use url::Url;

/// The Bitcoin network the source chain runs on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display)]
pub enum BitcoinNetwork {
    /// Bitcoin mainnet.
    #[default]
    #[display("mainnet")]
    Mainnet,
    /// Bitcoin testnet.
    #[display("testnet")]
    Testnet,
}

impl BitcoinNetwork {
    /// Returns the GetBlock endpoint serving this network.
    pub const fn getblock_endpoint(&self) -> &'static str {
        match self {
            Self::Mainnet => "https://btc.getblock.io/mainnet/",
            Self::Testnet => "https://btc.getblock.io/testnet/",
        }
    }
}

impl FromStr for BitcoinNetwork {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" | "main" | "bitcoin" => Ok(Self::Mainnet),
            "testnet" | "test" | "testnet3" => Ok(Self::Testnet),
            other => Err(format!("unknown bitcoin network: {other}")),
        }
    }
}

/// Endpoint and credential for the source-chain RPC.
#[derive(Clone, PartialEq, Eq)]
pub struct BitcoinRpcConfig {
    /// The JSON-RPC endpoint.
    pub endpoint: Url,
    /// The provider API key, sent in the `x-api-key` header.
    pub api_key: String,
}

impl BitcoinRpcConfig {
    /// Creates a config pointing at the GetBlock endpoint for `network`.
    pub fn getblock(
        network: BitcoinNetwork,
        api_key: impl Into<String>,
    ) -> Result<Self, SourceError> {
        let endpoint = Url::parse(network.getblock_endpoint())
            .map_err(|e| SourceError::InvalidEndpoint(e.to_string()))?;
        Ok(Self { endpoint, api_key: api_key.into() })
    }

    /// Checks the config without touching the network.
    pub fn validate(&self) -> Result<(), SourceError> {
        if self.api_key.trim().is_empty() {
            return Err(SourceError::MissingApiKey);
        }
        match self.endpoint.scheme() {
            "http" | "https" => Ok(()),
            other => Err(SourceError::InvalidEndpoint(format!("unsupported scheme `{other}`"))),
        }
    }
}

impl std::fmt::Debug for BitcoinRpcConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitcoinRpcConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &"<redacted>")
            .finish()
    }
}
