//! Bitcoin RPC flags.

use btc_mirror_bitcoin::{BitcoinNetwork, BitcoinRpcConfig, SourceError};
use clap::Parser;
use url::Url;

/// Where to read the live Bitcoin chain from.
#[derive(Parser, Default, Clone, Debug)]
pub struct BitcoinArgs {
    /// API key for the Bitcoin RPC provider.
    #[arg(
        long = "bitcoin-api-key",
        env = "GETBLOCK_API_KEY",
        hide_env_values = true,
        global = true
    )]
    pub api_key: Option<String>,
    /// The Bitcoin network.
    #[arg(long = "bitcoin-network", env = "BITCOIN_NETWORK", default_value_t, global = true)]
    pub network: BitcoinNetwork,
    /// Overrides the GetBlock endpoint derived from the network.
    #[arg(long = "bitcoin-rpc-url", env = "BITCOIN_RPC_URL", global = true)]
    pub rpc_url: Option<Url>,
}

impl BitcoinArgs {
    /// Builds and validates the Bitcoin RPC config.
    pub fn config(&self) -> Result<BitcoinRpcConfig, SourceError> {
        let api_key = self.api_key.clone().unwrap_or_default();
        let config = match &self.rpc_url {
            Some(endpoint) => BitcoinRpcConfig { endpoint: endpoint.clone(), api_key },
            None => BitcoinRpcConfig::getblock(self.network, api_key)?,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_getblock_endpoint_from_network() {
        let args = BitcoinArgs::try_parse_from([
            "test",
            "--bitcoin-api-key",
            "key",
            "--bitcoin-network",
            "testnet",
        ])
        .unwrap();

        let config = args.config().unwrap();
        assert_eq!(config.endpoint.as_str(), "https://btc.getblock.io/testnet/");
        assert_eq!(config.api_key, "key");
    }

    #[test]
    fn test_explicit_endpoint() {
        let args = BitcoinArgs::try_parse_from([
            "test",
            "--bitcoin-api-key",
            "key",
            "--bitcoin-rpc-url",
            "http://localhost:8332",
        ])
        .unwrap();

        assert_eq!(args.config().unwrap().endpoint.as_str(), "http://localhost:8332/");
    }

    #[test]
    fn test_missing_api_key() {
        let args = BitcoinArgs { api_key: None, ..Default::default() };
        assert!(matches!(args.config(), Err(SourceError::MissingApiKey)));
    }
}
