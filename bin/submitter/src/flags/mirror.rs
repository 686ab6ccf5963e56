//! Destination chain flags.

use crate::error::ConfigError;
use alloy_chains::Chain;
use alloy_primitives::Address;
use clap::Parser;
use url::Url;

/// Where the mirror contract lives.
#[derive(Parser, Default, Clone, Debug)]
pub struct MirrorArgs {
    /// The mirror contract address.
    #[arg(long = "contract", env = "BTCMIRROR_CONTRACT_ADDR", global = true)]
    pub contract: Option<Address>,
    /// URL of the destination chain RPC.
    #[arg(long = "eth-rpc-url", env = "ETH_RPC_URL", global = true)]
    pub eth_rpc_url: Option<Url>,
    /// The destination chain. Read from the RPC when omitted.
    #[arg(long = "destination-chain-id", env = "DESTINATION_CHAIN_ID", global = true)]
    pub destination_chain_id: Option<Chain>,
}

impl MirrorArgs {
    /// Returns the destination RPC URL and contract address.
    pub fn endpoint(&self) -> Result<(Url, Address), ConfigError> {
        let url = self.eth_rpc_url.clone().ok_or(ConfigError::MissingEthRpcUrl)?;
        let contract = self.contract.ok_or(ConfigError::MissingContract)?;
        Ok((url, contract))
    }
}
